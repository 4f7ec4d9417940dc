use crate::*;
use ::image::imageops::{self, FilterType};
use ::image::io::Reader as ImageReader;
use std::path::Path;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Frames loaded from disk, each with the size it had before downscaling.
pub struct Source {
    images: Vec<(RgbImage, (u32, u32))>,
}

impl Source {
    /// Loads every image in `path` in file-name order, downscaled by
    /// `scale` (1.0 keeps the original size). Files without an image
    /// extension are skipped.
    pub fn from_dir(path: impl AsRef<Path>, scale: f64) -> Result<Self> {
        ensure!(
            scale > 0.0 && scale <= 1.0,
            "Scale must be within (0, 1], got {}",
            scale
        );

        let pattern = path.as_ref().join("*.*");
        let paths = glob::glob(&*pattern.to_string_lossy()).context("Couldn't find frames")?;

        let paths = paths
            .map(|frame| frame.context("Couldn't find frame"))
            .filter(|frame| match frame {
                Ok(path) => is_frame(path),
                Err(_) => true,
            });

        let images = paths.map(|frame| {
            let path = frame?;

            let image = ImageReader::open(&path)
                .with_context(|| format!("Couldn't open frame: {}", path.display()))?
                .decode()
                .with_context(|| format!("Couldn't decode frame: {}", path.display()))?
                .to_rgb8();

            let canvas = image.dimensions();

            Ok((downscale(image, scale), canvas))
        });

        let images: Vec<_> = images.collect::<Result<_>>()?;

        ensure!(
            !images.is_empty(),
            "No frames found in {}",
            path.as_ref().display()
        );

        Ok(Self { images })
    }

    pub fn images(&self) -> impl Iterator<Item = &RgbImage> + '_ {
        self.images.iter().map(|(image, _)| image)
    }

    /// Original dimensions of each frame.
    pub fn canvases(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.images.iter().map(|(_, canvas)| *canvas)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Area-averaged downscale; never shrinks an axis below one pixel.
pub fn downscale(image: RgbImage, scale: f64) -> RgbImage {
    if scale >= 1.0 {
        return image;
    }

    let (w, h) = image.dimensions();
    let nw = ((w as f64 * scale).round() as u32).max(1);
    let nh = ((h as f64 * scale).round() as u32).max(1);

    imageops::resize(&image, nw, nh, FilterType::Triangle)
}
