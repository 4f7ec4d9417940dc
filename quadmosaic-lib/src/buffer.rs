use crate::*;
use std::fmt;

/// Raw samples of one decoded frame, row-major with a top-left origin.
///
/// Only the first three channels are read as color; a fourth (alpha)
/// channel is carried but ignored.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(
        width: u32,
        height: u32,
        channels: usize,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Frame has no pixels: {}x{}", width, height);
        ensure!(!data.is_empty(), "Frame has no data");

        ensure!(
            channels == 3 || channels == 4,
            "Unsupported channel count: {}",
            channels
        );

        ensure!(
            stride >= width as usize * channels,
            "Row stride {} is shorter than {} pixels of {} channels",
            stride,
            width,
            channels
        );

        ensure!(
            data.len() >= height as usize * stride,
            "Frame data holds {} bytes, expected at least {}",
            data.len(),
            height as usize * stride
        );

        Ok(Self {
            width,
            height,
            stride,
            channels,
            data,
        })
    }

    /// Tightly packed rows, stride derived from width and channel count.
    pub fn packed(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, channels, width as usize * channels, data)
    }

    pub fn from_rgb(img: &RgbImage) -> Result<Self> {
        Self::packed(img.width(), img.height(), 3, img.as_raw().clone())
    }

    pub fn from_rgba(img: &RgbaImage) -> Result<Self> {
        Self::packed(img.width(), img.height(), 4, img.as_raw().clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn same_dimensions(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Visible samples of row `y`, ignoring stride padding.
    ///
    /// # Panics
    ///
    /// Panics if the span `x..x + width` of row `y` lies outside the frame.
    pub fn row(&self, y: u32, x: u32, width: u32) -> &[u8] {
        assert!(
            y < self.height && x as u64 + width as u64 <= self.width as u64,
            "Row span out of bounds"
        );

        let start = y as usize * self.stride + x as usize * self.channels;
        let end = start + width as usize * self.channels;

        &self.data[start..end]
    }

    /// Compares visible pixels only; padding bytes past each row are
    /// not part of the frame.
    pub fn same_pixels(&self, other: &Self) -> bool {
        if !self.same_dimensions(other) || self.channels != other.channels {
            return false;
        }

        (0..self.height).all(|y| self.row(y, 0, self.width) == other.row(y, 0, other.width))
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        let px = self.row(y, x, 1);

        Rgb([px[0], px[1], px[2]])
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("channels", &self.channels)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::ImageBuffer;

    #[test]
    fn rejects_invalid_frames() {
        assert!(PixelBuffer::packed(0, 4, 3, vec![0; 12]).is_err());
        assert!(PixelBuffer::packed(4, 0, 3, vec![0; 12]).is_err());
        assert!(PixelBuffer::packed(2, 2, 3, vec![]).is_err());
        assert!(PixelBuffer::packed(2, 2, 2, vec![0; 8]).is_err());
        assert!(PixelBuffer::packed(2, 2, 3, vec![0; 11]).is_err());
        assert!(PixelBuffer::new(2, 2, 3, 5, vec![0; 10]).is_err());
        assert!(PixelBuffer::from_rgb(&RgbImage::new(0, 0)).is_err());
    }

    #[test]
    fn reads_padded_rows() {
        // 2x2 RGBA with two bytes of padding per row
        let data = vec![
            1, 2, 3, 255, 4, 5, 6, 255, 0xAA, 0xAA, //
            7, 8, 9, 255, 10, 11, 12, 255, 0xBB, 0xBB,
        ];

        let buf = PixelBuffer::new(2, 2, 4, 10, data).unwrap();

        assert_eq!(buf.pixel(0, 0), Rgb([1, 2, 3]));
        assert_eq!(buf.pixel(1, 1), Rgb([10, 11, 12]));
        assert_eq!(buf.row(1, 1, 1), &[10, 11, 12, 255]);
    }

    #[test]
    #[should_panic]
    fn pixel_outside_frame_panics() {
        let buf = PixelBuffer::packed(2, 2, 3, vec![0; 12]).unwrap();
        buf.pixel(2, 0);
    }

    #[test]
    fn same_pixels_ignores_padding() {
        let a = PixelBuffer::new(1, 1, 3, 4, vec![1, 2, 3, 0]).unwrap();
        let b = PixelBuffer::new(1, 1, 3, 4, vec![1, 2, 3, 9]).unwrap();
        let c = PixelBuffer::new(1, 1, 3, 4, vec![1, 2, 4, 0]).unwrap();

        assert!(a.same_pixels(&b));
        assert!(!a.same_pixels(&c));
    }

    #[test]
    fn from_rgba_keeps_color() {
        let img: RgbaImage = ImageBuffer::from_pixel(3, 2, ::image::Rgba([7, 8, 9, 10]));
        let buf = PixelBuffer::from_rgba(&img).unwrap();

        assert_eq!(buf.channels(), 4);
        assert_eq!(buf.pixel(2, 1), Rgb([7, 8, 9]));
    }
}
