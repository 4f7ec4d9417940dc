use crate::*;

/// Axis-aligned rectangle in pixel coordinates, top-left origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x1(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    pub fn y1(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with `[0, width) x [0, height)`; empty when disjoint.
    pub fn clamp(&self, width: u32, height: u32) -> Self {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x1().min(width as u64) as u32;
        let y1 = self.y1().min(height as u64) as u32;

        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Splits into top-left, top-right, bottom-left and bottom-right
    /// quadrants; the right column and bottom row take the odd pixel.
    pub fn quadrants(&self) -> [Rect; 4] {
        let lw = self.width / 2;
        let th = self.height / 2;
        let rw = self.width - lw;
        let bh = self.height - th;

        [
            Rect::new(self.x, self.y, lw, th),
            Rect::new(self.x + lw, self.y, rw, th),
            Rect::new(self.x, self.y + th, lw, bh),
            Rect::new(self.x + lw, self.y + th, rw, bh),
        ]
    }
}

/// Mean color and dispersion of one rectangle of a [`PixelBuffer`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RegionStats {
    /// Per-channel mean over the red, green and blue samples.
    pub mean: [f64; 3],
    /// Average of the per-channel population standard deviations.
    pub variance: f64,
    /// Number of pixels that contributed.
    pub pixels: u64,
}

impl RegionStats {
    /// Single pass over the clamped region. Sums are kept as integers so
    /// equal regions always yield bit-identical stats.
    pub fn compute(buf: &PixelBuffer, rect: Rect) -> Self {
        let rect = rect.clamp(buf.width(), buf.height());

        if rect.is_empty() {
            return Self::default();
        }

        let mut sum = [0u64; 3];
        let mut sum_sq = [0u64; 3];

        for y in rect.y..rect.y + rect.height {
            for px in buf.row(y, rect.x, rect.width).chunks_exact(buf.channels()) {
                for c in 0..3 {
                    let v = px[c] as u64;
                    sum[c] += v;
                    sum_sq[c] += v * v;
                }
            }
        }

        let n = rect.area();
        let mut mean = [0.0; 3];
        let mut stddev = 0.0;

        for c in 0..3 {
            mean[c] = sum[c] as f64 / n as f64;

            // n * sum(x^2) - sum(x)^2 is exact and never negative
            let spread = n as u128 * sum_sq[c] as u128 - sum[c] as u128 * sum[c] as u128;
            stddev += (spread as f64).sqrt() / n as f64;
        }

        Self {
            mean,
            variance: stddev / 3.0,
            pixels: n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixels == 0
    }

    /// Mean color truncated to 8 bits per channel.
    pub fn color(&self) -> Rgb<u8> {
        let [r, g, b] = self.mean;

        Rgb([r as u8, g as u8, b as u8])
    }

    /// Mean absolute difference between the per-channel means.
    pub fn color_delta(&self, other: &Self) -> f64 {
        self.mean
            .iter()
            .zip(other.mean.iter())
            .map(|(a, b)| (a - b).abs())
            .sum::<f64>()
            / 3.0
    }

    pub fn variance_delta(&self, other: &Self) -> f64 {
        (self.variance - other.variance).abs()
    }
}
