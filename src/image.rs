//! Intensity frames and rectangles
//!
//! The tracker consumes single-channel 8-bit frames. Decoding, display and
//! camera acquisition live outside this crate; callers hand in a
//! [`GrayImage`] built from whatever pixel buffer they have.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Matrix of 8-bit intensities, `rows = height`, `cols = width`.
pub type IntensityMatrix = DMatrix<u8>;

/// Axis-aligned rectangle with inclusive integer corners `(x0, y0)`–`(x1, y1)`.
///
/// Corners may lie outside a frame. [`GrayImage::pixel_region`] clips to the
/// frame, [`GrayImage::pixel_region_padded`] fills the outside with zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left column
    pub x0: i32,
    /// Top row
    pub y0: i32,
    /// Right column (inclusive)
    pub x1: i32,
    /// Bottom row (inclusive)
    pub y1: i32,
}

impl Rect {
    /// Create a rectangle from its corners
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle of the given logical size centred on `(cx, cy)`.
    ///
    /// Corners are `centre ∓ size/2`, rounded half up so both corners
    /// round the same way and an integral size is kept exactly.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let round = |v: f64| (v + 0.5).floor() as i32;
        Self {
            x0: round(cx - width / 2.0),
            y0: round(cy - height / 2.0),
            x1: round(cx + width / 2.0),
            y1: round(cy + height / 2.0),
        }
    }

    /// `x1 - x0`, the logical width used for the tracked object
    #[inline]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    /// `y1 - y0`, the logical height used for the tracked object
    #[inline]
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// Centre with integer division, `(x0 + width/2, y0 + height/2)`
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (self.x0 + self.width() / 2, self.y0 + self.height() / 2)
    }
}

/// Width and height of a region in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSize {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

/// Single-channel 8-bit frame
#[derive(Debug, Clone, PartialEq)]
pub struct GrayImage {
    pixels: IntensityMatrix,
}

impl GrayImage {
    /// Wrap an intensity matrix
    pub fn from_matrix(pixels: IntensityMatrix) -> Self {
        Self { pixels }
    }

    /// Build a frame from row-major data.
    ///
    /// Returns `None` if `data.len() != width * height`.
    pub fn from_row_major(width: usize, height: usize, data: &[u8]) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            pixels: DMatrix::from_row_slice(height, width, data),
        })
    }

    /// Frame filled with a single intensity
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            pixels: DMatrix::from_element(height, width, value),
        }
    }

    /// Frame whose pixel at column `x`, row `y` is `f(x, y)`
    pub fn from_fn<F: FnMut(usize, usize) -> u8>(width: usize, height: usize, mut f: F) -> Self {
        Self {
            pixels: DMatrix::from_fn(height, width, |row, col| f(col, row)),
        }
    }

    /// Frame width in pixels
    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    /// Frame height in pixels
    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Intensity at column `x`, row `y`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[(y, x)]
    }

    /// Set the intensity at column `x`, row `y`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[(y, x)] = value;
    }

    /// Underlying matrix
    pub fn as_matrix(&self) -> &IntensityMatrix {
        &self.pixels
    }

    /// Paint a filled rectangle, clipped to the frame
    pub fn fill_rect(&mut self, rect: &Rect, value: u8) {
        if let Some((x0, y0, x1, y1)) = self.clamp(rect) {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    self.pixels[(y, x)] = value;
                }
            }
        }
    }

    /// Pixels inside `rect` (inclusive corners), clipped to the frame.
    ///
    /// A rectangle lying entirely outside the frame yields a `0 × 0` matrix.
    pub fn pixel_region(&self, rect: &Rect) -> IntensityMatrix {
        match self.clamp(rect) {
            Some((x0, y0, x1, y1)) => self
                .pixels
                .view((y0, x0), (y1 - y0 + 1, x1 - x0 + 1))
                .into_owned(),
            None => DMatrix::zeros(0, 0),
        }
    }

    /// Pixels inside `rect` (inclusive corners) at full size.
    ///
    /// Pixels outside the frame read as intensity 0, so the result is always
    /// `(|y1 - y0| + 1) × (|x1 - x0| + 1)`.
    pub fn pixel_region_padded(&self, rect: &Rect) -> IntensityMatrix {
        let (lx, hx) = (rect.x0.min(rect.x1) as i64, rect.x0.max(rect.x1) as i64);
        let (ly, hy) = (rect.y0.min(rect.y1) as i64, rect.y0.max(rect.y1) as i64);
        let (w, h) = (self.width() as i64, self.height() as i64);
        DMatrix::from_fn((hy - ly + 1) as usize, (hx - lx + 1) as usize, |row, col| {
            let (x, y) = (lx + col as i64, ly + row as i64);
            if (0..w).contains(&x) && (0..h).contains(&y) {
                self.pixels[(y as usize, x as usize)]
            } else {
                0
            }
        })
    }

    /// Clip `rect` to the frame, returning inclusive `usize` corners
    fn clamp(&self, rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        let max_x = self.width() as i64 - 1;
        let max_y = self.height() as i64 - 1;
        let (lx, hx) = (rect.x0.min(rect.x1) as i64, rect.x0.max(rect.x1) as i64);
        let (ly, hy) = (rect.y0.min(rect.y1) as i64, rect.y0.max(rect.y1) as i64);
        if hx < 0 || hy < 0 || lx > max_x || ly > max_y {
            return None;
        }
        Some((
            lx.clamp(0, max_x) as usize,
            ly.clamp(0, max_y) as usize,
            hx.clamp(0, max_x) as usize,
            hy.clamp(0, max_y) as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_geometry() {
        let r = Rect::new(10, 20, 30, 60);
        assert_eq!(r.width(), 20);
        assert_eq!(r.height(), 40);
        assert_eq!(r.center(), (20, 40));

        let c = Rect::centered(20.0, 40.0, 20.0, 40.0);
        assert_eq!(c, r);
    }

    #[test]
    fn test_from_row_major_layout() {
        let img = GrayImage::from_row_major(3, 2, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 2);
        assert_eq!(img.get(2, 0), 3);
        assert_eq!(img.get(0, 1), 4);
        assert!(GrayImage::from_row_major(3, 2, &[1, 2]).is_none());
    }

    #[test]
    fn test_pixel_region_is_inclusive() {
        let img = GrayImage::from_fn(10, 10, |x, y| (x + 10 * y) as u8);
        let region = img.pixel_region(&Rect::new(2, 3, 4, 5));
        assert_eq!(region.ncols(), 3);
        assert_eq!(region.nrows(), 3);
        assert_eq!(region[(0, 0)], 32);
        assert_eq!(region[(2, 2)], 54);
    }

    #[test]
    fn test_pixel_region_clips_to_frame() {
        let img = GrayImage::filled(8, 6, 7);
        let region = img.pixel_region(&Rect::new(-3, -3, 2, 1));
        assert_eq!(region.ncols(), 3);
        assert_eq!(region.nrows(), 2);

        let outside = img.pixel_region(&Rect::new(20, 20, 30, 30));
        assert_eq!(outside.len(), 0);
    }

    #[test]
    fn test_pixel_region_padded_zero_fills_outside() {
        let img = GrayImage::filled(8, 6, 7);
        let region = img.pixel_region_padded(&Rect::new(-3, -3, 2, 1));
        assert_eq!(region.ncols(), 6);
        assert_eq!(region.nrows(), 5);
        assert_eq!(region[(0, 0)], 0);
        assert_eq!(region[(2, 2)], 0);
        assert_eq!(region[(3, 3)], 7);
        assert_eq!(region.iter().filter(|&&v| v == 7).count(), 3 * 2);

        let outside = img.pixel_region_padded(&Rect::new(20, 20, 22, 21));
        assert_eq!((outside.nrows(), outside.ncols()), (2, 3));
        assert!(outside.iter().all(|&v| v == 0));

        let inside = Rect::new(1, 1, 4, 3);
        assert_eq!(img.pixel_region_padded(&inside), img.pixel_region(&inside));
    }

    #[test]
    fn test_centered_keeps_size_around_origin() {
        assert_eq!(Rect::centered(0.0, 0.0, 1.0, 1.0), Rect::new(0, 0, 1, 1));
        let r = Rect::centered(0.0, -1.0, 3.0, 5.0);
        assert_eq!((r.width(), r.height()), (3, 5));
        assert_eq!(r, Rect::new(-1, -3, 2, 2));
        let far = Rect::centered(-7.0, 7.0, 3.0, 3.0);
        assert_eq!((far.width(), far.height()), (3, 3));
    }

    #[test]
    fn test_fill_rect() {
        let mut img = GrayImage::filled(5, 5, 0);
        img.fill_rect(&Rect::new(3, 3, 10, 10), 200);
        assert_eq!(img.get(4, 4), 200);
        assert_eq!(img.get(2, 2), 0);
    }
}
