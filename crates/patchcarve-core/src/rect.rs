//! Pixel-space rectangles for depth buffer regions of interest.

use serde::{Deserialize, Serialize};

/// Smallest ROI extent (per axis) after clamping.
pub const MIN_ROI_EXTENT: u32 = 2;

/// An axis-aligned rectangle in full-resolution pixel coordinates.
///
/// The origin may lie outside the buffer; [`PixelRect::clamp_to`] produces the
/// usable part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Creates a new rectangle.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a `size`×`size` rectangle centered on a pixel.
    #[allow(clippy::cast_possible_wrap)]
    pub fn centered(cx: i32, cy: i32, size: u32) -> Self {
        let half = (size / 2) as i32;
        Self::new(cx - half, cy - half, size, size)
    }

    /// Returns the number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Clamps the rectangle to a `buffer_width`×`buffer_height` buffer.
    ///
    /// The result is grown back to at least [`MIN_ROI_EXTENT`] per axis where the
    /// buffer allows it. Returns `None` for an empty buffer.
    pub fn clamp_to(&self, buffer_width: u32, buffer_height: u32) -> Option<Self> {
        if buffer_width == 0 || buffer_height == 0 {
            return None;
        }
        let (x, width) = clamp_axis(self.x, self.width, buffer_width);
        let (y, height) = clamp_axis(self.y, self.height, buffer_height);
        Some(Self::new(x, y, width, height))
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn clamp_axis(start: i32, extent: u32, limit: u32) -> (i32, u32) {
    let limit_i = i64::from(limit);
    let lo = i64::from(start).clamp(0, limit_i);
    let hi = (i64::from(start) + i64::from(extent)).clamp(0, limit_i);

    let min_extent = i64::from(MIN_ROI_EXTENT.min(limit));
    let mut lo = lo.min(hi);
    let mut hi = hi;
    if hi - lo < min_extent {
        // Grow toward whichever side has room.
        hi = (lo + min_extent).min(limit_i);
        lo = hi - min_extent;
    }
    (lo as i32, (hi - lo) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered() {
        let r = PixelRect::centered(100, 50, 128);
        assert_eq!(r, PixelRect::new(36, -14, 128, 128));
        assert_eq!(r.area(), 128 * 128);
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let r = PixelRect::new(10, 20, 30, 40);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[test]
    fn test_clamp_overhanging() {
        let r = PixelRect::new(-10, 90, 30, 30);
        assert_eq!(r.clamp_to(100, 100), Some(PixelRect::new(0, 90, 20, 10)));
    }

    #[test]
    fn test_clamp_enforces_minimum() {
        // Entirely off the right edge collapses to the last two columns.
        let r = PixelRect::new(150, 10, 5, 1);
        let c = r.clamp_to(100, 100).unwrap();
        assert_eq!(c, PixelRect::new(98, 10, 2, 2));
    }

    #[test]
    fn test_clamp_tiny_buffer() {
        let r = PixelRect::new(0, 0, 10, 10);
        assert_eq!(r.clamp_to(1, 1), Some(PixelRect::new(0, 0, 1, 1)));
        assert_eq!(r.clamp_to(0, 4), None);
    }
}
