//! Image-space patch discovery: depth thresholding around a seed pixel.
//!
//! The ROI is resampled with nearest filtering so foreground and background
//! depths are never blended. Accepted pixels are decimated with a 50%
//! checkerboard before hulling; the hull only depends on boundary pixels, and
//! convex boundary pixels survive the stride in practice, though this is not
//! guaranteed to preserve the exact boundary.

use glam::{UVec2, Vec2};
use patchcarve_core::{DepthMaskOptions, PixelRect};
use patchcarve_sensor::{is_valid_depth, DepthSource};

/// Pixels of a resampled ROI whose depth matches the seed depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMask {
    /// The ROI after clamping to the buffer, in full-resolution pixels.
    pub roi: PixelRect,
    /// Resampling factor between the ROI and the mask grid.
    pub downsample: u32,
    /// Mask grid width (downsampled pixels).
    pub grid_width: u32,
    /// Mask grid height (downsampled pixels).
    pub grid_height: u32,
    /// Accepted pixels in mask grid coordinates, row-major scan order.
    pub pixels: Vec<UVec2>,
}

impl DepthMask {
    /// Number of accepted pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true if no pixel was accepted.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns whether enough pixels were accepted to form a polygon.
    pub fn is_sufficient(&self) -> bool {
        self.pixels.len() >= 3
    }

    /// Number of cells in the mask grid.
    pub fn grid_area(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// Fraction of grid cells that were accepted.
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f32 {
        if self.grid_area() == 0 {
            return 0.0;
        }
        self.pixels.len() as f32 / self.grid_area() as f32
    }

    /// Accepted pixels as points for hulling.
    #[allow(clippy::cast_precision_loss)]
    pub fn planar_points(&self) -> Vec<Vec2> {
        self.pixels
            .iter()
            .map(|p| Vec2::new(p.x as f32, p.y as f32))
            .collect()
    }

    /// Full-resolution screen position of the center of a mask cell.
    pub fn cell_center(&self, cell: Vec2) -> Vec2 {
        cell_center(self.roi, self.downsample, cell)
    }
}

/// Full-resolution screen position of the center of a downsampled ROI cell.
#[allow(clippy::cast_precision_loss)]
pub fn cell_center(roi: PixelRect, downsample: u32, cell: Vec2) -> Vec2 {
    let ds = downsample.max(1) as f32;
    Vec2::new(
        roi.x as f32 + (cell.x + 0.5) * ds,
        roi.y as f32 + (cell.y + 0.5) * ds,
    )
}

/// Thresholds a depth buffer ROI against a seed depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthMaskExtractor {
    threshold: f32,
    downsample: u32,
    checkerboard: bool,
}

impl DepthMaskExtractor {
    /// Creates an extractor. A zero `downsample` is treated as one.
    pub fn new(threshold: f32, downsample: u32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            downsample: downsample.max(1),
            checkerboard: true,
        }
    }

    /// Creates an extractor from image-space options.
    pub fn from_options(options: &DepthMaskOptions) -> Self {
        Self::new(options.depth_threshold, options.downsample).with_checkerboard(options.checkerboard)
    }

    /// Enables or disables the checkerboard decimation.
    #[must_use]
    pub fn with_checkerboard(mut self, enabled: bool) -> Self {
        self.checkerboard = enabled;
        self
    }

    /// Returns the resampling factor.
    pub fn downsample(&self) -> u32 {
        self.downsample
    }

    /// Extracts the mask of ROI pixels within the threshold of `seed_depth`.
    ///
    /// Returns `None` only when the depth source has no pixels. A mask with
    /// fewer than three pixels means no patch was found.
    pub fn extract<D>(&self, depth: &D, roi: PixelRect, seed_depth: f32) -> Option<DepthMask>
    where
        D: DepthSource + ?Sized,
    {
        let (width, height) = depth.dimensions();
        let roi = roi.clamp_to(width, height)?;
        let ds = self.downsample;
        let grid_width = (roi.width / ds).max(1);
        let grid_height = (roi.height / ds).max(1);

        let mut pixels = Vec::with_capacity(grid_width as usize * grid_height as usize / 2 + 1);
        let mut rejected_invalid = 0usize;
        for gy in 0..grid_height {
            for gx in 0..grid_width {
                if self.checkerboard && (gx ^ gy) & 1 != 0 {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let center = cell_center(roi, ds, Vec2::new(gx as f32, gy as f32));
                let d = depth.sample_nearest(center.x, center.y);
                if !is_valid_depth(d) {
                    rejected_invalid += 1;
                    continue;
                }
                if (d - seed_depth).abs() <= self.threshold {
                    pixels.push(UVec2::new(gx, gy));
                }
            }
        }

        log::trace!(
            "depth mask: {} of {}x{} cells accepted, {} without depth",
            pixels.len(),
            grid_width,
            grid_height,
            rejected_invalid
        );

        Some(DepthMask {
            roi,
            downsample: ds,
            grid_width,
            grid_height,
            pixels,
        })
    }
}

/// Convenience wrapper around [`DepthMaskExtractor::extract`] with
/// checkerboard decimation enabled.
pub fn extract<D>(
    depth: &D,
    roi: PixelRect,
    seed_depth: f32,
    threshold: f32,
    downsample: u32,
) -> Option<DepthMask>
where
    D: DepthSource + ?Sized,
{
    DepthMaskExtractor::new(threshold, downsample).extract(depth, roi, seed_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchcarve_sensor::DepthBuffer;
    use proptest::prelude::*;

    #[test]
    fn test_flat_buffer_half_coverage() {
        let buffer = DepthBuffer::filled(256, 256, 1.0).unwrap();
        let mask = extract(&buffer, PixelRect::new(64, 64, 128, 128), 1.0, 0.03, 1).unwrap();
        assert_eq!(mask.grid_area(), 128 * 128);
        assert_eq!(mask.len(), 128 * 128 / 2);
        assert!((mask.coverage() - 0.5).abs() < 1e-6);
        for p in &mask.pixels {
            assert_eq!((p.x ^ p.y) & 1, 0);
        }
    }

    #[test]
    fn test_checkerboard_can_be_disabled() {
        let buffer = DepthBuffer::filled(16, 16, 2.0).unwrap();
        let mask = DepthMaskExtractor::new(0.01, 1)
            .with_checkerboard(false)
            .extract(&buffer, PixelRect::new(0, 0, 16, 16), 2.0)
            .unwrap();
        assert_eq!(mask.len(), 256);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let seed = 1.0f32;
        let threshold = 0.031_25f32;
        let at_limit = DepthBuffer::filled(4, 4, seed + threshold).unwrap();
        let beyond = DepthBuffer::filled(4, 4, seed + threshold + 1e-3).unwrap();
        let roi = PixelRect::new(0, 0, 4, 4);

        let accepted = extract(&at_limit, roi, seed, threshold, 1).unwrap();
        assert_eq!(accepted.len(), 8);
        let rejected = extract(&beyond, roi, seed, threshold, 1).unwrap();
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_invalid_depth_excluded() {
        let buffer = DepthBuffer::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 1.0 }).unwrap();
        let mask = DepthMaskExtractor::new(10.0, 1)
            .with_checkerboard(false)
            .extract(&buffer, PixelRect::new(0, 0, 8, 8), 0.0)
            .unwrap();
        // Zero depth is never accepted, even when it matches the seed.
        assert!(mask.pixels.iter().all(|p| p.x >= 4));
        assert_eq!(mask.len(), 32);
    }

    #[test]
    fn test_downsample_grid() {
        let buffer = DepthBuffer::from_fn(64, 64, |x, _| if x < 32 { 1.0 } else { 3.0 }).unwrap();
        let mask = DepthMaskExtractor::new(0.1, 4)
            .with_checkerboard(false)
            .extract(&buffer, PixelRect::new(0, 0, 64, 64), 1.0)
            .unwrap();
        assert_eq!((mask.grid_width, mask.grid_height), (16, 16));
        assert_eq!(mask.len(), 8 * 16);
        assert_eq!(mask.cell_center(Vec2::new(0.0, 0.0)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_roi_clamped_to_buffer() {
        let buffer = DepthBuffer::filled(32, 32, 1.0).unwrap();
        let mask = extract(&buffer, PixelRect::new(-16, 24, 32, 32), 1.0, 0.01, 1).unwrap();
        assert_eq!(mask.roi, PixelRect::new(0, 24, 16, 8));
    }

    #[test]
    fn test_step_edge_limits_mask() {
        // Near box in the left half, far wall on the right.
        let buffer = DepthBuffer::from_fn(64, 64, |x, _| if x < 32 { 0.8 } else { 2.0 }).unwrap();
        let mask = extract(&buffer, PixelRect::new(0, 0, 64, 64), 0.8, 0.03, 2).unwrap();
        assert!(mask.is_sufficient());
        assert!(mask.pixels.iter().all(|p| p.x < 16));
    }

    proptest! {
        #[test]
        fn prop_accepted_pixels_within_threshold(
            seed_depth in 0.5f32..3.0,
            threshold in 0.0f32..0.2,
            downsample in 1u32..4,
        ) {
            let buffer = DepthBuffer::from_fn(48, 48, |x, y| 0.5 + 0.05 * ((x * 7 + y * 3) % 50) as f32)
                .unwrap();
            let extractor = DepthMaskExtractor::new(threshold, downsample);
            let mask = extractor
                .extract(&buffer, PixelRect::new(4, 4, 40, 40), seed_depth)
                .unwrap();
            for p in &mask.pixels {
                prop_assert!(p.x < mask.grid_width && p.y < mask.grid_height);
                prop_assert_eq!((p.x ^ p.y) & 1, 0);
                let c = mask.cell_center(Vec2::new(p.x as f32, p.y as f32));
                let d = buffer.sample_nearest(c.x, c.y);
                prop_assert!((d - seed_depth).abs() <= threshold);
            }
        }
    }
}
