//! Mapping hull vertices from mask pixels back to world space.

use glam::{Vec2, Vec3};
use patchcarve_core::PixelRect;
use patchcarve_sensor::{is_valid_depth, CameraModel, DepthSource};

use crate::depth_mask::{cell_center, DepthMask};

/// Parameters for lifting a pixel-space boundary into world space.
///
/// Depth is treated as distance along the camera ray, not as a planar Z
/// value: `world = camera + normalize(ray) * depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackProjector {
    /// ROI the mask grid was sampled from.
    pub roi: PixelRect,
    /// Mask grid to full resolution scale.
    pub downsample: u32,
    /// Depth used where a vertex has no depth of its own.
    pub seed_depth: f32,
    /// Unit seed normal, used for the lift.
    pub seed_normal: Vec3,
    /// Offset along the seed normal that keeps the overlay off the surface.
    pub lift_along_normal: f32,
}

impl BackProjector {
    /// Creates a back-projector for the grid a mask was extracted on.
    pub fn for_mask(mask: &DepthMask, seed_depth: f32, seed_normal: Vec3, lift_along_normal: f32) -> Self {
        Self {
            roi: mask.roi,
            downsample: mask.downsample,
            seed_depth,
            seed_normal,
            lift_along_normal,
        }
    }

    /// Back-projects one mask-grid vertex.
    ///
    /// A missing depth falls back to the seed depth so the boundary keeps its
    /// vertex. Returns `None` only if the camera yields a non-finite point.
    pub fn project_vertex<D, C>(&self, vertex: Vec2, depth: &D, camera: &C) -> Option<Vec3>
    where
        D: DepthSource + ?Sized,
        C: CameraModel + ?Sized,
    {
        let screen = cell_center(self.roi, self.downsample, vertex);
        let sampled = depth.sample_nearest(screen.x, screen.y);
        let distance = if is_valid_depth(sampled) {
            sampled
        } else {
            log::trace!(
                "no depth at ({:.1}, {:.1}), using seed depth {:.3}",
                screen.x,
                screen.y,
                self.seed_depth
            );
            self.seed_depth
        };

        let ray = camera.screen_to_ray(screen.x, screen.y);
        let world = ray.origin
            + ray.direction.normalize_or_zero() * distance
            + self.seed_normal * self.lift_along_normal;
        world.is_finite().then_some(world)
    }

    /// Back-projects every hull vertex, preserving order.
    pub fn project<D, C>(&self, hull: &[Vec2], depth: &D, camera: &C) -> Vec<Vec3>
    where
        D: DepthSource + ?Sized,
        C: CameraModel + ?Sized,
    {
        hull.iter()
            .filter_map(|&v| self.project_vertex(v, depth, camera))
            .collect()
    }
}
