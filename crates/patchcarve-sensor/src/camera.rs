//! Camera projection contract and a pinhole implementation.
//!
//! Screen coordinates are in pixels with the origin at the top-left corner
//! and y growing downward, matching depth buffer rows.

use glam::Vec3;
use patchcarve_core::Ray;

/// Projection between world space and screen pixels.
pub trait CameraModel {
    /// Camera center in world space.
    fn position(&self) -> Vec3;

    /// Projects a world point to `(x, y, z)`: pixel coordinates plus the view
    /// depth along the optical axis. `z <= 0` means the point is behind the
    /// camera and `x`, `y` carry no meaning.
    fn world_to_screen(&self, point: Vec3) -> Vec3;

    /// Returns the ray from the camera center through a screen position.
    fn screen_to_ray(&self, x: f32, y: f32) -> Ray;
}

/// An ideal pinhole camera with a symmetric vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Unit viewing direction.
    forward: Vec3,
    /// Unit up vector, orthogonal to `forward`.
    up: Vec3,
    /// Unit right vector, `forward × up`.
    right: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PinholeCamera {
    /// Creates a camera at the origin looking down -Z with +Y up.
    pub fn new(width: u32, height: u32, fov_y_degrees: f32) -> Self {
        Self::look_at(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, width, height, fov_y_degrees)
    }

    /// Creates a camera at `position` looking at `target`.
    ///
    /// `up` only needs to be non-parallel to the viewing direction; it is
    /// re-orthogonalized.
    pub fn look_at(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        width: u32,
        height: u32,
        fov_y_degrees: f32,
    ) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward).normalize();
        Self {
            position,
            forward,
            up,
            right,
            fov_y: fov_y_degrees.to_radians().clamp(0.01, std::f32::consts::PI - 0.01),
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Returns the viewing direction.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Returns the camera up direction.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Returns the camera right direction.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Aspect ratio (width / height).
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Returns FOV in degrees.
    pub fn fov_degrees(&self) -> f32 {
        self.fov_y.to_degrees()
    }

    /// Returns whether a pixel position lies inside the image.
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (0.0..self.width as f32).contains(&x) && (0.0..self.height as f32).contains(&y)
    }

    fn half_extents(&self) -> (f32, f32) {
        let half_h = (self.fov_y * 0.5).tan();
        (half_h * self.aspect_ratio(), half_h)
    }
}

impl CameraModel for PinholeCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    #[allow(clippy::cast_precision_loss)]
    fn world_to_screen(&self, point: Vec3) -> Vec3 {
        let v = point - self.position;
        let z = v.dot(self.forward);
        // Too close to the image plane to project; reported as behind.
        if z <= f32::EPSILON {
            return Vec3::new(0.0, 0.0, z.min(0.0));
        }
        let (half_w, half_h) = self.half_extents();
        let ndc_x = v.dot(self.right) / (z * half_w);
        let ndc_y = v.dot(self.up) / (z * half_h);
        Vec3::new(
            (ndc_x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc_y) * 0.5 * self.height as f32,
            z,
        )
    }

    #[allow(clippy::cast_precision_loss)]
    fn screen_to_ray(&self, x: f32, y: f32) -> Ray {
        let half_width = self.width as f32 / 2.0;
        let half_height = self.height as f32 / 2.0;
        let ndc_x = (x / half_width) - 1.0;
        let ndc_y = 1.0 - (y / half_height);
        let (half_w, half_h) = self.half_extents();
        let direction =
            self.forward + self.right * (ndc_x * half_w) + self.up * (ndc_y * half_h);
        Ray::new(self.position, direction.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> PinholeCamera {
        PinholeCamera::look_at(Vec3::ZERO, Vec3::Z, Vec3::Y, 640, 480, 60.0)
    }

    #[test]
    fn test_center_projects_to_image_center() {
        let cam = camera();
        let s = cam.world_to_screen(Vec3::new(0.0, 0.0, 2.0));
        assert!((s.x - 320.0).abs() < 1e-3);
        assert!((s.y - 240.0).abs() < 1e-3);
        assert!((s.z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_up_is_toward_top_row() {
        let cam = camera();
        let s = cam.world_to_screen(Vec3::new(0.0, 0.5, 2.0));
        assert!(s.y < 240.0);
    }

    #[test]
    fn test_behind_camera() {
        let cam = camera();
        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, -1.0)).z <= 0.0);
        assert!(cam.world_to_screen(Vec3::new(1.0, 0.0, 0.0)).z <= 0.0);
        // In front by less than the projection tolerance.
        assert!(cam.world_to_screen(Vec3::new(0.0, 0.0, 1e-8)).z <= 0.0);
    }

    #[test]
    fn test_pixel_ray_world_round_trip() {
        let cam = PinholeCamera::look_at(
            Vec3::new(0.3, 1.6, -0.2),
            Vec3::new(1.0, 1.0, 2.0),
            Vec3::Y,
            512,
            384,
            75.0,
        );
        for &(px, py) in &[(10.5, 20.5), (256.0, 192.0), (500.25, 380.75)] {
            let ray = cam.screen_to_ray(px, py);
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
            let world = ray.at(1.7);
            let back = cam.world_to_screen(world);
            assert!((back.x - px).abs() < 1e-2, "{} vs {px}", back.x);
            assert!((back.y - py).abs() < 1e-2, "{} vs {py}", back.y);
            assert!(back.z > 0.0);
        }
    }

    #[test]
    fn test_contains() {
        let cam = camera();
        assert!(cam.contains(0.0, 0.0));
        assert!(!cam.contains(640.0, 10.0));
        assert!(!cam.contains(-0.1, 10.0));
    }

    proptest! {
        #[test]
        fn prop_screen_ray_reprojects(
            px in 0.0f32..640.0,
            py in 0.0f32..480.0,
            distance in 0.1f32..10.0,
        ) {
            let cam = camera();
            let back = cam.world_to_screen(cam.screen_to_ray(px, py).at(distance));
            prop_assert!((back.x - px).abs() < 0.05);
            prop_assert!((back.y - py).abs() < 0.05);
            prop_assert!(back.z > 0.0);
        }
    }
}
