//! Rays and ray/surface intersections.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A single ray/surface intersection reported by a raycast collaborator.
///
/// The normal is stored as reported and is not guaranteed to be unit length;
/// use [`SurfaceHit::unit_normal`] before building any basis from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// The world position of the hit.
    pub point: Vec3,

    /// The surface normal at the hit, possibly unnormalized.
    pub normal: Vec3,

    /// Confidence of the normal estimate, in `[0, 1]`.
    pub normal_confidence: f32,
}

impl SurfaceHit {
    /// Creates a new hit. The confidence is clamped to `[0, 1]`.
    pub fn new(point: Vec3, normal: Vec3, normal_confidence: f32) -> Self {
        Self {
            point,
            normal,
            normal_confidence: normal_confidence.clamp(0.0, 1.0),
        }
    }

    /// Returns the normalized normal, or `None` if it is zero or non-finite.
    pub fn unit_normal(&self) -> Option<Vec3> {
        self.normal.try_normalize()
    }

    /// Returns whether this hit passes a minimum confidence gate.
    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.normal_confidence >= min_confidence
    }
}

/// A half-line with an optional length limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point of the ray.
    pub origin: Vec3,

    /// Direction of travel. Not required to be unit length.
    pub direction: Vec3,

    /// Maximum distance along the normalized direction (`f32::INFINITY` = unbounded).
    pub max_distance: f32,
}

impl Ray {
    /// Creates an unbounded ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            max_distance: f32::INFINITY,
        }
    }

    /// Creates a ray that only reports hits within `max_distance`.
    pub fn with_max_distance(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            direction,
            max_distance,
        }
    }

    /// Returns the normalized direction, or zero for a degenerate ray.
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalize_or_zero()
    }

    /// Returns the point at distance `t` along the normalized direction.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.unit_direction() * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let hit = SurfaceHit::new(Vec3::ZERO, Vec3::Z, 1.7);
        assert_eq!(hit.normal_confidence, 1.0);
        let hit = SurfaceHit::new(Vec3::ZERO, Vec3::Z, -0.2);
        assert_eq!(hit.normal_confidence, 0.0);
    }

    #[test]
    fn test_unit_normal() {
        let hit = SurfaceHit::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0), 1.0);
        assert_eq!(hit.unit_normal(), Some(Vec3::NEG_Z));

        let zero = SurfaceHit::new(Vec3::ZERO, Vec3::ZERO, 1.0);
        assert!(zero.unit_normal().is_none());
    }

    #[test]
    fn test_ray_at_uses_unit_direction() {
        let ray = Ray::new(Vec3::ONE, Vec3::new(0.0, 3.0, 0.0));
        assert!((ray.at(2.0) - Vec3::new(1.0, 3.0, 1.0)).length() < 1e-6);
        assert!(ray.max_distance.is_infinite());
    }
}
