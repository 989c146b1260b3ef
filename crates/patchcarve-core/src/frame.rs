//! Tangent frames for expressing surface points in local plane coordinates.
//!
//! A frame is defined by an origin on the surface and the surface normal.
//! Two tangent axes span the plane; `(x, y, n)` is right-handed with
//! `y = n × x`.

use glam::{Vec2, Vec3};

/// World up, used to seed the first tangent axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Fallback reference when the normal is nearly parallel to [`WORLD_UP`].
pub const WORLD_RIGHT: Vec3 = Vec3::X;

/// Below this squared length the `up × n` cross product is considered degenerate.
const DEGENERATE_CROSS_SQ: f32 = 1e-6;

/// Orthonormal basis anchored on a surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    /// A point on the plane.
    origin: Vec3,
    /// Unit surface normal.
    normal: Vec3,
    /// First unit tangent.
    tangent_x: Vec3,
    /// Second unit tangent, `normal × tangent_x`.
    tangent_y: Vec3,
}

impl TangentFrame {
    /// Builds a frame from an origin and a non-zero normal.
    ///
    /// The normal does not need to be unit length. Passing a zero normal yields
    /// NaN axes; use [`TangentFrame::try_build`] when the input is unchecked.
    pub fn build(origin: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize();
        let (tangent_x, tangent_y) = plane_basis(n);
        Self {
            origin,
            normal: n,
            tangent_x,
            tangent_y,
        }
    }

    /// Builds a frame, returning `None` for a zero or non-finite normal.
    pub fn try_build(origin: Vec3, normal: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        let n = normal.try_normalize()?;
        Some(Self::build(origin, n))
    }

    /// Returns the origin point of the frame.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Returns the unit normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the first tangent axis.
    pub fn tangent_x(&self) -> Vec3 {
        self.tangent_x
    }

    /// Returns the second tangent axis.
    pub fn tangent_y(&self) -> Vec3 {
        self.tangent_y
    }

    /// Returns the signed distance from a point to the plane.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.normal)
    }

    /// Projects a world point into local plane coordinates.
    pub fn to_plane(&self, point: Vec3) -> Vec2 {
        let d = point - self.origin;
        Vec2::new(d.dot(self.tangent_x), d.dot(self.tangent_y))
    }

    /// Lifts local plane coordinates back onto the plane in world space.
    pub fn to_world(&self, plane: Vec2) -> Vec3 {
        self.origin + self.tangent_x * plane.x + self.tangent_y * plane.y
    }
}

/// Returns two unit tangents `(x, y)` spanning the plane orthogonal to `n`.
///
/// `n` must be unit length. `x = normalize(up × n)`, falling back to the world
/// right axis when `n` is nearly vertical, and `y = n × x`.
pub fn plane_basis(n: Vec3) -> (Vec3, Vec3) {
    let mut x = WORLD_UP.cross(n);
    if x.length_squared() < DEGENERATE_CROSS_SQ {
        x = WORLD_RIGHT.cross(n);
    }
    let x = x.normalize();
    let y = n.cross(x);
    (x, y)
}
