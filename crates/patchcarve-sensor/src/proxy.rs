//! Raycast contract and a triangle-soup environment proxy.

use glam::Vec3;
use patchcarve_core::{Ray, SurfaceHit};

/// Nearest-hit queries against the environment geometry.
///
/// Implementations must return `None` rather than a hit with zero confidence.
pub trait Raycaster {
    /// Returns the nearest hit along the ray within its `max_distance`.
    fn raycast(&self, ray: &Ray) -> Option<SurfaceHit>;
}

impl<F> Raycaster for F
where
    F: Fn(&Ray) -> Option<SurfaceHit>,
{
    fn raycast(&self, ray: &Ray) -> Option<SurfaceHit> {
        self(ray)
    }
}

/// Environment proxy built from world-space triangles.
///
/// Triangles are two-sided; reported normals face the ray origin, the way a
/// depth sensor sees surfaces.
#[derive(Debug, Clone)]
pub struct MeshProxy {
    triangles: Vec<[Vec3; 3]>,
    confidence: f32,
}

impl Default for MeshProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshProxy {
    /// Creates an empty proxy reporting full confidence.
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            confidence: 1.0,
        }
    }

    /// Sets the normal confidence attached to every hit.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Adds a triangle.
    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3) -> &mut Self {
        self.triangles.push([v0, v1, v2]);
        self
    }

    /// Adds a quad given its corners in order.
    pub fn add_quad(&mut self, corners: [Vec3; 4]) -> &mut Self {
        let [a, b, c, d] = corners;
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d)
    }

    /// Adds a rectangle centered at `center`, spanned by `half_u` and `half_v`.
    pub fn add_rectangle(&mut self, center: Vec3, half_u: Vec3, half_v: Vec3) -> &mut Self {
        self.add_quad([
            center - half_u - half_v,
            center + half_u - half_v,
            center + half_u + half_v,
            center - half_u + half_v,
        ])
    }

    /// Number of triangles in the proxy.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the proxy has no geometry.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Raycaster for MeshProxy {
    fn raycast(&self, ray: &Ray) -> Option<SurfaceHit> {
        if self.confidence <= 0.0 {
            return None;
        }
        let dir = ray.direction.try_normalize()?;
        let mut best: Option<(f32, Vec3)> = None;
        for &[v0, v1, v2] in &self.triangles {
            let Some(t) = ray_intersect_triangle(ray.origin, dir, v0, v1, v2) else {
                continue;
            };
            if t > ray.max_distance || best.is_some_and(|(bt, _)| bt <= t) {
                continue;
            }
            let face = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            let normal = if face.dot(dir) > 0.0 { -face } else { face };
            best = Some((t, normal));
        }
        best.map(|(t, normal)| SurfaceHit::new(ray.origin + dir * t, normal, self.confidence))
    }
}

/// Möller–Trumbore intersection; returns the distance along a unit `ray_dir`.
fn ray_intersect_triangle(ray_origin: Vec3, ray_dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let eps = 1e-6;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray_dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < eps {
        return None;
    }
    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    if t > eps { Some(t) } else { None }
}
