//! Triangle-fan synthesis for convex boundary loops.
//!
//! The fan is anchored at the loop centroid: vertex 0 is the centroid and
//! vertices `1..=N` are the boundary in angular order around the fan normal.

use glam::{Vec2, Vec3};

use crate::frame::plane_basis;

/// Points closer than this (meters) are merged before triangulation.
pub const DEFAULT_DEDUP_TOLERANCE: f32 = 1e-5;

/// Below this length the area-weighted normal is treated as zero.
const MIN_AREA_NORMAL: f32 = 1e-10;

/// A renderable fan mesh covering a convex surface patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchMesh {
    /// Vertex positions; index 0 is the centroid.
    pub vertices: Vec<Vec3>,
    /// Per-vertex plane coordinates in meters (not normalized to `[0, 1]`).
    pub uvs: Vec<Vec2>,
    /// Per-vertex normals recomputed from the triangles.
    pub normals: Vec<Vec3>,
    /// Fan triangles, each `(0, i, i + 1)` with wrap-around.
    pub triangles: Vec<[u32; 3]>,
    /// Unit normal of the fan plane.
    pub normal: Vec3,
}

impl PatchMesh {
    /// Returns the number of triangles in the mesh.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the number of boundary vertices (excluding the centroid).
    #[must_use]
    pub fn boundary_len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Returns the centroid vertex.
    #[must_use]
    pub fn centroid(&self) -> Option<Vec3> {
        self.vertices.first().copied()
    }

    /// Returns true if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Sum of triangle areas signed by their orientation against [`PatchMesh::normal`].
    #[must_use]
    pub fn signed_area(&self) -> f32 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (va, vb, vc) = (
                    self.vertices[a as usize],
                    self.vertices[b as usize],
                    self.vertices[c as usize],
                );
                0.5 * (vb - va).cross(vc - va).dot(self.normal)
            })
            .sum()
    }

    /// Flattened triangle indices, three per triangle.
    #[must_use]
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Interleaved vertex data ready for upload to a GPU vertex buffer.
    #[must_use]
    pub fn vertex_buffer(&self) -> Vec<PatchVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| PatchVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }
}

/// GPU-compatible patch vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PatchVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Unit vertex normal.
    pub normal: [f32; 3],
    /// Plane coordinates in meters.
    pub uv: [f32; 2],
}

/// Builds [`PatchMesh`]es from boundary loops.
#[derive(Debug, Clone, Copy)]
pub struct FanMeshBuilder {
    dedup_tolerance: f32,
}

impl Default for FanMeshBuilder {
    fn default() -> Self {
        Self {
            dedup_tolerance: DEFAULT_DEDUP_TOLERANCE,
        }
    }
}

impl FanMeshBuilder {
    /// Creates a builder with the default merge tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the distance under which boundary points are merged.
    #[must_use]
    pub fn with_dedup_tolerance(mut self, tolerance: f32) -> Self {
        self.dedup_tolerance = tolerance.max(0.0);
        self
    }

    /// Triangulates a boundary loop. The winding of the input decides the
    /// fan normal.
    ///
    /// Returns `None` when fewer than three distinct points remain or the
    /// loop has no area.
    pub fn build(&self, boundary: &[Vec3]) -> Option<PatchMesh> {
        self.build_oriented(boundary, None)
    }

    /// Triangulates a boundary loop with its normal flipped, if needed, to
    /// point into the hemisphere of `facing`.
    pub fn build_facing(&self, boundary: &[Vec3], facing: Vec3) -> Option<PatchMesh> {
        self.build_oriented(boundary, Some(facing))
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn build_oriented(&self, boundary: &[Vec3], facing: Option<Vec3>) -> Option<PatchMesh> {
        let points = self.dedup(boundary);
        if points.len() < 3 {
            return None;
        }

        let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;

        // Area-weighted normal over the loop as given.
        let area_normal: Vec3 = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .map(|(&a, &b)| (a - centroid).cross(b - centroid))
            .sum();
        if area_normal.length() < MIN_AREA_NORMAL {
            return None;
        }
        let mut normal = area_normal.normalize();
        if let Some(facing) = facing {
            if normal.dot(facing) < 0.0 {
                normal = -normal;
            }
        }
        let (x, y) = plane_basis(normal);

        // Angular order around the centroid decides the triangulation.
        let mut ring: Vec<(f32, Vec3, Vec2)> = points
            .iter()
            .map(|&p| {
                let d = p - centroid;
                let local = Vec2::new(d.dot(x), d.dot(y));
                (local.y.atan2(local.x), p, local)
            })
            .collect();
        ring.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = ring.len();
        let mut mesh = PatchMesh {
            vertices: Vec::with_capacity(n + 1),
            uvs: Vec::with_capacity(n + 1),
            normals: Vec::new(),
            triangles: Vec::with_capacity(n),
            normal,
        };
        mesh.vertices.push(centroid);
        mesh.uvs.push(Vec2::ZERO);
        for &(_, p, local) in &ring {
            mesh.vertices.push(p);
            mesh.uvs.push(local);
        }

        for i in 0..n {
            let b = (i + 1) as u32;
            let c = ((i + 1) % n + 1) as u32;
            mesh.triangles.push([0, b, c]);
        }

        if mesh.signed_area() <= 0.0 {
            return None;
        }

        let mut normals = vec![Vec3::ZERO; mesh.vertices.len()];
        for &[a, b, c] in &mesh.triangles {
            accumulate_normal(&mesh.vertices, &mut normals, a, b, c);
        }
        mesh.normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();

        Some(mesh)
    }

    fn dedup(&self, boundary: &[Vec3]) -> Vec<Vec3> {
        let tol_sq = self.dedup_tolerance * self.dedup_tolerance;
        let mut unique: Vec<Vec3> = Vec::with_capacity(boundary.len());
        for &p in boundary {
            if !p.is_finite() {
                continue;
            }
            if unique.iter().all(|q| q.distance_squared(p) > tol_sq) {
                unique.push(p);
            }
        }
        unique
    }
}

/// Builds a fan mesh with the default builder.
pub fn build_fan_mesh(boundary: &[Vec3]) -> Option<PatchMesh> {
    FanMeshBuilder::default().build(boundary)
}

/// Accumulates the geometric normal of triangle (a, b, c) to all three vertices.
#[inline]
fn accumulate_normal(vertices: &[Vec3], normals: &mut [Vec3], a: u32, b: u32, c: u32) {
    let va = vertices[a as usize];
    let vb = vertices[b as usize];
    let vc = vertices[c as usize];
    let ab = va - vb;
    let cb = vc - vb;
    let n = cb.cross(ab);
    normals[a as usize] += n;
    normals[b as usize] += n;
    normals[c as usize] += n;
}
