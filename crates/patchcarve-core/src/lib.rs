//! Core geometry for patchcarve.
//!
//! This crate provides the value types and algorithms shared by both patch
//! discovery strategies:
//! - [`TangentFrame`] for expressing surface points in local plane coordinates
//! - [`convex_hull`] (monotone chain) for boundary extraction
//! - [`FanMeshBuilder`] / [`PatchMesh`] for boundary-to-mesh synthesis
//! - [`RollingNormalFilter`] for frame-to-frame normal smoothing
//! - [`SegmentationOptions`] and the [`PatchError`] type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod fan_mesh;
pub mod frame;
pub mod hit;
pub mod hull;
pub mod options;
pub mod rect;
pub mod rolling;

pub use error::{PatchError, Result};
pub use fan_mesh::{build_fan_mesh, FanMeshBuilder, PatchMesh, PatchVertex};
pub use frame::{plane_basis, TangentFrame, WORLD_RIGHT, WORLD_UP};
pub use hit::{Ray, SurfaceHit};
pub use hull::{convex_hull, convex_hull_indices, PlanarPoint};
pub use options::{
    DepthMaskOptions, MeshOptions, RingSamplerOptions, SeedOptions, SegmentationOptions,
    Strategy,
};
pub use rect::PixelRect;
pub use rolling::{RollingNormalFilter, RollingWindow, WindowState};

// Re-export glam types for convenience
pub use glam::{Quat, UVec2, Vec2, Vec3};
