//! patchcarve: carve flat surface patches out of depth-sensed geometry.
//!
//! Aim a pointer at a real surface and get back a convex fan mesh covering the
//! contiguous, roughly planar region around the hit, ready for an XR overlay.
//!
//! # Quick Start
//!
//! ```no_run
//! use patchcarve::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let depth = DepthBuffer::filled(256, 256, 1.0)?;
//!     let camera = PinholeCamera::look_at(Vec3::ZERO, Vec3::Z, Vec3::Y, 256, 256, 60.0);
//!     let mut proxy = MeshProxy::new();
//!     proxy.add_rectangle(Vec3::new(0.0, 0.0, 1.0), Vec3::X, Vec3::Y);
//!
//!     let mut engine = SegmentationEngine::new(SegmentationOptions::default())?;
//!     let mut overlay = OverlayState::new();
//!     let ctx = FrameContext::new(&depth, &camera, &proxy);
//!
//!     // Once per frame:
//!     let pointer = Ray::new(Vec3::ZERO, Vec3::Z);
//!     let seed = Seed::acquire(&pointer, &proxy);
//!     engine.update(&mut overlay, seed.as_ref(), &ctx);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Strategies
//!
//! - [`Strategy::ImageSpace`] thresholds the depth buffer around the seed pixel,
//!   hulls the mask and back-projects the hull along camera rays
//! - [`Strategy::RaySpace`] probes a ring lattice on the seed's tangent plane
//!   and hulls the accepted hits directly
//!
//! Both end in the same fan mesh synthesis. A frame with no usable patch is a
//! [`Rejection`], never an error; the overlay is simply hidden.

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

mod engine;
mod overlay;
mod rejection;

pub use engine::{FrameContext, SegmentationEngine, Seed};
pub use overlay::{publish, OverlaySink, OverlayState};
pub use rejection::{Rejection, SeedIssue, Stage};

pub use patchcarve_core::{
    build_fan_mesh, convex_hull, convex_hull_indices, DepthMaskOptions, FanMeshBuilder,
    MeshOptions, PatchError, PatchMesh, PatchVertex, PixelRect, PlanarPoint, Quat, Ray, Result,
    RingSamplerOptions, RollingNormalFilter, RollingWindow, SeedOptions, SegmentationOptions,
    Strategy, SurfaceHit, TangentFrame, UVec2, Vec2, Vec3, WindowState,
};
pub use patchcarve_sensor::{
    is_valid_depth, CameraModel, DepthBuffer, DepthSource, MeshProxy, PinholeCamera, Raycaster,
};
pub use patchcarve_strategies::{
    BackProjector, DepthMask, DepthMaskExtractor, ProbeOutcome, RingSample, RingSampler,
};

/// Installs the `env_logger` backend for the `log` facade.
///
/// Safe to call more than once; later calls are ignored. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=patchcarve=debug` to see per-frame rejections.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
