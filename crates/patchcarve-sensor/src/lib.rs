//! Sensor-side contracts for patchcarve.
//!
//! The segmentation core never talks to an XR runtime directly. Hosts supply
//! typed adapters for three collaborators:
//! - [`DepthSource`] - point-sampled depth in meters ([`DepthBuffer`] is the
//!   in-memory implementation)
//! - [`CameraModel`] - world/screen projection ([`PinholeCamera`])
//! - [`Raycaster`] - nearest-hit queries against the environment ([`MeshProxy`])

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod depth;
pub mod proxy;

pub use camera::{CameraModel, PinholeCamera};
pub use depth::{is_valid_depth, DepthBuffer, DepthSource};
pub use proxy::{MeshProxy, Raycaster};
