//! Patch discovery strategies for patchcarve.
//!
//! Two ways of growing a patch outward from a seed hit:
//! - image space: [`DepthMaskExtractor`] thresholds the depth buffer around the
//!   seed pixel, the mask is hulled in pixel space and [`BackProjector`] lifts
//!   the hull to world space
//! - ray space: [`RingSampler`] fires short probes on rings in the seed's
//!   tangent plane and keeps the hits that stay on the seed surface

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod back_project;
pub mod depth_mask;
pub mod ring;

pub use back_project::BackProjector;
pub use depth_mask::{cell_center, extract, DepthMask, DepthMaskExtractor};
pub use ring::{ProbeOutcome, RingSample, RingSampler};
