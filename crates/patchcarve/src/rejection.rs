//! Per-frame reasons a segmentation attempt produced no patch.
//!
//! These are expected outcomes, not failures: the next frame simply tries
//! again. They never reach the end user; the overlay is hidden instead.

use std::fmt;

use thiserror::Error;

/// Why a seed was not usable this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeedIssue {
    /// No surface under the pointer.
    #[error("pointer did not hit a surface")]
    NoHit,
    /// Seed normal confidence below the minimum.
    #[error("normal confidence below threshold")]
    LowConfidence,
    /// Seed normal points down past the ceiling alignment.
    #[error("surface faces down like a ceiling")]
    Ceiling,
    /// Seed is behind, or on, the camera's image plane.
    #[error("seed is behind the camera")]
    BehindCamera,
    /// Seed projects outside the depth image (image space only).
    #[error("seed projects outside the depth image")]
    OffScreen,
}

/// Pipeline stage at which too few points remained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Depth thresholding around the seed pixel.
    DepthMask,
    /// Ring lattice probing.
    RingSampler,
    /// Convex hull of the surviving points.
    Hull,
    /// Lifting the pixel hull into world space.
    BackProjection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DepthMask => "depth mask",
            Stage::RingSampler => "ring sampler",
            Stage::Hull => "convex hull",
            Stage::BackProjection => "back-projection",
        };
        f.write_str(name)
    }
}

/// Outcome of an attempt that did not yield a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The seed was missing or unusable.
    #[error("no seed: {0}")]
    NoSeed(SeedIssue),

    /// Fewer than three points survived a stage.
    #[error("insufficient boundary after {stage}: {count} points")]
    InsufficientBoundary {
        /// Stage that came up short.
        stage: Stage,
        /// Points left after it.
        count: usize,
    },

    /// A zero normal or zero-area boundary.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}

impl Rejection {
    /// Shorthand for a boundary that fell below three points.
    pub fn insufficient(stage: Stage, count: usize) -> Self {
        Self::InsufficientBoundary { stage, count }
    }
}

impl From<SeedIssue> for Rejection {
    fn from(issue: SeedIssue) -> Self {
        Self::NoSeed(issue)
    }
}
