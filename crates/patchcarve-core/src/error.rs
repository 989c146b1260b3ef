//! Error types for patchcarve.
//!
//! Per-frame segmentation failures are not errors; they are reported as
//! rejections by the engine. This type covers configuration and construction.

use thiserror::Error;

/// The main error type for patchcarve operations.
#[derive(Error, Debug)]
pub enum PatchError {
    /// An option is outside its valid range.
    #[error("invalid option '{name}': {reason}")]
    InvalidOption {
        name: &'static str,
        reason: String,
    },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A depth buffer or ROI has no pixels.
    #[error("empty buffer: {0}x{1}")]
    EmptyBuffer(u32, u32),

    /// Failed to decode a depth image.
    #[error("image error: {0}")]
    ImageError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PatchError {
    /// Shorthand for [`PatchError::InvalidOption`].
    pub fn invalid_option(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for patchcarve operations.
pub type Result<T> = std::result::Result<T, PatchError>;
