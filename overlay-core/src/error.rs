//! Error types for editor operations.
//!
//! Core document operations never fail: out-of-range values are clamped and
//! stale ids are ignored. Errors only arise at the edges, when serializing
//! snapshots or when an external collaborator (image loader, exporter)
//! reports a failure.

use thiserror::Error;

/// Result type for editor operations.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Errors that can occur at the editor's collaborator boundaries.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Document or scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The supplied file is not a supported image type.
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),

    /// The image loader failed to decode or read the image.
    #[error("Failed to load image: {0}")]
    ImageLoad(String),

    /// The image reported zero or otherwise unusable dimensions.
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions {
        /// Reported width in pixels.
        width: u32,
        /// Reported height in pixels.
        height: u32,
    },

    /// Exporting the composited scene failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// A configuration value is outside its usable range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Export was requested before any base image was loaded.
    #[error("No base image loaded")]
    NoBaseImage,
}
