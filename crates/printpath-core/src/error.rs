//! Error handling for printpath
//!
//! These errors only surface at configuration and setup time. The parse
//! hot path is best-effort and non-throwing: malformed numeric fields are
//! skipped, unknown commands ignored, and a bad line never aborts a load.

use thiserror::Error;

/// Viewer error type
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A hex color string could not be parsed.
    #[error("Invalid color value: {value}")]
    InvalidColor {
        /// The rejected color string.
        value: String,
    },

    /// A quality tier outside the supported range.
    #[error("Quality tier out of range: {tier} (expected 1-5 or max)")]
    InvalidTier {
        /// The rejected tier level.
        tier: u8,
    },

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for viewer operations.
pub type Result<T> = std::result::Result<T, ViewerError>;
