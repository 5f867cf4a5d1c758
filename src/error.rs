//! Error types for the seal-extract crate.

use crate::settings::DetectionMode;

/// Errors that can occur while extracting a seal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The detection mode is declared but has no classification rule.
    #[error("detection mode `{0}` is not supported (use `red` or `black`)")]
    UnsupportedDetectionMode(DetectionMode),

    /// A detection mode name could not be parsed.
    #[error("unknown detection mode: {0}")]
    UnknownDetectionMode(String),

    /// The upscale factor is not a positive, finite number, or the result
    /// would be too large to allocate.
    #[error("invalid scale factor {0}")]
    InvalidScale(f32),

    /// The primary vector tracer failed.
    #[error("tracing failed: {0}")]
    Trace(String),

    /// The optional analysis collaborator failed.
    #[error("advisor failed: {0}")]
    Advisor(String),

    /// A settings document could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
