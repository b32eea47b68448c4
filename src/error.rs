//! Unified error handling for the activity-atlas library.
//!
//! The aggregation pipeline itself never fails: missing fields, unknown periods
//! and undecodable geometry all have defined fallbacks. Errors only surface from
//! the edges of the crate (configuration loading, explicit geometry decoding and
//! the asset manifest tooling).

use std::path::PathBuf;

/// Unified error type for activity-atlas operations.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// Configuration failed validation
    #[error("Configuration error: {message}")]
    InvalidConfig { message: String },

    /// JSON input or output could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem access failed
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Activity geometry could not be decoded
    #[error("Activity '{activity_id}' has unusable geometry: {message}")]
    Geometry { activity_id: String, message: String },

    /// The heatmap assets directory does not exist
    #[error("Assets directory does not exist: {}", path.display())]
    MissingAssetsDir { path: PathBuf },

    /// The all-time heatmap SVG is missing from the assets directory
    #[error("Missing required file: {}", path.display())]
    MissingBaseSvg { path: PathBuf },
}

impl AtlasError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        AtlasError::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AtlasError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for activity-atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;
