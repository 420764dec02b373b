use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Startup failure: the artifact triple could not be loaded. Fatal.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("inconsistent artifact bundle: {0}")]
    Inconsistent(String),
}

/// Per-request failure. Always reported back to the caller, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("missing feature \"{0}\"")]
    MissingFeature(String),

    #[error("invalid value for feature \"{name}\": expected a number, got {value}")]
    InvalidValue { name: String, value: Value },

    #[error("internal inference error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn internal(msg: impl Into<String>) -> Self {
        PredictError::Internal(msg.into())
    }
}
