//! CO2 emission inference service.
//!
//! Loads a trained regressor, feature scaler and category thresholds once at
//! startup, then answers stateless predictions over HTTP.

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod regressor;
pub mod scaler;
pub mod server;
pub mod thresholds;

pub use artifacts::{ArtifactBundle, ArtifactPaths};
pub use engine::{Category, InferenceEngine, Prediction};
pub use error::{ArtifactLoadError, PredictError};
