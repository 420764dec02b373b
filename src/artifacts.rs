//! Loading of the trained artifact triple (regressor, scaler, thresholds).
//!
//! The three files come from one training run and are loaded together: if any
//! of them is missing, malformed or inconsistent with the others, nothing is
//! returned and the process must not serve.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::de::DeserializeOwned;

use crate::{
    error::ArtifactLoadError,
    features::{FEATURE_COUNT, FEATURE_NAMES},
    regressor::{Regressor, RegressorModel},
    scaler::{FeatureTransform, StandardScaler},
    thresholds::Thresholds,
};

pub const REGRESSOR_FILE: &str = "regressor.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const THRESHOLDS_FILE: &str = "thresholds.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub regressor: PathBuf,
    pub scaler: PathBuf,
    pub thresholds: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside one directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            regressor: dir.join(REGRESSOR_FILE),
            scaler: dir.join(SCALER_FILE),
            thresholds: dir.join(THRESHOLDS_FILE),
        }
    }
}

/// Immutable after construction; shared read-only across requests.
pub struct ArtifactBundle {
    pub regressor: Arc<dyn Regressor>,
    pub scaler: Arc<dyn FeatureTransform>,
    pub thresholds: Thresholds,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("regressor", &self.regressor.kind())
            .field("scaler_width", &self.scaler.width())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl ArtifactBundle {
    /// Assemble a bundle from already-built parts, e.g. stubs in tests.
    /// No width checks are made here; mismatches surface per request.
    pub fn from_parts(
        regressor: Arc<dyn Regressor>,
        scaler: Arc<dyn FeatureTransform>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            regressor,
            scaler,
            thresholds,
        }
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let regressor: RegressorModel = read_json(&paths.regressor)?;
        regressor
            .validate()
            .map_err(|reason| invalid(&paths.regressor, reason))?;

        let scaler: StandardScaler = read_json(&paths.scaler)?;
        scaler
            .validate()
            .map_err(|reason| invalid(&paths.scaler, reason))?;
        if let Some(names) = &scaler.feature_names {
            if let Some(i) = names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .position(|(got, want)| got != want)
            {
                return Err(invalid(
                    &paths.scaler,
                    format!(
                        "column {} is \"{}\", expected \"{}\"",
                        i, names[i], FEATURE_NAMES[i]
                    ),
                ));
            }
        }

        let thresholds: Thresholds = read_json(&paths.thresholds)?;
        thresholds
            .validate()
            .map_err(|reason| invalid(&paths.thresholds, reason))?;

        if scaler.width() != FEATURE_COUNT {
            return Err(ArtifactLoadError::Inconsistent(format!(
                "scaler was fit on {} features, expected {}",
                scaler.width(),
                FEATURE_COUNT
            )));
        }
        if let Some(w) = regressor.width() {
            if w != FEATURE_COUNT {
                return Err(ArtifactLoadError::Inconsistent(format!(
                    "regressor was fit on {} features, expected {}",
                    w, FEATURE_COUNT
                )));
            }
        }

        tracing::info!(
            regressor = regressor.kind(),
            low = thresholds.low,
            high = thresholds.high,
            "artifacts loaded"
        );

        Ok(Self {
            regressor: Arc::new(regressor),
            scaler: Arc::new(scaler),
            thresholds,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let bytes = fs::read(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, reason: String) -> ArtifactLoadError {
    ArtifactLoadError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}
