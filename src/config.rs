use std::{net::SocketAddr, path::PathBuf};

use crate::artifacts::{ArtifactPaths, REGRESSOR_FILE, SCALER_FILE, THRESHOLDS_FILE};

pub const DEFAULT_ARTIFACT_DIR: &str = "models";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub artifacts: ArtifactPaths,
    pub bind_addr: String,
    pub port: u16,
    /// Allowed CORS origins; empty means any.
    pub cors_origins: Vec<String>,
    pub log_predictions: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source. Unparseable values fall back to defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let dir = get("ARTIFACT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_DIR));
        let path_or = |key: &str, file: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| dir.join(file))
        };
        let artifacts = ArtifactPaths {
            regressor: path_or("REGRESSOR_PATH", REGRESSOR_FILE),
            scaler: path_or("SCALER_PATH", SCALER_FILE),
            thresholds: path_or("THRESHOLDS_PATH", THRESHOLDS_FILE),
        };

        let bind_addr = get("BIND_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = get("CORS_ORIGIN")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        let log_predictions = get("LOG_PRED")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Self {
            artifacts,
            bind_addr,
            port,
            cors_origins,
            log_predictions,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", addr, e))
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    if value.trim() == "*" {
        return Vec::new();
    }
    value
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
