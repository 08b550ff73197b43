//! Portal configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! batch_size = 12
//! model_path = "approval_model.json"
//! pending_dir = "pending"
//! results_dir = "results"
//! snapshot_path = "results/queue.snapshot.json"
//!
//! [band]
//! lower = 40.0
//! upper = 60.0
//!
//! [operator]
//! username = "admin"
//! password = "nextai123"
//!
//! [server]
//! port = 3141
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApprovalError, Result};
use crate::queue::AmbiguityBand;
use crate::request::DEFAULT_BATCH_SIZE;

/// Demo operator credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub username: String,
    pub password: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "nextai123".to_string(),
        }
    }
}

impl OperatorConfig {
    /// Plain comparison against the configured credentials.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Review server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3141 }
    }
}

/// Top-level portal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Requests per generated review batch.
    pub batch_size: usize,
    /// Confidence band that turns a suggestion into a manual review.
    pub band: AmbiguityBand,
    /// Trained model file.
    pub model_path: PathBuf,
    /// Where pending-request exports go.
    pub pending_dir: PathBuf,
    /// Where scored batches and final results go.
    pub results_dir: PathBuf,
    /// Queue snapshot used to resume an interrupted review.
    pub snapshot_path: PathBuf,
    pub operator: OperatorConfig,
    pub server: ServerConfig,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            band: AmbiguityBand::default(),
            model_path: PathBuf::from("approval_model.json"),
            pending_dir: PathBuf::from("pending"),
            results_dir: PathBuf::from("results"),
            snapshot_path: PathBuf::from("results/queue.snapshot.json"),
            operator: OperatorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl PortalConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ApprovalError::Config(format!(
                "Failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: PortalConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values the workflow depends on.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ApprovalError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        self.band.validate()
    }

    /// Path of the pending-request export.
    pub fn pending_export_path(&self) -> PathBuf {
        self.pending_dir.join("pending_requests.csv")
    }

    /// Path of the latest scored-batch export.
    pub fn scored_export_path(&self) -> PathBuf {
        self.results_dir.join("scored_latest.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PortalConfig::from_toml("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.batch_size, 12);
        assert_eq!(config.band, AmbiguityBand::default());
    }

    #[test]
    fn test_partial_override() {
        let config = PortalConfig::from_toml(
            r#"
            batch_size = 5
            results_dir = "out"

            [band]
            lower = 30.0
            upper = 70.0

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.batch_size, 5);
        assert_eq!(config.results_dir, PathBuf::from("out"));
        assert_eq!(config.band.lower, 30.0);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.operator, OperatorConfig::default());
        assert_eq!(config.scored_export_path(), PathBuf::from("out/scored_latest.csv"));
    }

    #[test]
    fn test_invalid_band_rejected() {
        let result = PortalConfig::from_toml("[band]\nlower = 70.0\nupper = 30.0\n");
        assert!(matches!(result, Err(ApprovalError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(PortalConfig::from_toml("batch_size = 0").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            PortalConfig::from_toml("batch_size = \"many\""),
            Err(ApprovalError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_operator_matches() {
        let op = OperatorConfig::default();
        assert!(op.matches("admin", "nextai123"));
        assert!(!op.matches("admin", "wrong"));
    }
}
