//! Scan configuration.
//!
//! The defaults carry the stock deployment: corporate role vocabulary,
//! target domain, and the conventional artifact/data paths. The role list
//! lives here, on the caller side, never baked into the core encoder. A
//! missing config file is a normal first run and yields defaults; a file
//! that exists but does not parse (or fails validation) is a hard error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fatal configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: String, reason: String },
    Parse { path: String, reason: String },
    Invalid { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "failed to read config {path}: {reason}"),
            Self::Parse { path, reason } => write!(f, "invalid config {path}: {reason}"),
            Self::Invalid { reason } => write!(f, "config rejected: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Recognized role names, as used at model training time.
    pub role_vocabulary: Vec<String>,
    /// Corporate domain the collectors filter for.
    pub target_domain: String,
    pub users_path: PathBuf,
    pub exposures_path: PathBuf,
    pub report_path: PathBuf,
    pub encoder_artifact_path: PathBuf,
    pub exposure_model_path: PathBuf,
    pub fraud_model_path: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            role_vocabulary: ["DevOps", "HR", "IT", "Finance", "Sales", "Marketing"]
                .into_iter()
                .map(String::from)
                .collect(),
            target_domain: "@corp.com".to_string(),
            users_path: PathBuf::from("data/users.csv"),
            exposures_path: PathBuf::from("data/exposures.csv"),
            report_path: PathBuf::from("reports/risk_report.csv"),
            encoder_artifact_path: PathBuf::from("ml/role_encoder.json"),
            exposure_model_path: PathBuf::from("ml/exposure_model.json"),
            fraud_model_path: PathBuf::from("ml/fraud_model.json"),
        }
    }
}

impl ScanConfig {
    /// Load from a JSON file, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let shown = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: shown,
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.role_vocabulary.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "role_vocabulary must not be empty".to_string(),
            });
        }
        if self.target_domain.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "target_domain must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
