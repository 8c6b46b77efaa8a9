//! Trained classifier artifacts and the shared role-encoder artifact.
//!
//! Models are trained offline and exported as versioned JSON artifacts; the
//! engine loads them by path at construction and fails fast on anything
//! incompatible with the feature contract. The role encoding table is
//! serialized alongside the models so training and inference read the same
//! table instead of each fitting their own.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shadowlink_core::classify::Classifier;
use shadowlink_core::engine::RiskEngine;
use shadowlink_core::features::{FEATURE_WIDTH, FeatureVector, RoleEncoder};

/// Schema version both artifact kinds are written with.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Logistic,
}

/// Serialized trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub model_id: String,
    pub kind: ModelKind,
    pub feature_width: usize,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub decision_threshold: f64,
}

/// Serialized role encoding table, exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub schema_version: u32,
    pub roles: BTreeMap<String, i64>,
}

/// Fatal artifact-loading error. Without both classifiers (and a coherent
/// encoder table) the engine cannot evaluate anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLoadError {
    Io {
        path: String,
        reason: String,
    },
    Parse {
        path: String,
        reason: String,
    },
    UnsupportedSchema {
        path: String,
        found: u32,
    },
    FeatureWidthMismatch {
        path: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "failed to read artifact {path}: {reason}"),
            Self::Parse { path, reason } => write!(f, "invalid artifact {path}: {reason}"),
            Self::UnsupportedSchema { path, found } => write!(
                f,
                "artifact {path} has schema version {found}, expected {ARTIFACT_SCHEMA_VERSION}"
            ),
            Self::FeatureWidthMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "artifact {path} expects feature width {found}, encoder produces {expected}"
            ),
        }
    }
}

impl std::error::Error for ModelLoadError {}

/// A loaded classifier artifact, ready to predict.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    artifact: ModelArtifact,
}

impl LoadedModel {
    pub fn model_id(&self) -> &str {
        &self.artifact.model_id
    }

    pub fn kind(&self) -> ModelKind {
        self.artifact.kind
    }
}

impl Classifier for LoadedModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let mut z = self.artifact.intercept;
        for (w, x) in self.artifact.weights.iter().zip(features.iter()) {
            z += w * x;
        }
        let p = 1.0 / (1.0 + (-z).exp());
        if p >= self.artifact.decision_threshold {
            1.0
        } else {
            0.0
        }
    }
}

/// Load and validate one classifier artifact.
pub fn load_model(path: impl AsRef<Path>) -> Result<LoadedModel, ModelLoadError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = fs::read_to_string(path).map_err(|e| ModelLoadError::Io {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| ModelLoadError::Parse {
        path: shown.clone(),
        reason: e.to_string(),
    })?;

    if artifact.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(ModelLoadError::UnsupportedSchema {
            path: shown,
            found: artifact.schema_version,
        });
    }
    if artifact.feature_width != FEATURE_WIDTH {
        return Err(ModelLoadError::FeatureWidthMismatch {
            path: shown,
            expected: FEATURE_WIDTH,
            found: artifact.feature_width,
        });
    }
    if artifact.weights.len() != artifact.feature_width {
        return Err(ModelLoadError::FeatureWidthMismatch {
            path: shown,
            expected: artifact.feature_width,
            found: artifact.weights.len(),
        });
    }
    let finite = artifact.weights.iter().all(|w| w.is_finite())
        && artifact.intercept.is_finite()
        && artifact.decision_threshold.is_finite();
    if !finite {
        return Err(ModelLoadError::Parse {
            path: shown,
            reason: "weights, intercept, and decision_threshold must be finite".to_string(),
        });
    }

    tracing::debug!(model_id = %artifact.model_id, path = %shown, "model artifact loaded");
    Ok(LoadedModel { artifact })
}

/// Load the role encoding table exported at training time.
pub fn load_encoder(path: impl AsRef<Path>) -> Result<RoleEncoder, ModelLoadError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let raw = fs::read_to_string(path).map_err(|e| ModelLoadError::Io {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    let artifact: EncoderArtifact =
        serde_json::from_str(&raw).map_err(|e| ModelLoadError::Parse {
            path: shown.clone(),
            reason: e.to_string(),
        })?;

    if artifact.schema_version != ARTIFACT_SCHEMA_VERSION {
        return Err(ModelLoadError::UnsupportedSchema {
            path: shown,
            found: artifact.schema_version,
        });
    }
    RoleEncoder::from_codes(artifact.roles).map_err(|e| ModelLoadError::Parse {
        path: shown,
        reason: e.to_string(),
    })
}

/// Serialize an encoder's table next to the models it was trained with.
pub fn save_encoder(
    path: impl AsRef<Path>,
    encoder: &RoleEncoder,
) -> Result<(), ModelLoadError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let artifact = EncoderArtifact {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        roles: encoder.codes().clone(),
    };
    let raw = serde_json::to_string_pretty(&artifact).map_err(|e| ModelLoadError::Parse {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ModelLoadError::Io {
                path: shown.clone(),
                reason: e.to_string(),
            })?;
        }
    }
    fs::write(path, raw).map_err(|e| ModelLoadError::Io {
        path: shown,
        reason: e.to_string(),
    })
}

/// Build an engine from an encoder and two classifier artifact paths.
/// Fails fast if either model is missing or incompatible.
pub fn build_engine(
    encoder: RoleEncoder,
    exposure_path: impl AsRef<Path>,
    fraud_path: impl AsRef<Path>,
) -> Result<RiskEngine, ModelLoadError> {
    let exposure = load_model(exposure_path)?;
    let fraud = load_model(fraud_path)?;
    Ok(RiskEngine::new(encoder, Box::new(exposure), Box::new(fraud)))
}
