//! Model and encoder artifact tests: fail-fast loading, feature width
//! checks, and the shared encoding table roundtrip.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use shadowlink_core::classify::Classifier;
use shadowlink_core::features::{FEATURE_WIDTH, RoleEncoder};
use shadowlink_infra::model::{
    ARTIFACT_SCHEMA_VERSION, ModelArtifact, ModelKind, ModelLoadError, load_encoder, load_model,
    save_encoder,
};

fn temp_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "shadowlink_artifact_{tag}_{}_{}.json",
        std::process::id(),
        nanos
    ))
}

fn remove_if_exists(path: &Path) {
    let _ = std::fs::remove_file(path);
}

fn artifact(intercept: f64) -> ModelArtifact {
    ModelArtifact {
        schema_version: ARTIFACT_SCHEMA_VERSION,
        model_id: "exposure-2024-06".to_string(),
        kind: ModelKind::Logistic,
        feature_width: FEATURE_WIDTH,
        weights: vec![0.0; FEATURE_WIDTH],
        intercept,
        decision_threshold: 0.5,
    }
}

fn write_artifact(path: &Path, artifact: &ModelArtifact) {
    let raw = serde_json::to_string(artifact).expect("serialize artifact");
    std::fs::write(path, raw).expect("write artifact");
}

#[test]
fn test_load_and_predict_deterministically() {
    let path = temp_path("ok");
    // Large positive intercept: sigmoid saturates above the threshold.
    write_artifact(&path, &artifact(10.0));

    let model = load_model(&path).expect("load");
    assert_eq!(model.model_id(), "exposure-2024-06");
    assert_eq!(model.kind(), ModelKind::Logistic);

    let features = [1.0, 0.0, 0.2, 3.0, 10.0, 0.0, 2.0];
    assert_eq!(model.predict(&features), 1.0);
    assert_eq!(model.predict(&features), model.predict(&features));

    remove_if_exists(&path);
}

#[test]
fn test_negative_logit_predicts_zero() {
    let path = temp_path("neg");
    write_artifact(&path, &artifact(-10.0));

    let model = load_model(&path).expect("load");
    assert_eq!(model.predict(&[0.0; FEATURE_WIDTH]), 0.0);

    remove_if_exists(&path);
}

#[test]
fn test_missing_artifact_is_io_error() {
    let path = temp_path("absent");
    match load_model(&path).unwrap_err() {
        ModelLoadError::Io { .. } => {}
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn test_garbage_artifact_is_parse_error() {
    let path = temp_path("garbage");
    std::fs::write(&path, "not json at all").expect("write");
    match load_model(&path).unwrap_err() {
        ModelLoadError::Parse { .. } => {}
        other => panic!("expected Parse, got {other:?}"),
    }
    remove_if_exists(&path);
}

#[test]
fn test_feature_width_mismatch_fails_fast() {
    let path = temp_path("width");
    let mut bad = artifact(0.0);
    bad.feature_width = 5;
    bad.weights = vec![0.0; 5];
    write_artifact(&path, &bad);

    match load_model(&path).unwrap_err() {
        ModelLoadError::FeatureWidthMismatch { expected, found, .. } => {
            assert_eq!(expected, FEATURE_WIDTH);
            assert_eq!(found, 5);
        }
        other => panic!("expected FeatureWidthMismatch, got {other:?}"),
    }
    remove_if_exists(&path);
}

#[test]
fn test_weight_count_must_match_declared_width() {
    let path = temp_path("weights");
    let mut bad = artifact(0.0);
    bad.weights = vec![0.0; FEATURE_WIDTH - 1];
    write_artifact(&path, &bad);

    match load_model(&path).unwrap_err() {
        ModelLoadError::FeatureWidthMismatch { found, .. } => {
            assert_eq!(found, FEATURE_WIDTH - 1);
        }
        other => panic!("expected FeatureWidthMismatch, got {other:?}"),
    }
    remove_if_exists(&path);
}

#[test]
fn test_unsupported_schema_rejected() {
    let path = temp_path("schema");
    let mut bad = artifact(0.0);
    bad.schema_version = 99;
    write_artifact(&path, &bad);

    match load_model(&path).unwrap_err() {
        ModelLoadError::UnsupportedSchema { found, .. } => assert_eq!(found, 99),
        other => panic!("expected UnsupportedSchema, got {other:?}"),
    }
    remove_if_exists(&path);
}

#[test]
fn test_non_finite_weights_rejected() {
    let path = temp_path("nan");
    // serde_json cannot emit non-finite floats; splice the raw text.
    let raw = serde_json::to_string(&artifact(0.5))
        .expect("serialize")
        .replace("\"intercept\":0.5", "\"intercept\":1e999");
    std::fs::write(&path, raw).expect("write");

    match load_model(&path).unwrap_err() {
        ModelLoadError::Parse { .. } => {}
        other => panic!("expected Parse, got {other:?}"),
    }
    remove_if_exists(&path);
}

#[test]
fn test_encoder_artifact_roundtrip_preserves_codes() {
    let path = temp_path("encoder");
    let encoder =
        RoleEncoder::from_vocabulary(&["DevOps", "HR", "IT", "Finance"]).expect("vocabulary");

    save_encoder(&path, &encoder).expect("save");
    let loaded = load_encoder(&path).expect("load");

    assert_eq!(loaded, encoder);
    assert_eq!(loaded.encode_role("Finance").unwrap(), 1);

    remove_if_exists(&path);
}

#[test]
fn test_missing_encoder_artifact_is_io_error() {
    let path = temp_path("noencoder");
    match load_encoder(&path).unwrap_err() {
        ModelLoadError::Io { .. } => {}
        other => panic!("expected Io, got {other:?}"),
    }
}
