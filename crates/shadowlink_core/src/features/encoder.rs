//! Role encoding with a fixed, explicit vocabulary.
//!
//! The name→code table must be the same one the classifiers were trained
//! against. It is built once (from the training-side vocabulary, or from a
//! serialized artifact of that table) and never refit at inference time.
//! A role outside the vocabulary is an error, never a default code.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use super::record::{FEATURE_WIDTH, FeatureVector, RecordError, RecordFailure, UserRecord};

/// Error for a role outside the configured vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoleError {
    pub role: String,
}

impl fmt::Display for UnknownRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {:?}", self.role)
    }
}

impl std::error::Error for UnknownRoleError {}

impl From<UnknownRoleError> for RecordError {
    fn from(err: UnknownRoleError) -> Self {
        RecordError::UnknownRole { role: err.role }
    }
}

/// Error constructing an encoder from bad inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderBuildError {
    /// The vocabulary has no members.
    EmptyVocabulary,
    /// Two roles share the same code in an explicit code table.
    DuplicateCode { code: i64 },
}

impl fmt::Display for EncoderBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyVocabulary => write!(f, "role vocabulary is empty"),
            Self::DuplicateCode { code } => {
                write!(f, "role code table assigns code {code} to more than one role")
            }
        }
    }
}

impl std::error::Error for EncoderBuildError {}

/// Result of encoding a batch with collect-all semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEncoding {
    /// Encoded vectors paired with their source row index.
    pub vectors: Vec<(usize, FeatureVector)>,
    /// Rows that could not be encoded, in input order.
    pub failures: Vec<RecordFailure>,
}

/// Fixed name→code table for the categorical role feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEncoder {
    codes: BTreeMap<String, i64>,
}

impl RoleEncoder {
    /// Build from an explicit vocabulary. Codes are assigned in
    /// lexicographic order of the deduplicated role names, matching how the
    /// training side fit its label encoder.
    pub fn from_vocabulary<S: AsRef<str>>(roles: &[S]) -> Result<Self, EncoderBuildError> {
        let unique: BTreeSet<&str> = roles.iter().map(|r| r.as_ref()).collect();
        if unique.is_empty() {
            return Err(EncoderBuildError::EmptyVocabulary);
        }
        let codes = unique
            .into_iter()
            .enumerate()
            .map(|(code, role)| (role.to_string(), code as i64))
            .collect();
        Ok(Self { codes })
    }

    /// Build from an explicit name→code table, as loaded from the encoder
    /// artifact serialized alongside the trained models.
    pub fn from_codes(codes: BTreeMap<String, i64>) -> Result<Self, EncoderBuildError> {
        if codes.is_empty() {
            return Err(EncoderBuildError::EmptyVocabulary);
        }
        let mut seen = BTreeSet::new();
        for &code in codes.values() {
            if !seen.insert(code) {
                return Err(EncoderBuildError::DuplicateCode { code });
            }
        }
        Ok(Self { codes })
    }

    /// The name→code table, for serialization into an encoder artifact.
    pub fn codes(&self) -> &BTreeMap<String, i64> {
        &self.codes
    }

    /// Number of roles in the vocabulary.
    pub fn vocabulary_len(&self) -> usize {
        self.codes.len()
    }

    /// Encode one role. Total and deterministic over the vocabulary; any
    /// role outside it fails.
    pub fn encode_role(&self, role: &str) -> Result<i64, UnknownRoleError> {
        self.codes
            .get(role)
            .copied()
            .ok_or_else(|| UnknownRoleError {
                role: role.to_string(),
            })
    }

    /// Encode one record into the fixed feature layout.
    pub fn encode_record(&self, record: &UserRecord) -> Result<FeatureVector, RecordError> {
        if !record.login_time_variance.is_finite() || record.login_time_variance < 0.0 {
            return Err(RecordError::Malformed {
                reason: format!(
                    "login_time_variance must be finite and >= 0, got {}",
                    record.login_time_variance
                ),
            });
        }
        let role_encoded = self.encode_role(&record.role)?;

        let mut features = [0.0; FEATURE_WIDTH];
        features[0] = if record.reused_password { 1.0 } else { 0.0 };
        features[1] = if record.mfa_enabled { 1.0 } else { 0.0 };
        features[2] = record.login_time_variance;
        features[3] = f64::from(record.geo_login_count);
        features[4] = f64::from(record.cloud_downloads_last_week);
        features[5] = f64::from(record.password_changes_last_90d);
        features[6] = role_encoded as f64;
        Ok(features)
    }

    /// Encode a batch, collecting every per-record failure instead of
    /// stopping at the first one.
    pub fn encode_batch(&self, records: &[UserRecord]) -> BatchEncoding {
        let mut vectors = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        for (row, record) in records.iter().enumerate() {
            match self.encode_record(record) {
                Ok(features) => vectors.push((row, features)),
                Err(error) => failures.push(RecordFailure {
                    row,
                    email: record.email.clone(),
                    error,
                }),
            }
        }
        BatchEncoding { vectors, failures }
    }

    /// Encode a batch, failing on the first invalid record.
    pub fn encode_batch_strict(
        &self,
        records: &[UserRecord],
    ) -> Result<Vec<FeatureVector>, RecordFailure> {
        let mut vectors = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            match self.encode_record(record) {
                Ok(features) => vectors.push(features),
                Err(error) => {
                    return Err(RecordFailure {
                        row,
                        email: record.email.clone(),
                        error,
                    });
                }
            }
        }
        Ok(vectors)
    }
}
