//! User records and the fixed-width feature vector contract.
//!
//! The feature vector layout is part of the training contract: the trained
//! classifiers were fit against exactly this width and field order, so any
//! change here invalidates every deployed model artifact.

use std::fmt;

/// Number of numeric features fed to the classifiers.
pub const FEATURE_WIDTH: usize = 7;

/// Ordered numeric features for one user.
///
/// Field order:
/// reused_password, mfa_enabled, login_time_variance, geo_login_count,
/// cloud_downloads_last_week, password_changes_last_90d, role_encoded.
pub type FeatureVector = [f64; FEATURE_WIDTH];

/// One row of the user behavior table. Immutable within a scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub email: String,
    pub role: String,
    pub reused_password: bool,
    pub mfa_enabled: bool,
    pub login_time_variance: f64,
    pub geo_login_count: u32,
    pub cloud_downloads_last_week: u32,
    pub password_changes_last_90d: u32,
}

/// Why a single record could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Role is outside the configured vocabulary. Never mapped to a
    /// fallback code: the failure must be visible, not guessed around.
    UnknownRole { role: String },
    /// Row is structurally invalid (missing or unparseable field).
    Malformed { reason: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRole { role } => write!(f, "unknown role: {role:?}"),
            Self::Malformed { reason } => write!(f, "malformed record: {reason}"),
        }
    }
}

impl std::error::Error for RecordError {}

/// Per-record failure, collected alongside successful results so a batch
/// reports both outcomes instead of aborting or silently dropping rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Zero-based row index in the input batch.
    pub row: usize,
    pub email: String,
    pub error: RecordError,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} ({}): {}", self.row, self.email, self.error)
    }
}
