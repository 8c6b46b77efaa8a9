//! User table input and risk report output.
//!
//! Both files are CSV with positional-by-name columns. Reading the user
//! table collects per-row failures instead of aborting; a missing header
//! column is structural and fails the whole read. The report writer emits
//! exactly the columns `email,role,exposure_risk,fraud_flagged,combined_score`
//! in input order.

use std::fmt;
use std::path::Path;

use shadowlink_core::engine::RiskAssessment;
use shadowlink_core::features::{RecordError, RecordFailure, UserRecord};

/// Report column order. Fixed output contract.
pub const REPORT_COLUMNS: [&str; 5] = [
    "email",
    "role",
    "exposure_risk",
    "fraud_flagged",
    "combined_score",
];

/// User table columns required in the input header.
const USER_COLUMNS: [&str; 8] = [
    "email",
    "role",
    "reused_password",
    "mfa_enabled",
    "login_time_variance",
    "geo_login_count",
    "cloud_downloads_last_week",
    "password_changes_last_90d",
];

/// Structural table error (per-row problems are collected, not raised).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    Open { path: String, reason: String },
    MissingColumn { column: String },
    Write { path: String, reason: String },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => write!(f, "failed to open table {path}: {reason}"),
            Self::MissingColumn { column } => {
                write!(f, "user table is missing column {column:?}")
            }
            Self::Write { path, reason } => write!(f, "failed to write table {path}: {reason}"),
        }
    }
}

impl std::error::Error for TableError {}

/// Parsed user table: good rows plus collected per-row failures.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTable {
    pub records: Vec<UserRecord>,
    pub failures: Vec<RecordFailure>,
}

/// Read the user behavior table.
pub fn read_users_csv(path: impl AsRef<Path>) -> Result<UserTable, TableError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let mut reader = csv::Reader::from_path(path).map_err(|e| TableError::Open {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    let headers = reader
        .headers()
        .map_err(|e| TableError::Open {
            path: shown.clone(),
            reason: e.to_string(),
        })?
        .clone();

    let mut indices = [0usize; USER_COLUMNS.len()];
    for (slot, column) in USER_COLUMNS.iter().enumerate() {
        indices[slot] = headers.iter().position(|h| h == *column).ok_or_else(|| {
            TableError::MissingColumn {
                column: (*column).to_string(),
            }
        })?;
    }

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                failures.push(RecordFailure {
                    row,
                    email: String::new(),
                    error: RecordError::Malformed {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };
        let email = raw.get(indices[0]).unwrap_or("").to_string();
        match parse_user_row(&raw, &indices, &email) {
            Ok(record) => records.push(record),
            Err(reason) => failures.push(RecordFailure {
                row,
                email,
                error: RecordError::Malformed { reason },
            }),
        }
    }

    Ok(UserTable { records, failures })
}

fn parse_user_row(
    raw: &csv::StringRecord,
    indices: &[usize; USER_COLUMNS.len()],
    email: &str,
) -> Result<UserRecord, String> {
    let field = |slot: usize| -> Result<&str, String> {
        raw.get(indices[slot])
            .map(str::trim)
            .ok_or_else(|| format!("missing field {:?}", USER_COLUMNS[slot]))
    };

    if email.is_empty() {
        return Err("missing field \"email\"".to_string());
    }
    let role = field(1)?.to_string();
    if role.is_empty() {
        return Err("missing field \"role\"".to_string());
    }

    Ok(UserRecord {
        email: email.to_string(),
        role,
        reused_password: parse_bool(field(2)?, USER_COLUMNS[2])?,
        mfa_enabled: parse_bool(field(3)?, USER_COLUMNS[3])?,
        login_time_variance: parse_number(field(4)?, USER_COLUMNS[4])?,
        geo_login_count: parse_count(field(5)?, USER_COLUMNS[5])?,
        cloud_downloads_last_week: parse_count(field(6)?, USER_COLUMNS[6])?,
        password_changes_last_90d: parse_count(field(7)?, USER_COLUMNS[7])?,
    })
}

// Tables exported from the training side carry booleans as True/False or
// 0/1 depending on the tool that wrote them. Accept both spellings.
fn parse_bool(raw: &str, column: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("field {column:?} is not a boolean: {raw:?}")),
    }
}

fn parse_number(raw: &str, column: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("field {column:?} is not a number: {raw:?}"))
}

fn parse_count(raw: &str, column: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("field {column:?} is not a non-negative integer: {raw:?}"))
}

/// Write the risk report, one row per assessment, input order.
pub fn write_risk_report(
    path: impl AsRef<Path>,
    assessments: &[RiskAssessment],
) -> Result<(), TableError> {
    let path = path.as_ref();
    let write_err = |reason: String| TableError::Write {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    writer
        .write_record(REPORT_COLUMNS)
        .map_err(|e| write_err(e.to_string()))?;
    for a in assessments {
        writer
            .write_record([
                a.email.as_str(),
                a.role.as_str(),
                &a.exposure_risk.to_string(),
                &a.fraud_flagged.to_string(),
                &a.combined_score.to_string(),
            ])
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))
}
