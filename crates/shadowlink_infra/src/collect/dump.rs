//! CSV leak-dump adapter.

use std::path::Path;

use shadowlink_core::ledger::ExposureRecord;

use super::text::normalize_match;
use super::{CollectError, CollectorMetrics};

/// Service tag for records mined from CSV breach dumps.
pub const CSV_DUMP_SERVICE: &str = "CSV_Dump";

/// Parse a leaked CSV dump, keeping rows whose email matches the target
/// domain. Dumps are untrusted: emails go through the same normalization
/// as free-text matches, and malformed ones count as rejected.
pub fn parse_csv_dump(
    path: impl AsRef<Path>,
    target_domain: &str,
    metrics: &mut CollectorMetrics,
) -> Result<Vec<ExposureRecord>, CollectError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let mut reader = csv::Reader::from_path(path).map_err(|e| CollectError::Open {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    let headers = reader.headers().map_err(|e| CollectError::Open {
        path: shown,
        reason: e.to_string(),
    })?;
    let email_idx = headers
        .iter()
        .position(|h| h == "email")
        .ok_or(CollectError::MissingColumn { column: "email" })?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| CollectError::Row {
            line: idx + 2,
            reason: e.to_string(),
        })?;
        let raw = row.get(email_idx).unwrap_or("");
        if raw.is_empty() {
            continue;
        }
        let email = match normalize_match(raw) {
            Some(email) => email,
            None => {
                metrics.record_rejected();
                continue;
            }
        };
        if !email.contains(target_domain) {
            continue;
        }
        if let Ok(record) = ExposureRecord::new(email, CSV_DUMP_SERVICE) {
            metrics.record_extracted();
            records.push(record);
        }
    }

    Ok(records)
}
