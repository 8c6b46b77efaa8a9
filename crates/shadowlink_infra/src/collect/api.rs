//! Adapter for leak-checking API results.
//!
//! The polling loop (HTTP, auth headers, per-call pacing) lives outside the
//! engine; this consumes the already-fetched breach name list for one
//! account and tags each name as its own service.

use shadowlink_core::ledger::ExposureRecord;

/// Map one account's breach names into exposure records. Empty names are
/// skipped; the ledger will dedup repeats across polls.
pub fn breach_records<S: AsRef<str>>(email: &str, breach_names: &[S]) -> Vec<ExposureRecord> {
    breach_names
        .iter()
        .filter_map(|name| ExposureRecord::new(email, name.as_ref()).ok())
        .collect()
}
