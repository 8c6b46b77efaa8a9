//! Collector adapters: turn raw leak sources into exposure records.
//!
//! Each adapter tags its own `service` value and extracts an email-shaped
//! identity from its source. Network polling and rate pacing stay outside;
//! adapters here only consume already-materialized input. Extraction quality
//! (trailing punctuation, doubled `@`) is handled here, not in the ledger.

use std::fmt;

pub mod api;
pub mod dump;
pub mod text;

pub use api::breach_records;
pub use dump::{CSV_DUMP_SERVICE, parse_csv_dump};
pub use text::{PASTE_SERVICE, extract_from_text, normalize_match};

/// Structural error reading a collector source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    Open { path: String, reason: String },
    MissingColumn { column: &'static str },
    Row { line: usize, reason: String },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => {
                write!(f, "failed to open leak source {path}: {reason}")
            }
            Self::MissingColumn { column } => {
                write!(f, "leak source is missing column {column:?}")
            }
            Self::Row { line, reason } => write!(f, "invalid leak row at line {line}: {reason}"),
        }
    }
}

impl std::error::Error for CollectError {}

/// Observability counters for collector adapters.
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    extracted_total: u64,
    rejected_total: u64,
}

impl CollectorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches accepted as exposure records.
    pub fn extracted_total(&self) -> u64 {
        self.extracted_total
    }

    /// Matches dropped as obviously malformed.
    pub fn rejected_total(&self) -> u64 {
        self.rejected_total
    }

    pub(crate) fn record_extracted(&mut self) {
        self.extracted_total += 1;
    }

    pub(crate) fn record_rejected(&mut self) {
        self.rejected_total += 1;
    }
}
