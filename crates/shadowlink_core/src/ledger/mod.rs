//! Exposure ledger: an insertion-ordered set of (email, service) facts.
//!
//! Two records with the same key are the same fact regardless of which
//! collector produced them. Merging is a monotonic union: it only ever adds,
//! is idempotent, and is commutative in the set sense. Durability lives in
//! the infra store; this module is pure state.

use std::collections::HashSet;
use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// One breach exposure fact: this email appeared in this source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureRecord {
    pub email: String,
    pub service: String,
}

/// Error for a record whose identity key would be unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidExposureError {
    EmptyEmail,
    EmptyService,
}

impl fmt::Display for InvalidExposureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "exposure record has empty email"),
            Self::EmptyService => write!(f, "exposure record has empty service"),
        }
    }
}

impl std::error::Error for InvalidExposureError {}

impl ExposureRecord {
    /// Build a record, rejecting empty identity components. Email syntax is
    /// not validated further; extraction quality is the collector's job.
    pub fn new(
        email: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, InvalidExposureError> {
        let email = email.into();
        let service = service.into();
        if email.is_empty() {
            return Err(InvalidExposureError::EmptyEmail);
        }
        if service.is_empty() {
            return Err(InvalidExposureError::EmptyService);
        }
        Ok(Self { email, service })
    }

    /// Dedup key over (email, service).
    pub fn key(&self) -> u64 {
        exposure_key(&self.email, &self.service)
    }
}

/// Compute the dedup key for (email, service).
///
/// Uses a 0xFF separator byte, which cannot appear in UTF-8, so field
/// boundaries are unambiguous (("ab","c") never collides with ("a","bc")).
pub fn exposure_key(email: &str, service: &str) -> u64 {
    let mut buf = Vec::with_capacity(email.len() + service.len() + 1);
    buf.extend_from_slice(email.as_bytes());
    buf.push(0xFF);
    buf.extend_from_slice(service.as_bytes());
    xxh64(&buf, 0)
}

/// Outcome of one merge call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Records newly added to the ledger.
    pub added: usize,
    /// Incoming records already present (same key).
    pub duplicates: usize,
}

/// Observability counters for ledger operations.
#[derive(Debug, Default)]
pub struct LedgerMetrics {
    merged_total: u64,
    duplicates_total: u64,
    persist_errors: u64,
}

impl LedgerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merged_total(&self) -> u64 {
        self.merged_total
    }

    pub fn duplicates_total(&self) -> u64 {
        self.duplicates_total
    }

    pub fn persist_errors(&self) -> u64 {
        self.persist_errors
    }

    pub fn record_merge(&mut self, outcome: MergeOutcome) {
        self.merged_total += outcome.added as u64;
        self.duplicates_total += outcome.duplicates as u64;
    }

    pub fn record_persist_error(&mut self) {
        self.persist_errors += 1;
    }
}

/// Insertion-ordered set of exposure records, unique by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    records: Vec<ExposureRecord>,
    keys: HashSet<u64>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a record stream, keeping the first occurrence of each key.
    pub fn from_records(records: impl IntoIterator<Item = ExposureRecord>) -> Self {
        let mut state = Self::new();
        for record in records {
            state.insert(record);
        }
        state
    }

    /// Union an incoming batch into the ledger. Monotonic: existing records
    /// are never removed or replaced, and first-seen order is kept.
    pub fn merge(
        &mut self,
        incoming: &[ExposureRecord],
        metrics: &mut LedgerMetrics,
    ) -> MergeOutcome {
        let mut added = 0;
        let mut duplicates = 0;
        for record in incoming {
            if self.insert(record.clone()) {
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        let outcome = MergeOutcome { added, duplicates };
        metrics.record_merge(outcome);
        outcome
    }

    pub fn contains(&self, email: &str, service: &str) -> bool {
        self.keys.contains(&exposure_key(email, service))
    }

    /// Records in first-seen order.
    pub fn records(&self) -> &[ExposureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: ExposureRecord) -> bool {
        if self.keys.insert(record.key()) {
            self.records.push(record);
            true
        } else {
            false
        }
    }
}
