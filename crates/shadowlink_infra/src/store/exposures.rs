//! CSV-backed exposure store: load, merge, rewrite the whole set.
//!
//! The durable file always holds the full deduplicated set under the header
//! `email,service`; persisting rewrites it rather than appending raw rows.
//! A missing file is a normal first run and loads as an empty ledger. The
//! store is single-writer: callers that could run concurrent producers must
//! serialize their load+merge+persist pairs themselves.

use std::fmt;
use std::path::{Path, PathBuf};

use shadowlink_core::ledger::{ExposureRecord, LedgerMetrics, LedgerState, MergeOutcome};

/// Error loading prior ledger state. Soft by policy: callers that want
/// first-run tolerance use [`load_or_empty`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerLoadError {
    Open { path: String, reason: String },
    MissingColumn { column: &'static str },
    Row { line: usize, reason: String },
}

impl fmt::Display for LedgerLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, reason } => {
                write!(f, "failed to open exposures file {path}: {reason}")
            }
            Self::MissingColumn { column } => {
                write!(f, "exposures file is missing column {column:?}")
            }
            Self::Row { line, reason } => {
                write!(f, "invalid exposure row at line {line}: {reason}")
            }
        }
    }
}

impl std::error::Error for LedgerLoadError {}

/// Error writing the ledger back. Fatal: the caller must know the ledger
/// did not durably update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPersistError {
    pub path: String,
    pub reason: String,
}

impl fmt::Display for LedgerPersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to persist exposures to {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for LedgerPersistError {}

/// Storage capability behind the ledger, injectable so merge+persist can be
/// tested without touching real files.
pub trait ExposureStore {
    fn load(&self) -> Result<LedgerState, LedgerLoadError>;
    fn persist(&mut self, state: &LedgerState) -> Result<(), LedgerPersistError>;
}

/// Load prior state, treating any load failure as "no prior state".
pub fn load_or_empty<S: ExposureStore>(store: &S) -> LedgerState {
    match store.load() {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(error = %err, "prior exposure ledger unreadable, starting empty");
            LedgerState::new()
        }
    }
}

/// The read-modify-write pair: load (or empty), union the incoming batch,
/// rewrite the deduplicated set.
pub fn sync_exposures<S: ExposureStore>(
    store: &mut S,
    incoming: &[ExposureRecord],
    metrics: &mut LedgerMetrics,
) -> Result<MergeOutcome, LedgerPersistError> {
    let mut state = load_or_empty(store);
    let outcome = state.merge(incoming, metrics);
    if let Err(err) = store.persist(&state) {
        metrics.record_persist_error();
        return Err(err);
    }
    tracing::info!(
        added = outcome.added,
        duplicates = outcome.duplicates,
        total = state.len(),
        "exposure ledger persisted"
    );
    Ok(outcome)
}

/// File-backed store using a two-column CSV.
#[derive(Debug, Clone)]
pub struct CsvExposureStore {
    path: PathBuf,
}

impl CsvExposureStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExposureStore for CsvExposureStore {
    fn load(&self) -> Result<LedgerState, LedgerLoadError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no prior exposure ledger");
            return Ok(LedgerState::new());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| LedgerLoadError::Open {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;

        let headers = reader.headers().map_err(|e| LedgerLoadError::Open {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        let email_idx = column_index(headers, "email")?;
        let service_idx = column_index(headers, "service")?;

        let mut records = Vec::new();
        for (idx, row) in reader.records().enumerate() {
            // Header is line 1, first data row is line 2.
            let line = idx + 2;
            let row = row.map_err(|e| LedgerLoadError::Row {
                line,
                reason: e.to_string(),
            })?;
            let email = row.get(email_idx).unwrap_or("");
            let service = row.get(service_idx).unwrap_or("");
            let record =
                ExposureRecord::new(email, service).map_err(|e| LedgerLoadError::Row {
                    line,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }

        Ok(LedgerState::from_records(records))
    }

    fn persist(&mut self, state: &LedgerState) -> Result<(), LedgerPersistError> {
        let persist_err = |reason: String| LedgerPersistError {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
            }
        }

        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|e| persist_err(e.to_string()))?;
        writer
            .write_record(["email", "service"])
            .map_err(|e| persist_err(e.to_string()))?;
        for record in state.records() {
            writer
                .write_record([record.email.as_str(), record.service.as_str()])
                .map_err(|e| persist_err(e.to_string()))?;
        }
        writer.flush().map_err(|e| persist_err(e.to_string()))
    }
}

fn column_index(headers: &csv::StringRecord, column: &'static str) -> Result<usize, LedgerLoadError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or(LedgerLoadError::MissingColumn { column })
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryExposureStore {
    snapshot: Option<LedgerState>,
}

impl MemoryExposureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            snapshot: Some(state),
        }
    }

    /// Last persisted state, if any persist has happened.
    pub fn snapshot(&self) -> Option<&LedgerState> {
        self.snapshot.as_ref()
    }
}

impl ExposureStore for MemoryExposureStore {
    fn load(&self) -> Result<LedgerState, LedgerLoadError> {
        Ok(self.snapshot.clone().unwrap_or_default())
    }

    fn persist(&mut self, state: &LedgerState) -> Result<(), LedgerPersistError> {
        self.snapshot = Some(state.clone());
        Ok(())
    }
}
