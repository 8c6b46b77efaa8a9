//! Durable storage for the exposure ledger.

pub mod exposures;

pub use exposures::{
    CsvExposureStore, ExposureStore, LedgerLoadError, LedgerPersistError, MemoryExposureStore,
    load_or_empty, sync_exposures,
};
