use runcat_model::{RecordId, ScanId};
use runcat_store::StoreError;
use thiserror::Error;

/// Errors produced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No run header carries the given scan number.
    #[error("no run header for scan id {0}")]
    UnknownScanId(ScanId),

    /// No event descriptor with the given name exists under the scan's
    /// header.
    #[error("no event descriptor named '{name}' under scan id {scan_id}")]
    UnknownDescriptor {
        /// The descriptor name that failed to resolve.
        name: String,
        /// The scan whose header was searched.
        scan_id: ScanId,
    },

    /// No run header has the given record id.
    #[error("run header {0} does not exist")]
    UnknownHeader(RecordId),

    /// A loosely-typed time criterion held something other than a
    /// timestamp.
    #[error("expected a timestamp, got {0}")]
    ExpectedTimestamp(String),

    /// A sentinel selector needs more recorded runs than the catalog has.
    #[error("selector needs at least {required} recorded runs, found {found}")]
    NotEnoughRuns {
        /// Runs the selector requires.
        required: usize,
        /// Runs the catalog holds.
        found: usize,
    },

    /// The underlying document store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A stored document did not decode as its record type, or a record
    /// failed to render back into one.
    #[error("record decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
