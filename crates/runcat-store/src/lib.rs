//! Document store for the run metadata catalog.
//!
//! This crate provides:
//! - A [`DocumentStore`] trait the catalog layer is written against
//! - A composable [`Query`] with exact, set, range, and pattern conditions
//! - [`MemStore`], an in-memory backend for tests and embedding
//! - [`FileStore`], a single-file backend that replays a framed
//!   append-only operation journal
//!
//! ## Quick Start
//!
//! ```rust
//! use runcat_store::{Condition, DocumentStore, MemStore, Query, WriteConcern};
//! use serde_json::json;
//!
//! let mut store = MemStore::new();
//! let id = store.insert(
//!     "headers",
//!     json!({"scan_id": 42, "owner": "arkilic"}),
//!     &WriteConcern::acknowledged(),
//! )?;
//!
//! let query = Query::new().field("scan_id", Condition::Eq(json!(42)));
//! let docs = store.find("headers", &query)?;
//! assert_eq!(docs.len(), 1);
//! assert_eq!(docs[0]["_id"], json!(id.as_str()));
//! # Ok::<(), runcat_store::StoreError>(())
//! ```
//!
//! ## Key Types
//!
//! - [`DocumentStore`] - The backend seam
//! - [`Query`] / [`Condition`] - Filter, sort, and limit documents
//! - [`MemStore`] / [`FileStore`] - Reference backends
//!
#![deny(missing_docs)]

/// Document alias and record id generation.
pub mod doc;
/// Error types for store operations.
pub mod errors;
/// File-backed store that journals every mutation.
pub mod file;
/// On-disk framing for the operation journal.
pub mod frame;
/// Operation journal reader and writer.
pub mod journal;
/// In-memory reference backend.
pub mod memory;
/// Query conditions, sorting, and matching.
pub mod query;
/// The store trait and write-concern options.
pub mod traits;

pub use doc::{doc_id, DocJson, ID_FIELD};
pub use errors::StoreError;
pub use file::FileStore;
pub use journal::{JournalOp, OpReader, OpWriter, ReadMode};
pub use memory::MemStore;
pub use query::{Condition, Query, SortOrder};
pub use traits::{DocumentStore, WriteConcern};
