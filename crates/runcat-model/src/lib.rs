//! Record types for the run metadata catalog.
//!
//! A *run* is one data-collection session on an instrument. The catalog keeps
//! four record kinds for it: the [`RunHeader`] bundle root, the
//! [`EventDescriptor`] shapes declared under a header, the [`Event`] payloads
//! recorded against a descriptor, and the [`BeamlineConfig`] snapshots pinned
//! to a header. Everything that crosses the store boundary is built from the
//! types in this crate.
//!
#![deny(missing_docs)]

/// Free-form attribute maps carried by every record kind.
pub mod attrs;
/// Record and scan identifiers.
pub mod ids;
/// The four catalog record kinds.
pub mod records;
/// Validation helpers shared by identifier newtypes.
pub mod validation;

pub use attrs::{parse_attrs, AttrMap};
pub use ids::{RecordId, ScanId};
pub use records::{BeamlineConfig, Event, EventDescriptor, RunHeader, RunStatus};
pub use validation::ValidationError;
