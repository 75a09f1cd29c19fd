//! Run metadata catalog: writers, lookups, and the find subsystem.
//!
//! This crate provides:
//! - Record writers that persist run headers, event descriptors, events,
//!   and beamline configuration snapshots with explicit write
//!   acknowledgment
//! - Identity lookups from scan numbers and descriptor names to record ids
//! - A find subsystem that turns loose criteria into one store query and
//!   reconstructs each matched run as header → descriptors → events
//!
//! ## Quick Start
//!
//! ```rust
//! use runcat_catalog::{Catalog, DescriptorSpec, EventSpec, HeaderSpec, Selector};
//! use runcat_model::ScanId;
//!
//! let mut catalog = Catalog::in_memory();
//! let header = catalog.save_header(HeaderSpec::new(42))?;
//!
//! let mut spec = DescriptorSpec::new(0);
//! spec.event_type_name = Some("scan".to_string());
//! catalog.insert_event_descriptor(header.scan_id, spec)?;
//! catalog.insert_event(ScanId::from(42), "scan", EventSpec::new())?;
//!
//! let result = catalog.find(&Selector::Current, true)?;
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.runs[0].label, format!("header_{}", header.id));
//! # Ok::<(), runcat_catalog::CatalogError>(())
//! ```
//!
//! ## Key Types
//!
//! - [`Catalog`] - All record access, generic over the store backend
//! - [`Selector`] / [`Criteria`] - How a find picks runs
//! - [`FindResult`] - Matched runs with children attached
//!
#![deny(missing_docs)]

/// Raw record access: collection names and passthrough queries.
pub mod adapter;
/// The catalog handle and its constructors.
pub mod catalog;
/// Result decoders from raw documents to labeled records.
pub mod decode;
/// Error types for catalog operations.
pub mod errors;
/// Selectors, criteria, and result assembly.
pub mod find;
/// Identity lookups for scans and descriptor names.
pub mod lookup;
/// Typed find results.
pub mod tree;
/// Record writers.
pub mod writers;

pub use catalog::Catalog;
pub use errors::CatalogError;
pub use find::{Criteria, Selector, TimeCriterion};
pub use tree::{DescriptorEntry, EventEntry, FindResult, RunEntry};
pub use writers::{DescriptorSpec, EventSpec, HeaderSpec};
