//! Raw record access: collection names and passthrough queries.
//!
//! The typed layers sit on top of these. They exist as public surface so
//! tooling that needs the raw documents (migration scripts, debugging) can
//! query through the catalog without re-deriving collection layout.

use runcat_model::{EventDescriptor, RecordId, RunHeader};
use runcat_store::{Condition, DocJson, DocumentStore, Query};
use serde_json::json;
use tracing::warn;

use crate::catalog::Catalog;
use crate::decode;
use crate::errors::CatalogError;

/// Collection holding run headers.
pub const HEADERS: &str = "headers";
/// Collection holding event descriptors.
pub const DESCRIPTORS: &str = "event_descriptors";
/// Collection holding events.
pub const EVENTS: &str = "events";
/// Collection holding beamline configuration snapshots.
pub const CONFIGS: &str = "beamline_configs";

impl<S: DocumentStore> Catalog<S> {
    /// Runs a raw query against the header collection.
    pub fn headers_raw(&self, query: &Query) -> Result<Vec<DocJson>, CatalogError> {
        Ok(self.store.find(HEADERS, query)?)
    }

    /// Raw descriptor documents under a header, in insertion order.
    pub fn descriptors_for(&self, header_id: &RecordId) -> Result<Vec<DocJson>, CatalogError> {
        let query = Query::new().field("header_id", Condition::Eq(json!(header_id)));
        Ok(self.store.find(DESCRIPTORS, &query)?)
    }

    /// Raw event documents under a descriptor, in insertion order.
    pub fn events_for(&self, descriptor_id: &RecordId) -> Result<Vec<DocJson>, CatalogError> {
        let query = Query::new().field("event_descriptor_id", Condition::Eq(json!(descriptor_id)));
        Ok(self.store.find(EVENTS, &query)?)
    }

    /// Raw configuration snapshots pinned to a header, in insertion order.
    pub fn configs_for(&self, header_id: &RecordId) -> Result<Vec<DocJson>, CatalogError> {
        let query = Query::new().field("header_id", Condition::Eq(json!(header_id)));
        Ok(self.store.find(CONFIGS, &query)?)
    }

    /// Every run header, decoded, in insertion order.
    pub fn list_headers(&self) -> Result<Vec<RunHeader>, CatalogError> {
        let docs = self.headers_raw(&Query::new()).map_err(|err| {
            warn!(%err, "header collection cannot be accessed");
            err
        })?;
        let headers = decode::decode_headers(docs)?;
        Ok(headers.into_iter().map(|(_, header)| header).collect())
    }

    /// Every event descriptor, decoded, in insertion order.
    pub fn list_event_descriptors(&self) -> Result<Vec<EventDescriptor>, CatalogError> {
        let docs = self.store.find(DESCRIPTORS, &Query::new()).map_err(|err| {
            warn!(%err, "descriptor collection cannot be accessed");
            CatalogError::from(err)
        })?;
        let descriptors = decode::decode_descriptors(docs)?;
        Ok(descriptors
            .into_iter()
            .map(|(_, descriptor)| descriptor)
            .collect())
    }
}
