//! Identity lookups: scan numbers and descriptor names to record ids.

use runcat_model::{EventDescriptor, RecordId, RunHeader, ScanId};
use runcat_store::{Condition, DocumentStore, Query, ID_FIELD};
use serde_json::json;

use crate::adapter::{DESCRIPTORS, HEADERS};
use crate::catalog::Catalog;
use crate::errors::CatalogError;

impl<S: DocumentStore> Catalog<S> {
    /// Resolves a scan number to its header's record id.
    ///
    /// Scan numbers are not required to be unique; the first header in
    /// insertion order wins.
    pub fn header_id(&self, scan_id: ScanId) -> Result<RecordId, CatalogError> {
        let query = Query::new()
            .field("scan_id", Condition::Eq(json!(scan_id)))
            .limit(1);
        let docs = self.store.find(HEADERS, &query)?;
        let doc = docs
            .into_iter()
            .next()
            .ok_or(CatalogError::UnknownScanId(scan_id))?;
        let header: RunHeader = serde_json::from_value(doc)?;
        Ok(header.id)
    }

    /// Resolves an event-descriptor name under a scan to the pair of
    /// header id and descriptor id.
    ///
    /// Descriptors are matched by `event_type_name` under the scan's
    /// header; the first match in insertion order wins.
    pub fn descriptor_ids(
        &self,
        name: &str,
        scan_id: ScanId,
    ) -> Result<(RecordId, RecordId), CatalogError> {
        let header_id = self.header_id(scan_id)?;
        let query = Query::new()
            .field("header_id", Condition::Eq(json!(header_id)))
            .field("event_type_name", Condition::Eq(json!(name)))
            .limit(1);
        let docs = self.store.find(DESCRIPTORS, &query)?;
        let doc = docs
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::UnknownDescriptor {
                name: name.to_string(),
                scan_id,
            })?;
        let descriptor: EventDescriptor = serde_json::from_value(doc)?;
        Ok((header_id, descriptor.id))
    }

    /// Fetches a header by record id, if one exists.
    pub fn header_by_id(&self, id: &RecordId) -> Result<Option<RunHeader>, CatalogError> {
        let query = Query::new()
            .field(ID_FIELD, Condition::Eq(json!(id)))
            .limit(1);
        let docs = self.store.find(HEADERS, &query)?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }
}
