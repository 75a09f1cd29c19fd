//! In-memory reference backend.

use std::collections::BTreeMap;

use runcat_model::RecordId;
use serde_json::json;

use crate::doc::{doc_id, DocJson, IdGenerator, ID_FIELD};
use crate::errors::StoreError;
use crate::journal::JournalOp;
use crate::query::Query;
use crate::traits::{DocumentStore, WriteConcern};

/// Document store backed by plain vectors, one per collection, in insertion
/// order.
///
/// This is the natural-order substrate the file backend replays into, and
/// the backend of choice for tests and short-lived embedding.
#[derive(Debug)]
pub struct MemStore {
    collections: BTreeMap<String, Vec<DocJson>>,
    ids: IdGenerator,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            collections: BTreeMap::new(),
            ids: IdGenerator::new(),
        }
    }

    /// Validates a caller-supplied `_id` or assigns a generated one.
    ///
    /// Every document that enters a backend passes through here, which is
    /// what lets the update path assume stored documents carry an id.
    pub(crate) fn ensure_id(&mut self, doc: &mut DocJson) -> Result<RecordId, StoreError> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }
        match doc.get(ID_FIELD) {
            Some(value) => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| StoreError::InvalidId(value.to_string()))?;
                RecordId::parse(raw).map_err(|e| StoreError::InvalidId(e.to_string()))
            }
            None => {
                let id = self.ids.next_id();
                doc[ID_FIELD] = json!(id.as_str());
                Ok(id)
            }
        }
    }

    /// Assigns or validates the document's id and rejects caller-supplied
    /// ids that already exist in the collection.
    ///
    /// Generated ids are unique by construction and skip the existence
    /// scan.
    pub(crate) fn prepare_insert(
        &mut self,
        collection: &str,
        doc: &mut DocJson,
    ) -> Result<RecordId, StoreError> {
        let had_id = doc.is_object() && doc.get(ID_FIELD).is_some();
        let id = self.ensure_id(doc)?;
        if had_id && self.contains_id(collection, id.as_str()) {
            return Err(StoreError::DuplicateId(id.as_str().to_string()));
        }
        Ok(id)
    }

    fn contains_id(&self, collection: &str, id: &str) -> bool {
        self.collections
            .get(collection)
            .map_or(false, |docs| docs.iter().any(|d| doc_id(d) == Some(id)))
    }

    /// Applies one journaled operation, as used during file replay.
    pub(crate) fn apply_op(&mut self, op: JournalOp) {
        match op {
            JournalOp::Insert { collection, doc } => {
                self.collections.entry(collection).or_default().push(doc);
            }
            JournalOp::Replace { collection, doc } => {
                self.replace_by_id(&collection, doc);
            }
        }
    }

    /// Replaces the stored document sharing `doc`'s id, or appends when no
    /// such document exists (replay keeps the last version it sees).
    fn replace_by_id(&mut self, collection: &str, doc: DocJson) {
        let docs = self.collections.entry(collection.to_string()).or_default();
        let id = doc_id(&doc).map(str::to_string);
        if let Some(id) = id {
            if let Some(slot) = docs.iter_mut().find(|d| doc_id(d) == Some(id.as_str())) {
                *slot = doc;
                return;
            }
        }
        docs.push(doc);
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemStore {
    fn find(&self, collection: &str, query: &Query) -> Result<Vec<DocJson>, StoreError> {
        let docs = self
            .collections
            .get(collection)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        query.apply(docs.iter().cloned())
    }

    fn insert(
        &mut self,
        collection: &str,
        mut doc: DocJson,
        _concern: &WriteConcern,
    ) -> Result<RecordId, StoreError> {
        let id = self.prepare_insert(collection, &mut doc)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(id)
    }

    fn update(
        &mut self,
        collection: &str,
        query: &Query,
        mut doc: DocJson,
        upsert: bool,
    ) -> Result<u64, StoreError> {
        if !doc.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let probe = query.clone().limit(1);
        let matched = self.find(collection, &probe)?;
        match matched.into_iter().next() {
            Some(existing) => {
                let id = doc_id(&existing)
                    .ok_or_else(|| StoreError::InvalidId("stored document has no _id".to_string()))?;
                doc[ID_FIELD] = json!(id);
                self.replace_by_id(collection, doc);
                Ok(1)
            }
            None if upsert => {
                self.prepare_insert(collection, &mut doc)?;
                self.collections
                    .entry(collection.to_string())
                    .or_default()
                    .push(doc);
                Ok(0)
            }
            None => Ok(0),
        }
    }
}
