//! File-backed store that journals every mutation.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use runcat_model::RecordId;
use serde_json::json;

use crate::doc::{doc_id, DocJson, ID_FIELD};
use crate::errors::StoreError;
use crate::journal::{JournalOp, OpReader, OpWriter, ReadMode, WriteOptions};
use crate::memory::MemStore;
use crate::query::Query;
use crate::traits::{DocumentStore, WriteConcern};

/// Single-file document store.
///
/// Contents live in memory, rebuilt on open by replaying the file's
/// operation journal. Every mutation is appended to the journal before it
/// is applied in memory, so a reopened store reflects exactly the writes
/// that were acknowledged.
///
/// # Example
///
/// ```rust
/// use runcat_store::{DocumentStore, FileStore, Query, WriteConcern};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("catalog.rcat");
///
/// let mut store = FileStore::open(&path)?;
/// store.insert("headers", json!({"scan_id": 7}), &WriteConcern::acknowledged())?;
/// drop(store);
///
/// let store = FileStore::open(&path)?;
/// assert_eq!(store.find("headers", &Query::new())?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FileStore {
    mem: MemStore,
    writer: OpWriter,
}

impl FileStore {
    /// Opens or creates a store file, replaying it strictly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with(path, ReadMode::Strict)
    }

    /// Opens or creates a store file with the given replay mode.
    ///
    /// Strict replay fails on a truncated tail. Permissive replay keeps the
    /// intact prefix and trims the partial frame off the file so later
    /// appends stay readable.
    pub fn open_with<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut mem = MemStore::new();
        let mut recovered_len = None;

        match OpReader::open(path, mode) {
            Ok(mut reader) => {
                while let Some(op) = reader.read_op()? {
                    mem.apply_op(op);
                }
                recovered_len = Some(reader.position());
            }
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        if mode == ReadMode::Permissive {
            if let Some(len) = recovered_len {
                let file = OpenOptions::new().write(true).open(path)?;
                if file.metadata()?.len() > len {
                    file.set_len(len)?;
                }
            }
        }

        let writer = OpWriter::open(path, WriteOptions::default())?;
        Ok(Self { mem, writer })
    }
}

impl DocumentStore for FileStore {
    fn find(&self, collection: &str, query: &Query) -> Result<Vec<DocJson>, StoreError> {
        self.mem.find(collection, query)
    }

    fn insert(
        &mut self,
        collection: &str,
        mut doc: DocJson,
        _concern: &WriteConcern,
    ) -> Result<RecordId, StoreError> {
        let id = self.mem.prepare_insert(collection, &mut doc)?;
        let op = JournalOp::Insert {
            collection: collection.to_string(),
            doc,
        };
        self.writer.append(&op)?;
        self.mem.apply_op(op);
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
        let matched = self.mem.find(collection, &probe)?;
        match matched.into_iter().next() {
            Some(existing) => {
                let id = doc_id(&existing)
                    .ok_or_else(|| StoreError::InvalidId("stored document has no _id".to_string()))?;
                doc[ID_FIELD] = json!(id);
                let op = JournalOp::Replace {
                    collection: collection.to_string(),
                    doc,
                };
                self.writer.append(&op)?;
                self.mem.apply_op(op);
                Ok(1)
            }
            None if upsert => {
                self.mem.prepare_insert(collection, &mut doc)?;
                let op = JournalOp::Insert {
                    collection: collection.to_string(),
                    doc,
                };
                self.writer.append(&op)?;
                self.mem.apply_op(op);
                Ok(0)
            }
            None => Ok(0),
        }
    }
}
