use std::path::Path;

use runcat_store::{DocumentStore, FileStore, MemStore, ReadMode};

use crate::errors::CatalogError;

/// Run metadata catalog over a document store.
///
/// All record access goes through one of these. The backend is a type
/// parameter so embedded (in-memory) and file-backed catalogs share one
/// surface; anything implementing [`DocumentStore`] works.
#[derive(Debug)]
pub struct Catalog<S> {
    pub(crate) store: S,
}

impl<S: DocumentStore> Catalog<S> {
    /// Wraps an already-open store.
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl Catalog<MemStore> {
    /// Creates a catalog over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemStore::new())
    }
}

impl Catalog<FileStore> {
    /// Opens or creates a file-backed catalog, replaying it strictly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Ok(Self::new(FileStore::open(path)?))
    }

    /// Opens or creates a file-backed catalog with the given replay mode.
    pub fn open_with<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, CatalogError> {
        Ok(Self::new(FileStore::open_with(path, mode)?))
    }
}
