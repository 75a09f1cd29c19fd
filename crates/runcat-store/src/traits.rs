//! The store trait and write-concern options.

use std::time::Duration;

use runcat_model::RecordId;

use crate::doc::DocJson;
use crate::errors::StoreError;
use crate::query::Query;

/// Durability requested for one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteConcern {
    /// Acknowledgment level. The reference backends are single-node: any
    /// value above zero means the write reaches the operating system before
    /// the call returns.
    pub w: u32,
    /// How long a remote backend may wait for acknowledgment. The reference
    /// backends acknowledge synchronously and do not consult this.
    pub wtimeout: Duration,
}

impl WriteConcern {
    /// One acknowledged write with a 100 ms wait bound. The catalog layer
    /// requests this for every record it persists.
    pub const fn acknowledged() -> Self {
        Self {
            w: 1,
            wtimeout: Duration::from_millis(100),
        }
    }
}

impl Default for WriteConcern {
    fn default() -> Self {
        Self::acknowledged()
    }
}

/// Backend seam the catalog layer is written against.
///
/// Collections spring into existence on first insert; a find against an
/// absent collection returns no documents. Mutation takes `&mut self` and
/// backends provide no internal locking; concurrent use needs external
/// coordination.
pub trait DocumentStore {
    /// Runs a query against one collection. Unsorted results come back in
    /// natural (insertion) order.
    fn find(&self, collection: &str, query: &Query) -> Result<Vec<DocJson>, StoreError>;

    /// Inserts a document, assigning a fresh record id when the document
    /// lacks one, and returns the id.
    fn insert(
        &mut self,
        collection: &str,
        doc: DocJson,
        concern: &WriteConcern,
    ) -> Result<RecordId, StoreError>;

    /// Replaces the first document matching `query` with `doc`, keeping the
    /// matched document's id. Returns the number of documents matched (0 or
    /// 1). With `upsert` set, a miss inserts `doc` instead of doing nothing.
    fn update(
        &mut self,
        collection: &str,
        query: &Query,
        doc: DocJson,
        upsert: bool,
    ) -> Result<u64, StoreError>;
}
