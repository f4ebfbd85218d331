//! Contract between the indexing orchestrator and the search engine pipeline

use anyhow::Result;

use crate::document::{BulkOperation, Document};

/// Accepts bulk operations and ships them to the search engine.
///
/// Enqueueing never waits on the network. Failures of individual operations
/// are only reported by [`Submitter::flush`].
pub trait Submitter {
    /// Buffers a single operation
    fn submit(&self, operation: BulkOperation) -> Result<()>;

    /// Waits until everything submitted so far has been acknowledged, then
    /// reports whether any operation failed
    fn flush(&self) -> Result<()>;

    fn enqueue_index(&self, document: Document) -> Result<()> {
        self.submit(BulkOperation::index(document))
    }

    fn enqueue_delete(&self, id: String, routing: String) -> Result<()> {
        self.submit(BulkOperation::delete(id, routing))
    }
}
