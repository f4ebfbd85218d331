//! Error types for indexer-core

/// Errors specific to indexer-core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Content of {0} was already read")]
    ContentConsumed(String),

    #[error("No content available for {0}")]
    NoContent(String),

    #[error("Unknown blob type: {0} (expected 'blob' or 'wiki_blob')")]
    UnknownBlobType(String),
}
