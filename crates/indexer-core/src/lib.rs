//! Indexer Core - Shared data model of the repository indexer
//!
//! This crate defines the types exchanged between the change sources, the
//! document builder and the bulk submission pipeline: revision ranges, commits,
//! file changes, search documents and bulk operations.

mod document;
mod error;
mod models;
mod submitter;

pub use document::{
    BlobDocument, BlobType, BulkOperation, CommitDocument, Document, JoinField, OperationKind, Payload, Person,
};
pub use error::CoreError;
pub use models::{
    ChangeKind, Commit, ContentReader, FileChange, ProjectId, RevisionRange, Signature, EMPTY_TREE_SHA,
    MAX_BLOB_SIZE, SUBMODULE_FILE_MODE, ZERO_SHA,
};
pub use submitter::Submitter;
