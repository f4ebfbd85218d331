//! Indexer Elastic - Search engine side of the repository indexer
//!
//! This crate is responsible for:
//! - Reading the search engine connection info
//! - Encoding bulk operations into the bulk wire format
//! - Batching and dispatching them through a worker pool ([`BulkProcessor`])
//! - Surfacing partial bulk failures as one aggregate error on flush
//! - Index lifecycle (create/delete/refresh) and get-by-id for verification

mod bulk;
mod client;
mod config;
mod processor;
mod response;

pub use bulk::{encode_operation, BulkBatch, BulkTransport, EncodedOperation};
pub use client::{ElasticClient, INDEX_MAPPING};
pub use config::{ElasticConfig, CONNECTION_INFO_VAR, DEFAULT_BULK_WORKERS, DEFAULT_MAX_BULK_SIZE};
pub use processor::{BulkError, BulkProcessor};
pub use response::{BulkResponse, BulkResponseItem};
