//! Bulk wire format and the transport seam
//!
//! A batch is newline-delimited JSON: one action line per operation,
//! followed by the document source for index actions.

use anyhow::{Context, Result};
use indexer_core::{BulkOperation, OperationKind};
use serde::Serialize;

use crate::response::BulkResponse;

/// Executes a batch against the search engine's bulk endpoint
pub trait BulkTransport: Send + Sync {
    fn execute(&self, batch: &BulkBatch) -> Result<BulkResponse>;
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: &'a str,
    routing: &'a str,
}

/// Encodes one operation into its bulk lines (each terminated by `\n`)
pub fn encode_operation(operation: &BulkOperation, index: &str) -> Result<String> {
    let meta = ActionMeta {
        index,
        id: operation.id(),
        routing: operation.routing(),
    };

    let mut action = serde_json::Map::new();
    action.insert(
        operation.kind().as_str().to_string(),
        serde_json::to_value(&meta).context("Failed to encode bulk action")?,
    );

    let mut lines = serde_json::to_string(&action).context("Failed to encode bulk action")?;
    lines.push('\n');

    if let Some(document) = operation.document() {
        let source = serde_json::to_string(document)
            .with_context(|| format!("Failed to encode document {}", document.id()))?;
        lines.push_str(&source);
        lines.push('\n');
    }

    Ok(lines)
}

/// An operation already encoded for the wire
#[derive(Debug, Clone)]
pub struct EncodedOperation {
    pub kind: OperationKind,
    pub id: String,
    lines: String,
}

impl EncodedOperation {
    pub fn lines(&self) -> &str {
        &self.lines
    }
}

/// Operations accumulated for one bulk call
#[derive(Debug, Default)]
pub struct BulkBatch {
    execution_id: u64,
    operations: Vec<EncodedOperation>,
    size_bytes: usize,
}

impl BulkBatch {
    pub fn new(execution_id: u64) -> Self {
        Self {
            execution_id,
            ..Self::default()
        }
    }

    /// Encodes and appends an operation
    pub fn push(&mut self, operation: &BulkOperation, index: &str) -> Result<()> {
        let lines = encode_operation(operation, index)?;
        self.size_bytes += lines.len();
        self.operations.push(EncodedOperation {
            kind: operation.kind(),
            id: operation.id().to_string(),
            lines,
        });
        Ok(())
    }

    pub fn execution_id(&self) -> u64 {
        self.execution_id
    }

    pub fn operations(&self) -> &[EncodedOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Request body for the `_bulk` endpoint
    pub fn body(&self) -> String {
        let mut body = String::with_capacity(self.size_bytes);
        for operation in &self.operations {
            body.push_str(&operation.lines);
        }
        body
    }
}
