//! Bulk API response model

use indexer_core::OperationKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-operation result inside a bulk response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponseItem {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl BulkResponseItem {
    pub fn ok(id: impl Into<String>, status: u16) -> Self {
        Self {
            id: Some(id.into()),
            status,
            ..Self::default()
        }
    }

    pub fn failure(id: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            status,
            error: Some(serde_json::json!({ "reason": reason.into() })),
            ..Self::default()
        }
    }

    /// Deleting a document that was never indexed answers 404 and is not a failure
    fn is_failure(&self, action: &str) -> bool {
        if self.error.is_some() {
            return true;
        }
        if action == OperationKind::Delete.as_str() && self.status == 404 {
            return false;
        }
        !(200..=299).contains(&self.status)
    }
}

/// Response of one `_bulk` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,

    /// Set by the engine when at least one item failed
    #[serde(default)]
    pub errors: bool,

    /// One single-entry map per operation, keyed by action name
    #[serde(default)]
    pub items: Vec<HashMap<String, BulkResponseItem>>,
}

impl BulkResponse {
    /// Builds a response from per-operation results, deriving the `errors` flag
    pub fn from_items(items: Vec<(OperationKind, BulkResponseItem)>) -> Self {
        let mut response = Self {
            took: 0,
            errors: false,
            items: items
                .into_iter()
                .map(|(kind, item)| HashMap::from([(kind.as_str().to_string(), item)]))
                .collect(),
        };
        response.errors = !response.failed().is_empty();
        response
    }

    fn entries(&self) -> impl Iterator<Item = (&str, &BulkResponseItem)> {
        self.items
            .iter()
            .flat_map(|entry| entry.iter().map(|(action, item)| (action.as_str(), item)))
    }

    pub fn failed(&self) -> Vec<&BulkResponseItem> {
        self.entries()
            .filter(|(action, item)| item.is_failure(action))
            .map(|(_, item)| item)
            .collect()
    }

    pub fn succeeded(&self) -> Vec<&BulkResponseItem> {
        self.entries()
            .filter(|(action, item)| !item.is_failure(action))
            .map(|(_, item)| item)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}
