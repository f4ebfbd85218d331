//! Search documents and the bulk operations carrying them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::ProjectId;

/// Flavour of blob being indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobType {
    #[default]
    Blob,
    WikiBlob,
}

impl BlobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobType::Blob => "blob",
            BlobType::WikiBlob => "wiki_blob",
        }
    }

    /// Repository id recorded in the document; wikis live in their own namespace
    pub fn repo_id(&self, project: ProjectId) -> String {
        match self {
            BlobType::Blob => project.to_string(),
            BlobType::WikiBlob => format!("wiki_{}", project),
        }
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlobType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(BlobType::Blob),
            "wiki_blob" => Ok(BlobType::WikiBlob),
            other => Err(CoreError::UnknownBlobType(other.to_string())),
        }
    }
}

/// Author or committer as stored in a commit document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    /// Basic date-time without millis, e.g. `20160927T143746+0000`
    pub time: String,
}

/// Commit payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDocument {
    #[serde(skip)]
    pub id: String,

    #[serde(rename = "type")]
    pub doc_type: String,

    pub author: Person,
    pub committer: Person,

    #[serde(rename = "rid")]
    pub repo_id: String,

    pub message: String,
    pub sha: String,
}

/// Blob payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDocument {
    #[serde(skip)]
    pub id: String,

    #[serde(rename = "type")]
    pub blob_type: BlobType,

    pub oid: String,

    #[serde(rename = "rid")]
    pub repo_id: String,

    pub commit_sha: String,
    pub content: String,
    pub path: String,

    // Same value as `path`, indexed with a different analyzer
    pub file_name: String,

    pub language: String,
}

/// Join-field relation linking a child document to its project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinField {
    pub name: String,
    pub parent: String,
}

/// Payload of a document, keyed by its kind on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Payload {
    #[serde(rename = "commit")]
    Commit(CommitDocument),
    #[serde(rename = "blob")]
    Blob(BlobDocument),
}

/// A complete search document: id, routing and join relation plus its payload.
///
/// Serializes to the source body sent to the search engine:
/// `{"blob": {..}, "project_id": 667, "type": "blob", "join_field": {..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    #[serde(skip)]
    id: String,

    #[serde(skip)]
    routing: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<u64>,

    #[serde(flatten)]
    payload: Payload,

    #[serde(rename = "type")]
    doc_type: String,

    join_field: JoinField,
}

impl Document {
    /// Wraps a commit payload for the given project
    pub fn commit(project: ProjectId, commit: CommitDocument) -> Self {
        Self {
            id: commit.id.clone(),
            routing: project.routing_key(),
            project_id: None,
            doc_type: "commit".to_string(),
            join_field: JoinField {
                name: "commit".to_string(),
                parent: project.routing_key(),
            },
            payload: Payload::Commit(commit),
        }
    }

    /// Wraps a blob payload for the given project
    pub fn blob(project: ProjectId, blob: BlobDocument) -> Self {
        let doc_type = blob.blob_type.as_str().to_string();
        Self {
            id: blob.id.clone(),
            routing: project.routing_key(),
            project_id: Some(project.0),
            join_field: JoinField {
                name: doc_type.clone(),
                parent: project.routing_key(),
            },
            doc_type,
            payload: Payload::Blob(blob),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn routing(&self) -> &str {
        &self.routing
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn join_field(&self) -> &JoinField {
        &self.join_field
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Kind of a bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Index,
    Delete,
}

impl OperationKind {
    /// Action name used on the bulk wire format
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Index => "index",
            OperationKind::Delete => "delete",
        }
    }
}

/// One index-or-delete request. Only index operations carry a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOperation {
    Index { document: Document },
    Delete { id: String, routing: String },
}

impl BulkOperation {
    /// Upsert of `document` under its own id and routing
    pub fn index(document: Document) -> Self {
        BulkOperation::Index { document }
    }

    pub fn delete(id: impl Into<String>, routing: impl Into<String>) -> Self {
        BulkOperation::Delete {
            id: id.into(),
            routing: routing.into(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            BulkOperation::Index { .. } => OperationKind::Index,
            BulkOperation::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BulkOperation::Index { document } => document.id(),
            BulkOperation::Delete { id, .. } => id,
        }
    }

    pub fn routing(&self) -> &str {
        match self {
            BulkOperation::Index { document } => document.routing(),
            BulkOperation::Delete { routing, .. } => routing,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            BulkOperation::Index { document } => Some(document),
            BulkOperation::Delete { .. } => None,
        }
    }
}
