//! Repository-side data model shared by change sources and the document builder

use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use crate::error::CoreError;

/// Id of git's empty tree. Diffing against it enumerates the whole tree.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// All-zero revision, used by callers to say "there is no previous revision"
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// Git file mode of submodule (gitlink) entries
pub const SUBMODULE_FILE_MODE: u32 = 0o160000;

/// Blobs above this size are never read nor indexed
pub const MAX_BLOB_SIZE: u64 = 1024 * 1024;

/// Identifier of the project owning the indexed repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub u64);

impl ProjectId {
    /// Routing key co-locating every document of this project on one shard
    pub fn routing_key(&self) -> String {
        format!("project_{}", self.0)
    }

    /// Document id of a blob: "<project>_<path>"
    pub fn blob_id(&self, path: &str) -> String {
        format!("{}_{}", self.0, path)
    }

    /// Document id of a commit: "<project>_<sha>"
    pub fn commit_id(&self, sha: &str) -> String {
        format!("{}_{}", self.0, sha)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved pair of revisions; `from` is exclusive, `to` inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
    pub from: String,
    pub to: String,
}

impl RevisionRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A range whose ends are equal contains no commits and no changes
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// Whether `from` is the empty tree, i.e. the whole history up to `to`
    pub fn from_empty_tree(&self) -> bool {
        self.from == EMPTY_TREE_SHA
    }
}

impl fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// Author or committer of a commit. Name and email are raw bytes in an unknown charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    pub fn new(name: impl Into<Vec<u8>>, email: impl Into<Vec<u8>>, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }
}

/// Commit as enumerated by a change source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: Vec<u8>,
    pub author: Signature,
    pub committer: Signature,
}

/// How a path changed between the two ends of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Copied => "copied",
        };
        f.write_str(s)
    }
}

/// One-shot accessor to the content of a blob
pub type ContentReader<'a> = Box<dyn FnOnce() -> anyhow::Result<Box<dyn Read + 'a>> + 'a>;

/// A single path change between two revisions.
///
/// The content accessor is consumed by [`FileChange::open`]; the change source
/// keeps ownership of whatever backs it (repository handle, RPC client).
pub struct FileChange<'a> {
    /// Path as stored in the repository (charset unknown)
    pub path: Vec<u8>,

    /// Object id of the blob on this side of the change
    pub oid: String,

    /// Blob size in bytes, known without reading the content
    pub size: u64,

    pub kind: ChangeKind,

    reader: Option<ContentReader<'a>>,
    consumed: bool,
}

impl<'a> FileChange<'a> {
    /// A change whose content can be read once
    pub fn new(
        path: impl Into<Vec<u8>>,
        oid: impl Into<String>,
        size: u64,
        kind: ChangeKind,
        reader: ContentReader<'a>,
    ) -> Self {
        Self {
            path: path.into(),
            oid: oid.into(),
            size,
            kind,
            reader: Some(reader),
            consumed: false,
        }
    }

    /// A change without content, as handed to delete visitors
    pub fn without_content(path: impl Into<Vec<u8>>, oid: impl Into<String>, size: u64, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            oid: oid.into(),
            size,
            kind,
            reader: None,
            consumed: false,
        }
    }

    /// Path for display and logging
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    /// Whether [`FileChange::open`] can still succeed
    pub fn has_content(&self) -> bool {
        self.reader.is_some()
    }

    /// Opens the blob content. Works at most once per change.
    pub fn open(&mut self) -> anyhow::Result<Box<dyn Read + 'a>> {
        match self.reader.take() {
            Some(reader) => {
                self.consumed = true;
                reader()
            }
            None if self.consumed => Err(CoreError::ContentConsumed(self.path_lossy().into_owned()).into()),
            None => Err(CoreError::NoContent(self.path_lossy().into_owned()).into()),
        }
    }
}

impl fmt::Debug for FileChange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileChange")
            .field("path", &self.path_lossy())
            .field("oid", &self.oid)
            .field("size", &self.size)
            .field("kind", &self.kind)
            .field("has_content", &self.has_content())
            .finish()
    }
}
