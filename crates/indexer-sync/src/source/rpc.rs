//! Repository service backend
//!
//! The service streams raw changes and commits in chunks. The client that
//! speaks the service's wire protocol is injected as a [`RepositoryRpc`].

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use indexer_core::{
    ChangeKind, Commit, ContentReader, FileChange, RevisionRange, Signature, EMPTY_TREE_SHA, MAX_BLOB_SIZE,
    SUBMODULE_FILE_MODE,
};
use std::io::{Cursor, Read};

use super::{is_start_of_history, ChangeSource, ChangeVisitor, CommitVisitor, SourceError};

/// A streamed response: each item is one message of the stream
pub type RpcStream<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Operation of a raw change as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawChangeOperation {
    Unknown,
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
}

/// One entry of the raw changes between two revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChange {
    pub blob_id: String,
    pub size: u64,
    pub new_path: Vec<u8>,
    pub old_path: Vec<u8>,
    pub operation: RawChangeOperation,
    pub old_mode: u32,
    pub new_mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcSignature {
    pub name: Vec<u8>,
    pub email: Vec<u8>,
    /// Seconds since the Unix epoch
    pub seconds: i64,
    /// `+hhmm` / `-hhmm`; absent on older servers
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCommit {
    pub id: String,
    pub body: Vec<u8>,
    pub author: RpcSignature,
    pub committer: RpcSignature,
}

/// Client of the repository service
pub trait RepositoryRpc {
    fn find_default_branch_name(&self) -> Result<Vec<u8>>;

    /// `None` when the revision does not name a commit
    fn find_commit(&self, revision: &[u8]) -> Result<Option<RpcCommit>>;

    fn raw_changes(&self, from: &str, to: &str) -> Result<RpcStream<'_, Vec<RawChange>>>;

    fn commits_between(&self, from: &str, to: &str) -> Result<RpcStream<'_, Vec<RpcCommit>>>;

    /// Streams the blob content in chunks, truncated to `limit` bytes
    fn get_blob(&self, oid: &str, limit: u64) -> Result<RpcStream<'_, Vec<u8>>>;
}

/// Change source backed by a repository service
pub struct RpcSource<C> {
    client: C,
}

impl<C: RepositoryRpc> RpcSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// HEAD is not always set, so the default branch tip is used instead
    fn look_up_head(&self) -> Result<String> {
        let branch = self
            .client
            .find_default_branch_name()
            .map_err(|e| SourceError::NoDefaultBranch(format!("{:#}", e)))?;

        match self.client.find_commit(&branch) {
            Ok(Some(commit)) => Ok(commit.id),
            Ok(None) => Err(SourceError::NoDefaultBranch(format!(
                "{} does not point to a commit",
                String::from_utf8_lossy(&branch)
            ))
            .into()),
            Err(e) => Err(SourceError::NoDefaultBranch(format!("{:#}", e)).into()),
        }
    }

    fn resolve_commit(&self, revision: &str) -> Result<String> {
        let unknown = |reason: String| SourceError::UnknownRevision {
            revision: revision.to_string(),
            reason,
        };

        match self.client.find_commit(revision.as_bytes()) {
            Ok(Some(commit)) => Ok(commit.id),
            Ok(None) => Err(unknown("commit not found".to_string()).into()),
            Err(e) => Err(unknown(format!("{:#}", e)).into()),
        }
    }

    fn build_change(&self, change: &RawChange, path: &[u8], kind: ChangeKind, with_content: bool) -> FileChange<'_> {
        if with_content {
            let reader = self.content_reader(&change.blob_id);
            FileChange::new(path, change.blob_id.clone(), change.size, kind, reader)
        } else {
            FileChange::without_content(path, change.blob_id.clone(), change.size, kind)
        }
    }

    fn content_reader<'s>(&'s self, oid: &str) -> ContentReader<'s> {
        let oid = oid.to_string();
        Box::new(move || -> Result<Box<dyn Read + 's>> {
            let mut data = Vec::new();
            let stream = self
                .client
                .get_blob(&oid, MAX_BLOB_SIZE)
                .with_context(|| format!("Cannot get blob: {}", oid))?;
            for chunk in stream {
                data.extend_from_slice(&chunk.with_context(|| format!("GetBlob {}", oid))?);
            }
            Ok(Box::new(Cursor::new(data)))
        })
    }
}

fn change_kinds(operation: RawChangeOperation) -> (Option<ChangeKind>, Option<ChangeKind>) {
    match operation {
        RawChangeOperation::Added => (Some(ChangeKind::Added), None),
        RawChangeOperation::Modified | RawChangeOperation::TypeChanged => (Some(ChangeKind::Modified), None),
        RawChangeOperation::Copied => (Some(ChangeKind::Copied), None),
        RawChangeOperation::Deleted => (None, Some(ChangeKind::Deleted)),
        RawChangeOperation::Renamed => (Some(ChangeKind::Renamed), Some(ChangeKind::Renamed)),
        RawChangeOperation::Unknown => (None, None),
    }
}

/// Parses a `+hhmm` / `-hhmm` offset
fn parse_timezone(tz: &str) -> Option<FixedOffset> {
    let (sign, digits) = match tz.as_bytes().first()? {
        b'+' => (1, &tz[1..]),
        b'-' => (-1, &tz[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn build_signature(sig: &RpcSignature) -> Result<Signature> {
    let offset = match sig.timezone.as_deref() {
        Some(tz) => parse_timezone(tz).unwrap_or_else(|| {
            log::debug!("Ignoring malformed timezone {:?}", tz);
            utc()
        }),
        None => utc(),
    };

    let time = DateTime::<Utc>::from_timestamp(sig.seconds, 0)
        .with_context(|| format!("Invalid commit time: {}", sig.seconds))?
        .with_timezone(&offset);

    Ok(Signature::new(sig.name.clone(), sig.email.clone(), time))
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl<C: RepositoryRpc> ChangeSource for RpcSource<C> {
    fn resolve_range(&self, from: &str, to: &str) -> Result<RevisionRange> {
        let from = if is_start_of_history(from) {
            EMPTY_TREE_SHA.to_string()
        } else {
            self.resolve_commit(from)?
        };

        let to = if to.is_empty() {
            self.look_up_head()?
        } else {
            self.resolve_commit(to)?
        };

        Ok(RevisionRange::new(from, to))
    }

    fn for_each_commit(&self, range: &RevisionRange, visit: &mut CommitVisitor<'_>) -> Result<()> {
        if range.is_noop() {
            return Ok(());
        }

        let stream = self
            .client
            .commits_between(&range.from, &range.to)
            .context("could not call rpc.CommitsBetween")?;

        for message in stream {
            let commits = message.context("error calling rpc.CommitsBetween")?;
            for commit in commits {
                log::debug!("Indexing commit: {}", commit.id);
                visit(Commit {
                    hash: commit.id.clone(),
                    message: commit.body,
                    author: build_signature(&commit.author)?,
                    committer: build_signature(&commit.committer)?,
                })?;
            }
        }

        Ok(())
    }

    fn for_each_file_change(
        &self,
        range: &RevisionRange,
        put: &mut ChangeVisitor<'_>,
        delete: &mut ChangeVisitor<'_>,
    ) -> Result<()> {
        if range.is_noop() {
            return Ok(());
        }

        let stream = self
            .client
            .raw_changes(&range.from, &range.to)
            .context("could not call rpc.GetRawChanges")?;

        for message in stream {
            let changes = message.context("error calling rpc.GetRawChanges")?;
            for change in &changes {
                if change.old_mode == SUBMODULE_FILE_MODE || change.new_mode == SUBMODULE_FILE_MODE {
                    continue;
                }

                let (put_kind, delete_kind) = change_kinds(change.operation);

                if let Some(kind) = delete_kind {
                    let file = self.build_change(change, &change.old_path, kind, false);
                    log::debug!("Indexing blob change: DELETE {}", file.path_lossy());
                    delete(file)?;
                }

                if let Some(kind) = put_kind {
                    let file = self.build_change(change, &change.new_path, kind, true);
                    log::debug!("Indexing blob change: PUT {}", file.path_lossy());
                    put(file)?;
                }
            }
        }

        Ok(())
    }
}
