//! Change sources
//!
//! A change source enumerates what happened to a repository between two
//! revisions: the commits in `from..to` and the tree difference between the
//! two ends. Two backends exist:
//! - [`Git2Source`] reads a local repository through libgit2
//! - [`RpcSource`] talks to a repository service through a [`RepositoryRpc`] client

mod git;
mod rpc;

pub use git::Git2Source;
pub use rpc::{RawChange, RawChangeOperation, RepositoryRpc, RpcCommit, RpcSignature, RpcSource, RpcStream};

use anyhow::Result;
use indexer_core::{Commit, FileChange, RevisionRange, EMPTY_TREE_SHA, ZERO_SHA};

/// Visitor for commits; an error stops the enumeration
pub type CommitVisitor<'v> = dyn FnMut(Commit) -> Result<()> + 'v;

/// Visitor for file changes; an error stops the enumeration
pub type ChangeVisitor<'v> = dyn FnMut(FileChange<'_>) -> Result<()> + 'v;

/// Errors raised while resolving a revision range
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Bad revision {revision}: {reason}")]
    UnknownRevision { revision: String, reason: String },

    #[error("Cannot look up the default branch head: {0}")]
    NoDefaultBranch(String),
}

/// Enumerates commits and file changes of one repository
pub trait ChangeSource {
    /// Resolves raw revisions into a range.
    ///
    /// An empty or all-zero `from` becomes the empty tree. An empty `to`
    /// becomes the head of the default branch.
    fn resolve_range(&self, from: &str, to: &str) -> Result<RevisionRange>;

    /// Visits every commit reachable from `range.to` but not from `range.from`.
    /// Order is unspecified.
    fn for_each_commit(&self, range: &RevisionRange, visit: &mut CommitVisitor<'_>) -> Result<()>;

    /// Visits the tree difference between both ends of the range.
    ///
    /// Added, modified, copied and the new side of renamed paths go to `put`;
    /// deleted and the old side of renamed paths go to `delete`.
    fn for_each_file_change(
        &self,
        range: &RevisionRange,
        put: &mut ChangeVisitor<'_>,
        delete: &mut ChangeVisitor<'_>,
    ) -> Result<()>;
}

/// Whether a raw `from` revision means "the beginning of history"
pub(crate) fn is_start_of_history(from: &str) -> bool {
    from.is_empty() || from == ZERO_SHA || from == EMPTY_TREE_SHA
}
