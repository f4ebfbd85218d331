//! Local repository backend built on libgit2

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use git2::{Delta, DiffFile, DiffFindOptions, DiffOptions, FileMode, Odb, Oid, Repository, Sort, Tree};
use indexer_core::{ChangeKind, Commit, ContentReader, FileChange, RevisionRange, Signature, EMPTY_TREE_SHA};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use super::{is_start_of_history, ChangeSource, ChangeVisitor, CommitVisitor, SourceError};

/// Change source reading a repository on disk (bare or not)
pub struct Git2Source {
    repo: Repository,
    path: PathBuf,
}

impl Git2Source {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())
            .with_context(|| format!("Failed to open repository at {:?}", path.as_ref()))?;

        Ok(Self {
            repo,
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| SourceError::UnknownRevision {
                revision: revision.to_string(),
                reason: e.message().to_string(),
            })?;
        Ok(commit.id())
    }

    fn head_commit(&self) -> Result<Oid> {
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| SourceError::NoDefaultBranch(e.message().to_string()))?;
        Ok(commit.id())
    }

    fn tree_of(&self, revision: &str) -> Result<Tree<'_>> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_tree())
            .with_context(|| format!("Failed to get tree of {}", revision))
    }

    fn build_commit(&self, oid: Oid) -> Result<Commit> {
        let commit = self.repo.find_commit(oid).with_context(|| format!("Failed to find commit {}", oid))?;

        let built = Commit {
            hash: oid.to_string(),
            message: commit.message_bytes().to_vec(),
            author: build_signature(&commit.author())?,
            committer: build_signature(&commit.committer())?,
        };
        Ok(built)
    }

    fn build_change<'s>(
        &'s self,
        odb: &Odb<'_>,
        file: &DiffFile<'_>,
        kind: ChangeKind,
        with_content: bool,
    ) -> Result<FileChange<'s>> {
        let oid = file.id();
        let path = file.path_bytes().unwrap_or_default().to_vec();
        let (size, _) = odb
            .read_header(oid)
            .with_context(|| format!("Failed to read header of object {}", oid))?;

        let change = if with_content {
            FileChange::new(path, oid.to_string(), size as u64, kind, self.content_reader(oid))
        } else {
            FileChange::without_content(path, oid.to_string(), size as u64, kind)
        };
        Ok(change)
    }

    fn content_reader<'s>(&'s self, oid: Oid) -> ContentReader<'s> {
        Box::new(move || -> Result<Box<dyn Read + 's>> {
            let blob = self.repo.find_blob(oid).with_context(|| format!("Failed to read blob {}", oid))?;
            Ok(Box::new(Cursor::new(blob.content().to_vec())))
        })
    }
}

fn build_signature(sig: &git2::Signature<'_>) -> Result<Signature> {
    let when = sig.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .with_context(|| format!("Invalid timezone offset: {} minutes", when.offset_minutes()))?;
    let time = DateTime::<Utc>::from_timestamp(when.seconds(), 0)
        .with_context(|| format!("Invalid commit time: {}", when.seconds()))?
        .with_timezone(&offset);

    Ok(Signature::new(sig.name_bytes(), sig.email_bytes(), time))
}

impl ChangeSource for Git2Source {
    fn resolve_range(&self, from: &str, to: &str) -> Result<RevisionRange> {
        let from = if is_start_of_history(from) {
            EMPTY_TREE_SHA.to_string()
        } else {
            self.resolve_commit(from)?.to_string()
        };

        let to = if to.is_empty() {
            self.head_commit()?
        } else {
            self.resolve_commit(to)?
        };

        Ok(RevisionRange::new(from, to.to_string()))
    }

    fn for_each_commit(&self, range: &RevisionRange, visit: &mut CommitVisitor<'_>) -> Result<()> {
        if range.is_noop() {
            return Ok(());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;
        revwalk.push(Oid::from_str(&range.to).context("Invalid to SHA")?)?;
        if !range.from_empty_tree() {
            revwalk.hide(Oid::from_str(&range.from).context("Invalid from SHA")?)?;
        }

        for oid_result in revwalk {
            let oid = oid_result.context("Failed to get commit OID")?;
            log::debug!("Indexing commit: {}", oid);
            visit(self.build_commit(oid)?)?;
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

        let from_tree = if range.from_empty_tree() {
            None
        } else {
            Some(self.tree_of(&range.from)?)
        };
        let to_tree = self.tree_of(&range.to)?;

        let mut opts = DiffOptions::new();
        opts.include_typechange(true);
        let mut diff = self
            .repo
            .diff_tree_to_tree(from_tree.as_ref(), Some(&to_tree), Some(&mut opts))
            .with_context(|| format!("Failed to diff {}", range))?;

        let mut find = DiffFindOptions::new();
        find.renames(true).copies(true);
        diff.find_similar(Some(&mut find)).context("Failed to detect renames")?;

        let odb = self.repo.odb().context("Failed to open object database")?;

        for delta in diff.deltas() {
            let (old, new) = (delta.old_file(), delta.new_file());
            if old.mode() == FileMode::Commit || new.mode() == FileMode::Commit {
                continue;
            }

            let (put_kind, delete_kind) = match delta.status() {
                Delta::Added => (Some(ChangeKind::Added), None),
                Delta::Modified | Delta::Typechange => (Some(ChangeKind::Modified), None),
                Delta::Copied => (Some(ChangeKind::Copied), None),
                Delta::Deleted => (None, Some(ChangeKind::Deleted)),
                Delta::Renamed => (Some(ChangeKind::Renamed), Some(ChangeKind::Renamed)),
                other => {
                    log::debug!("Ignoring {:?} delta for {:?}", other, new.path());
                    continue;
                }
            };

            if let Some(kind) = delete_kind {
                let change = self.build_change(&odb, &old, kind, false)?;
                log::debug!("Indexing blob change: DELETE {}", change.path_lossy());
                delete(change)?;
            }

            if let Some(kind) = put_kind {
                let change = self.build_change(&odb, &new, kind, true)?;
                log::debug!("Indexing blob change: PUT {}", change.path_lossy());
                put(change)?;
            }
        }

        Ok(())
    }
}
