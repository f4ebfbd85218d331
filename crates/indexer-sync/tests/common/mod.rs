//! Shared fixtures: throwaway git repositories and an in-memory submitter

#![allow(dead_code)]

use anyhow::Result;
use git2::{Oid, Repository, Signature, Time};
use indexer_core::{BulkOperation, Submitter};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// 2017-10-28 15:38:47 +0200
pub const COMMIT_TIME: i64 = 1509197927;
pub const COMMIT_OFFSET_MINUTES: i32 = 120;

// ── git repositories ─────────────────────────────────────────────────────────

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;
        Ok(Self { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::new(
            "Job van der Voort",
            "job@gitlab.com",
            &Time::new(COMMIT_TIME, COMMIT_OFFSET_MINUTES),
        )?)
    }

    /// Writes and removes files through the index and commits on HEAD
    pub fn commit(&self, message: &str, files: &[(&str, &[u8])], removed: &[&str]) -> Result<Oid> {
        let mut index = self.repo.index()?;

        for (path, content) in files {
            let full = self.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full, content)?;
            index.add_path(Path::new(path))?;
        }
        for path in removed {
            fs::remove_file(self.path().join(path))?;
            index.remove_path(Path::new(path))?;
        }

        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        self.commit_tree(message, &tree)
    }

    /// Renames a file, keeping its content
    pub fn rename(&self, message: &str, from: &str, to: &str) -> Result<Oid> {
        let content = fs::read(self.path().join(from))?;
        let mut index = self.repo.index()?;

        fs::remove_file(self.path().join(from))?;
        index.remove_path(Path::new(from))?;
        fs::write(self.path().join(to), &content)?;
        index.add_path(Path::new(to))?;

        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        self.commit_tree(message, &tree)
    }

    /// Adds a gitlink (submodule) entry at the root of HEAD's tree
    pub fn add_submodule(&self, message: &str, name: &str, target: Oid) -> Result<Oid> {
        let head_tree = self.repo.head()?.peel_to_tree()?;
        let mut builder = self.repo.treebuilder(Some(&head_tree))?;
        builder.insert(name, target, 0o160000)?;
        let tree = self.repo.find_tree(builder.write()?)?;
        self.commit_tree(message, &tree)
    }

    fn commit_tree(&self, message: &str, tree: &git2::Tree<'_>) -> Result<Oid> {
        let sig = self.signature()?;
        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit()?],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        Ok(self.repo.commit(Some("HEAD"), &sig, &sig, message, tree, &parent_refs)?)
    }
}

// ── submitter ────────────────────────────────────────────────────────────────

/// Records operations; flush succeeds unless told otherwise
#[derive(Default)]
pub struct RecordingSubmitter {
    pub operations: RefCell<Vec<BulkOperation>>,
    pub flushes: Cell<usize>,
    pub fail_flush: bool,
}

impl RecordingSubmitter {
    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }

    pub fn indexed_ids(&self) -> Vec<String> {
        self.ids(|op| op.document().is_some())
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.ids(|op| op.document().is_none())
    }

    pub fn indexed_of_type(&self, doc_type: &str) -> Vec<String> {
        self.ids(|op| op.document().map(|d| d.doc_type() == doc_type).unwrap_or(false))
    }

    fn ids(&self, filter: impl Fn(&BulkOperation) -> bool) -> Vec<String> {
        let mut ids: Vec<String> = self
            .operations
            .borrow()
            .iter()
            .filter(|op| filter(op))
            .map(|op| op.id().to_string())
            .collect();
        ids.sort();
        ids
    }
}

impl Submitter for RecordingSubmitter {
    fn submit(&self, operation: BulkOperation) -> Result<()> {
        self.operations.borrow_mut().push(operation);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.set(self.flushes.get() + 1);
        if self.fail_flush {
            anyhow::bail!("Failed to perform all operations");
        }
        Ok(())
    }
}
