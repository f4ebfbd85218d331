//! Tests for the libgit2 change source against throwaway repositories

mod common;

use anyhow::Result;
use chrono::FixedOffset;
use common::{TestRepo, COMMIT_OFFSET_MINUTES, COMMIT_TIME};
use indexer_core::{ChangeKind, Commit, FileChange, RevisionRange, EMPTY_TREE_SHA, ZERO_SHA};
use indexer_sync::{ChangeSource, Git2Source, SourceError};
use std::io::Read;

// ── helpers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Collected {
    put: Vec<(String, ChangeKind, Vec<u8>, u64)>,
    deleted: Vec<(String, ChangeKind)>,
}

impl Collected {
    fn put_paths(&self) -> Vec<&str> {
        self.put.iter().map(|(path, ..)| path.as_str()).collect()
    }

    fn deleted_paths(&self) -> Vec<&str> {
        self.deleted.iter().map(|(path, _)| path.as_str()).collect()
    }
}

fn collect_changes(source: &dyn ChangeSource, range: &RevisionRange) -> Result<Collected> {
    let mut put = Vec::new();
    let mut deleted = Vec::new();

    source.for_each_file_change(
        range,
        &mut |mut change: FileChange<'_>| -> Result<()> {
            let mut content = Vec::new();
            change.open()?.read_to_end(&mut content)?;
            put.push((change.path_lossy().into_owned(), change.kind, content, change.size));
            Ok(())
        },
        &mut |change: FileChange<'_>| -> Result<()> {
            assert!(!change.has_content());
            deleted.push((change.path_lossy().into_owned(), change.kind));
            Ok(())
        },
    )?;

    put.sort_by(|a, b| a.0.cmp(&b.0));
    deleted.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Collected { put, deleted })
}

fn collect_commits(source: &dyn ChangeSource, range: &RevisionRange) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    source.for_each_commit(range, &mut |commit: Commit| -> Result<()> {
        commits.push(commit);
        Ok(())
    })?;
    Ok(commits)
}

/// Two commits: README.md + src/main.rs, then a modify, a delete and an add
fn two_commit_repo() -> Result<(TestRepo, git2::Oid, git2::Oid)> {
    let repo = TestRepo::new()?;
    let first = repo.commit(
        "Initial commit",
        &[("README.md", b"# Hello\n"), ("src/main.rs", b"fn main() {}\n")],
        &[],
    )?;
    let second = repo.commit(
        "Second commit",
        &[("README.md", b"# Hello, world\n"), ("docs/guide.md", b"guide\n")],
        &["src/main.rs"],
    )?;
    Ok((repo, first, second))
}

// ── range resolution ─────────────────────────────────────────────────────────

#[test]
fn test_resolve_defaults() -> Result<()> {
    let (repo, _, second) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;

    let range = source.resolve_range("", "")?;
    assert_eq!(range.from, EMPTY_TREE_SHA);
    assert_eq!(range.to, second.to_string());

    let range = source.resolve_range(ZERO_SHA, "")?;
    assert_eq!(range.from, EMPTY_TREE_SHA);
    Ok(())
}

#[test]
fn test_resolve_explicit_revisions() -> Result<()> {
    let (repo, first, second) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;

    let range = source.resolve_range(&first.to_string(), &second.to_string())?;
    assert_eq!(range, RevisionRange::new(first.to_string(), second.to_string()));

    let range = source.resolve_range("HEAD~1", "HEAD")?;
    assert_eq!(range, RevisionRange::new(first.to_string(), second.to_string()));
    Ok(())
}

#[test]
fn test_resolve_unknown_revision_fails() -> Result<()> {
    let (repo, _, _) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;

    let err = source.resolve_range("", "1234567890123456789012345678901234567890").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SourceError>(),
        Some(SourceError::UnknownRevision { .. })
    ));

    assert!(source.resolve_range("no-such-branch", "").is_err());
    Ok(())
}

#[test]
fn test_resolve_without_head_fails() -> Result<()> {
    let repo = TestRepo::new()?;
    let source = Git2Source::open(repo.path())?;

    let err = source.resolve_range("", "").unwrap_err();
    assert!(matches!(err.downcast_ref::<SourceError>(), Some(SourceError::NoDefaultBranch(_))));
    Ok(())
}

#[test]
fn test_open_missing_repository_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(Git2Source::open(dir.path().join("nope")).is_err());
}

// ── file changes ─────────────────────────────────────────────────────────────

#[test]
fn test_full_enumeration_from_empty_tree() -> Result<()> {
    let (repo, _, _) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range("", "")?;

    let changes = collect_changes(&source, &range)?;
    assert_eq!(changes.put_paths(), vec!["README.md", "docs/guide.md"]);
    assert!(changes.deleted.is_empty());

    let (_, kind, content, size) = &changes.put[0];
    assert_eq!(*kind, ChangeKind::Added);
    assert_eq!(content.as_slice(), b"# Hello, world\n");
    assert_eq!(*size, content.len() as u64);
    Ok(())
}

#[test]
fn test_incremental_changes() -> Result<()> {
    let (repo, first, second) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range(&first.to_string(), &second.to_string())?;

    let changes = collect_changes(&source, &range)?;
    assert_eq!(changes.put_paths(), vec!["README.md", "docs/guide.md"]);
    assert_eq!(changes.put[0].1, ChangeKind::Modified);
    assert_eq!(changes.put[1].1, ChangeKind::Added);
    assert_eq!(changes.deleted, vec![("src/main.rs".to_string(), ChangeKind::Deleted)]);
    Ok(())
}

#[test]
fn test_noop_range_yields_nothing() -> Result<()> {
    let (repo, _, second) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range(&second.to_string(), &second.to_string())?;

    let changes = collect_changes(&source, &range)?;
    assert!(changes.put.is_empty());
    assert!(changes.deleted.is_empty());
    assert!(collect_commits(&source, &range)?.is_empty());
    Ok(())
}

#[test]
fn test_rename_reports_both_sides() -> Result<()> {
    let repo = TestRepo::new()?;
    let first = repo.commit("Add a.txt", &[("a.txt", b"some content that stays the same\n")], &[])?;
    let second = repo.rename("Rename a.txt", "a.txt", "b.txt")?;

    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range(&first.to_string(), &second.to_string())?;

    let changes = collect_changes(&source, &range)?;
    assert_eq!(changes.deleted, vec![("a.txt".to_string(), ChangeKind::Renamed)]);
    assert_eq!(changes.put_paths(), vec!["b.txt"]);
    assert_eq!(changes.put[0].1, ChangeKind::Renamed);
    Ok(())
}

#[test]
fn test_submodules_are_skipped() -> Result<()> {
    let repo = TestRepo::new()?;
    let first = repo.commit("Add file", &[("file.txt", b"file\n")], &[])?;
    let second = repo.add_submodule("Add submodule", "vendor", first)?;

    let source = Git2Source::open(repo.path())?;

    let range = source.resolve_range(&first.to_string(), &second.to_string())?;
    let changes = collect_changes(&source, &range)?;
    assert!(changes.put.is_empty());
    assert!(changes.deleted.is_empty());

    let range = source.resolve_range("", &second.to_string())?;
    assert_eq!(collect_changes(&source, &range)?.put_paths(), vec!["file.txt"]);
    Ok(())
}

#[test]
fn test_visitor_error_aborts_enumeration() -> Result<()> {
    let (repo, _, _) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range("", "")?;

    let mut visited = 0;
    let result = source.for_each_file_change(
        &range,
        &mut |_change: FileChange<'_>| -> Result<()> {
            visited += 1;
            anyhow::bail!("stop")
        },
        &mut |_change: FileChange<'_>| -> Result<()> { Ok(()) },
    );

    assert_eq!(result.unwrap_err().to_string(), "stop");
    assert_eq!(visited, 1);
    Ok(())
}

// ── commits ──────────────────────────────────────────────────────────────────

#[test]
fn test_commits_in_range() -> Result<()> {
    let (repo, first, second) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;

    let all = collect_commits(&source, &source.resolve_range("", "")?)?;
    let mut hashes: Vec<String> = all.iter().map(|c| c.hash.clone()).collect();
    hashes.sort();
    let mut expected = vec![first.to_string(), second.to_string()];
    expected.sort();
    assert_eq!(hashes, expected);

    let range = source.resolve_range(&first.to_string(), "")?;
    let commits = collect_commits(&source, &range)?;
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].hash, second.to_string());
    Ok(())
}

#[test]
fn test_commit_signature_and_message() -> Result<()> {
    let (repo, first, _) = two_commit_repo()?;
    let source = Git2Source::open(repo.path())?;
    let range = source.resolve_range("", &first.to_string())?;

    let commits = collect_commits(&source, &range)?;
    assert_eq!(commits.len(), 1);

    let commit = &commits[0];
    assert_eq!(commit.message, b"Initial commit");
    assert_eq!(commit.author.name, b"Job van der Voort");
    assert_eq!(commit.author.email, b"job@gitlab.com");
    assert_eq!(commit.author.when.timestamp(), COMMIT_TIME);
    assert_eq!(
        *commit.author.when.offset(),
        FixedOffset::east_opt(COMMIT_OFFSET_MINUTES * 60).unwrap()
    );
    Ok(())
}
