//! Indexing orchestrator
//!
//! Sequences one run: resolve the range, stream file changes into blob
//! operations, stream commits into commit operations, then flush. The first
//! error ends the run; nothing is flushed after a failed phase.

use anyhow::{Context, Result};
use indexer_core::{BlobType, Commit, Document, FileChange, ProjectId, RevisionRange, Submitter};
use std::fmt;
use std::time::Instant;

use crate::builder::{BlobOutcome, DocumentBuilder};
use crate::source::ChangeSource;
use crate::stats::IndexStats;

/// Step of a run, as reported when it fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RangeResolution,
    BlobIndexing,
    CommitIndexing,
    Flushing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::RangeResolution => "range resolution",
            Phase::BlobIndexing => "blob indexing",
            Phase::CommitIndexing => "commit indexing",
            Phase::Flushing => "flushing",
        };
        f.write_str(s)
    }
}

/// Lifecycle of an [`Indexer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ChangesInFlight,
    CommitsInFlight,
    Flushing,
    Done,
    Failed,
}

/// A failed run; displays as the single diagnostic line
#[derive(Debug, thiserror::Error)]
#[error("Error during {phase}: {cause:#}")]
pub struct RunError {
    pub phase: Phase,
    cause: anyhow::Error,
}

impl RunError {
    pub fn new(phase: Phase, cause: anyhow::Error) -> Self {
        Self { phase, cause }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }

    pub fn into_cause(self) -> anyhow::Error {
        self.cause
    }
}

/// What to index in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Exclusive start; empty or all zeros means the beginning of history
    pub from: String,
    /// Inclusive end; empty means the default branch head
    pub to: String,
    pub blob_type: BlobType,
    pub skip_commits: bool,
}

impl IndexOptions {
    /// Commits are only indexed for regular repositories
    pub fn index_commits(&self) -> bool {
        !self.skip_commits && self.blob_type == BlobType::Blob
    }
}

/// Feeds one change source into one submitter
pub struct Indexer<'a> {
    source: &'a dyn ChangeSource,
    submitter: &'a dyn Submitter,
    builder: DocumentBuilder,
    project: ProjectId,
    state: RunState,
}

impl<'a> Indexer<'a> {
    pub fn new(source: &'a dyn ChangeSource, submitter: &'a dyn Submitter, project: ProjectId) -> Self {
        Self::with_builder(source, submitter, project, DocumentBuilder::default())
    }

    pub fn with_builder(
        source: &'a dyn ChangeSource,
        submitter: &'a dyn Submitter,
        project: ProjectId,
        builder: DocumentBuilder,
    ) -> Self {
        Self {
            source,
            submitter,
            builder,
            project,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs all phases, returning the statistics of a successful run
    pub fn run(&mut self, options: &IndexOptions) -> Result<IndexStats, RunError> {
        let start_time = Instant::now();
        let mut stats = IndexStats::default();

        let range = self
            .source
            .resolve_range(&options.from, &options.to)
            .map_err(|e| self.fail(Phase::RangeResolution, e))?;
        log::info!("Indexing {} of project {} ({})", range, self.project, options.blob_type);

        self.transition(RunState::ChangesInFlight);
        self.index_blobs(&range, options.blob_type, &mut stats)
            .map_err(|e| self.fail(Phase::BlobIndexing, e))?;

        if options.index_commits() {
            self.transition(RunState::CommitsInFlight);
            self.index_commits(&range, &mut stats)
                .map_err(|e| self.fail(Phase::CommitIndexing, e))?;
        }

        self.transition(RunState::Flushing);
        self.submitter.flush().map_err(|e| self.fail(Phase::Flushing, e))?;

        self.transition(RunState::Done);
        stats.elapsed_time = start_time.elapsed();
        log::info!("Done: {}", stats);
        Ok(stats)
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, phase: Phase, cause: anyhow::Error) -> RunError {
        self.transition(RunState::Failed);
        RunError::new(phase, cause)
    }

    fn index_blobs(&self, range: &RevisionRange, blob_type: BlobType, stats: &mut IndexStats) -> Result<()> {
        let mut indexed = 0;
        let mut removed = 0;
        let mut skipped = Vec::new();

        let mut put = |mut change: FileChange<'_>| -> Result<()> {
            let outcome = self
                .builder
                .build_blob(&mut change, self.project, &range.to, blob_type)
                .with_context(|| format!("Blob {}", change.path_lossy()))?;

            match outcome {
                BlobOutcome::Built(blob) => {
                    self.submitter.enqueue_index(Document::blob(self.project, blob))?;
                    indexed += 1;
                }
                BlobOutcome::Skipped(reason) => {
                    log::debug!("Skipping blob {} ({})", change.path_lossy(), reason);
                    skipped.push(reason);
                }
            }
            Ok(())
        };

        let mut delete = |change: FileChange<'_>| -> Result<()> {
            let id = self.builder.blob_id(&change.path, self.project);
            self.submitter.enqueue_delete(id, self.project.routing_key())?;
            removed += 1;
            Ok(())
        };

        self.source.for_each_file_change(range, &mut put, &mut delete)?;

        stats.blobs_indexed += indexed;
        stats.blobs_removed += removed;
        for reason in skipped {
            stats.record_skip(reason);
        }
        Ok(())
    }

    fn index_commits(&self, range: &RevisionRange, stats: &mut IndexStats) -> Result<()> {
        self.source.for_each_commit(range, &mut |commit: Commit| -> Result<()> {
            let document = self.builder.build_commit(&commit, self.project);
            self.submitter.enqueue_index(Document::commit(self.project, document))?;
            stats.commits_indexed += 1;
            Ok(())
        })
    }
}
