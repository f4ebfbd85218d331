//! Builds search documents from commits and file changes

use anyhow::{Context, Result};
use indexer_core::{
    BlobDocument, BlobType, Commit, CommitDocument, FileChange, Person, ProjectId, Signature, MAX_BLOB_SIZE,
};
use std::fmt;
use std::io::Read;

use crate::encoding::CharsetNormalizer;
use crate::linguist::LanguageClassifier;

/// Only the head of a blob is scanned for NUL bytes, like git does
pub const BINARY_SEARCH_LIMIT: usize = 8 * 1024;

/// Basic date-time without milliseconds, e.g. `20171028T153847+0200`
const TIME_FORMAT: &str = "%Y%m%dT%H%M%S%z";

/// Why a blob produced no document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooLarge,
    Binary,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooLarge => f.write_str("too large"),
            SkipReason::Binary => f.write_str("binary"),
        }
    }
}

/// Result of building a blob document. Skipping is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobOutcome {
    Built(BlobDocument),
    Skipped(SkipReason),
}

/// Whether the first [`BINARY_SEARCH_LIMIT`] bytes contain a NUL byte
pub fn is_binary(data: &[u8]) -> bool {
    let limit = data.len().min(BINARY_SEARCH_LIMIT);
    data[..limit].contains(&0)
}

/// Turns repository entities into documents
#[derive(Default)]
pub struct DocumentBuilder {
    normalizer: CharsetNormalizer,
    classifier: LanguageClassifier,
}

impl DocumentBuilder {
    pub fn new(normalizer: CharsetNormalizer, classifier: LanguageClassifier) -> Self {
        Self { normalizer, classifier }
    }

    pub fn normalizer(&self) -> &CharsetNormalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &LanguageClassifier {
        &self.classifier
    }

    pub fn build_commit(&self, commit: &Commit, project: ProjectId) -> CommitDocument {
        CommitDocument {
            id: project.commit_id(&commit.hash),
            doc_type: "commit".to_string(),
            author: self.build_person(&commit.author),
            committer: self.build_person(&commit.committer),
            repo_id: project.to_string(),
            message: self.normalizer.normalize_bytes(&commit.message),
            sha: commit.hash.clone(),
        }
    }

    /// Builds the blob document for the `put` side of a change.
    ///
    /// Oversized blobs are skipped without reading their content.
    pub fn build_blob(
        &self,
        change: &mut FileChange<'_>,
        project: ProjectId,
        commit_sha: &str,
        blob_type: BlobType,
    ) -> Result<BlobOutcome> {
        if change.size > MAX_BLOB_SIZE {
            return Ok(BlobOutcome::Skipped(SkipReason::TooLarge));
        }

        let mut content = Vec::with_capacity(change.size as usize);
        change
            .open()?
            .read_to_end(&mut content)
            .with_context(|| format!("Failed to read blob {}", change.oid))?;

        if is_binary(&content) {
            return Ok(BlobOutcome::Skipped(SkipReason::Binary));
        }

        let path = self.normalizer.normalize_bytes(&change.path);
        Ok(BlobOutcome::Built(BlobDocument {
            id: project.blob_id(&path),
            blob_type,
            oid: change.oid.clone(),
            repo_id: blob_type.repo_id(project),
            commit_sha: commit_sha.to_string(),
            content: self.normalizer.normalize_bytes(&content),
            language: self.classifier.language_name(&path).to_string(),
            file_name: path.clone(),
            path,
        }))
    }

    /// Id of the blob document stored for `path`, normalized like [`Self::build_blob`]
    pub fn blob_id(&self, path: &[u8], project: ProjectId) -> String {
        project.blob_id(&self.normalizer.normalize_bytes(path))
    }

    fn build_person(&self, signature: &Signature) -> Person {
        Person {
            name: self.normalizer.normalize_bytes(&signature.name),
            email: self.normalizer.normalize_bytes(&signature.email),
            time: signature.when.format(TIME_FORMAT).to_string(),
        }
    }
}
