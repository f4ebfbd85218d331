//! Indexer Sync - Repository side of the indexer
//!
//! This crate is responsible for:
//! - Enumerating commits and file changes of a revision range ([`ChangeSource`])
//!   from a local repository or a repository service
//! - Converting content of unknown charset to UTF-8
//! - Detecting the language of a file from its name
//! - Building commit and blob documents, skipping oversized and binary blobs
//! - Driving one indexing run into a [`indexer_core::Submitter`] ([`Indexer`])

mod builder;
mod encoding;
mod formatting;
mod indexer;
pub mod linguist;
pub mod source;
mod stats;

pub use builder::{is_binary, BlobOutcome, DocumentBuilder, SkipReason, BINARY_SEARCH_LIMIT};
pub use encoding::{CharsetDetector, CharsetNormalizer, ChardetngDetector, EncodingError, FixedDetector};
pub use indexer::{IndexOptions, Indexer, Phase, RunError, RunState};
pub use linguist::{Language, LanguageClassifier, LanguageKind, DEFAULT_LANGUAGE};
pub use source::{ChangeSource, Git2Source, RpcSource, SourceError};
pub use stats::IndexStats;
