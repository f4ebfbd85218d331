//! Git Search Indexer CLI - Feeds a repository revision range into a search index
//!
//! Provides:
//! - Incremental indexing of blobs between two revisions (`FROM_SHA`..`TO_SHA`)
//! - Indexing of the commits in that range
//! - Wiki repositories through `--blob-type wiki_blob`

mod commands;
mod helpers;

use clap::builder::FalseyValueParser;
use clap::Parser;
use indexer_core::{BlobType, ProjectId};
use indexer_sync::IndexOptions;
use std::path::PathBuf;

use commands::cmd_index;
use helpers::log_filter;

#[derive(Parser)]
#[command(name = "git-search-indexer")]
#[command(about = "Indexes the blobs and commits of a git revision range into a search engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Numeric id of the project owning the repository
    project_id: u64,

    /// Path to the repository
    repo_path: PathBuf,

    /// Skips indexing commits for the repository
    #[arg(long, env = "SKIP_COMMITS", value_parser = FalseyValueParser::new())]
    skip_commits: bool,

    /// The type of blobs to index: blob or wiki_blob
    #[arg(long, default_value = "blob")]
    blob_type: BlobType,

    /// Exclusive start of the range (default: beginning of history)
    #[arg(long, env = "FROM_SHA", default_value = "")]
    from_sha: String,

    /// Inclusive end of the range (default: head of the default branch)
    #[arg(long, env = "TO_SHA", default_value = "")]
    to_sha: String,

    /// Log level, forced to debug when DEBUG is set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    // Configure logger
    let debug = std::env::var_os("DEBUG").is_some();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&cli.log_level, debug)))
        .init();

    let options = IndexOptions {
        from: cli.from_sha,
        to: cli.to_sha,
        blob_type: cli.blob_type,
        skip_commits: cli.skip_commits,
    };

    if let Err(e) = cmd_index(ProjectId(cli.project_id), cli.repo_path, options) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
