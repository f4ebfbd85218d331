//! Index command implementation

use anyhow::{Context, Result};
use indexer_core::ProjectId;
use indexer_elastic::{BulkProcessor, ElasticClient, ElasticConfig};
use indexer_sync::{Git2Source, IndexOptions, Indexer};
use std::path::PathBuf;
use std::sync::Arc;

/// Indexes one revision range of the repository at `repo_path`
pub fn cmd_index(project: ProjectId, repo_path: PathBuf, options: IndexOptions) -> Result<()> {
    log::info!("Starting indexing of repository at {:?}", repo_path);

    let source = Git2Source::open(&repo_path)?;

    let config = ElasticConfig::from_env().context("Failed to load search engine configuration")?;
    let client = Arc::new(ElasticClient::new(&config).context("Failed to create search engine client")?);
    let processor = BulkProcessor::from_config(&config, client)?;

    log::debug!(
        "Index: {}, project: {}, blob_type: {}, skip_commits: {}",
        processor.index_name(),
        project,
        options.blob_type,
        options.skip_commits
    );

    let mut indexer = Indexer::new(&source, &processor, project);
    // Final stats are already logged by the indexer
    indexer.run(&options)?;

    Ok(())
}
