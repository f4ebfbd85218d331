//! Search engine connection settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Environment variable holding the JSON connection info
pub const CONNECTION_INFO_VAR: &str = "ELASTIC_CONNECTION_INFO";

/// 10 MiB keeps small hosted clusters happy at the cost of extra round trips on bigger ones
pub const DEFAULT_MAX_BULK_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_BULK_WORKERS: usize = 10;

const DEFAULT_INDEX_NAME: &str = "gitlab";

/// Connection info, as found in `ELASTIC_CONNECTION_INFO`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticConfig {
    #[serde(default)]
    pub index_name: String,

    /// Base URLs of the cluster nodes
    #[serde(default)]
    pub url: Vec<String>,

    /// Byte threshold at which a batch is dispatched
    #[serde(default, rename = "max_bulk_size_bytes")]
    pub max_bulk_size: usize,

    /// Number of bulk workers
    #[serde(default, rename = "max_bulk_concurrency")]
    pub bulk_workers: usize,
}

impl ElasticConfig {
    /// Parses the JSON connection info, filling in bulk defaults
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut config: ElasticConfig = serde_json::from_reader(reader).context("Invalid connection info JSON")?;

        if config.max_bulk_size == 0 {
            config.max_bulk_size = DEFAULT_MAX_BULK_SIZE;
        }
        if config.bulk_workers == 0 {
            config.bulk_workers = DEFAULT_BULK_WORKERS;
        }

        Ok(config)
    }

    /// Reads `ELASTIC_CONNECTION_INFO`, naming the index after `RAILS_ENV` when none is given
    pub fn from_env() -> Result<Self> {
        let data = std::env::var(CONNECTION_INFO_VAR).with_context(|| format!("{} is not set", CONNECTION_INFO_VAR))?;

        let mut config = Self::from_reader(data.as_bytes())
            .with_context(|| format!("Couldn't parse {}", CONNECTION_INFO_VAR))?;
        config.apply_default_index_name(std::env::var("RAILS_ENV").ok().as_deref());
        config.validate()?;

        Ok(config)
    }

    /// Sets the index name to "gitlab" or "gitlab-<env>" when it is empty
    pub fn apply_default_index_name(&mut self, rails_env: Option<&str>) {
        if !self.index_name.is_empty() {
            return;
        }

        self.index_name = match rails_env {
            Some(env) if !env.is_empty() => format!("{}-{}", DEFAULT_INDEX_NAME, env),
            _ => DEFAULT_INDEX_NAME.to_string(),
        };
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("No search engine URL configured");
        }
        if self.index_name.is_empty() {
            anyhow::bail!("No index name configured");
        }
        Ok(())
    }
}
