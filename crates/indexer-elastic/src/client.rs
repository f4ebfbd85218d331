//! HTTP client for the search engine

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bulk::{BulkBatch, BulkTransport};
use crate::config::ElasticConfig;
use crate::response::BulkResponse;

/// Join-field mapping for blobs, wiki blobs and commits of a project
pub const INDEX_MAPPING: &str = include_str!("mapping.json");

/// Thin blocking client over the search engine's REST API
pub struct ElasticClient {
    http: Client,
    urls: Vec<Url>,
    index_name: String,
    next_url: AtomicUsize,
}

impl ElasticClient {
    pub fn new(config: &ElasticConfig) -> Result<Self> {
        config.validate()?;

        let urls = config
            .url
            .iter()
            .map(|u| Url::parse(u).with_context(|| format!("Invalid search engine URL: {}", u)))
            .collect::<Result<Vec<_>>>()?;

        let http = Client::builder().build().context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            urls,
            index_name: config.index_name.clone(),
            next_url: AtomicUsize::new(0),
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Builds `<node>/<segments...>`, spreading requests over the configured nodes
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let idx = self.next_url.fetch_add(1, Ordering::Relaxed) % self.urls.len();
        let mut url = self.urls[idx].clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Search engine URL cannot be a base: {}", self.urls[idx]))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetches a document's source by id; `None` when it does not exist
    pub fn get(&self, id: &str, routing: &str) -> Result<Option<Value>> {
        let mut url = self.endpoint(&[self.index_name.as_str(), "_doc", id])?;
        url.query_pairs_mut().append_pair("routing", routing);

        let response = self.http.get(url).send().with_context(|| format!("Failed to get document {}", id))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: Value = response
            .error_for_status()
            .with_context(|| format!("Failed to get document {}", id))?
            .json()
            .context("Invalid get response")?;

        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }
        Ok(body.get("_source").cloned())
    }

    /// Creates the index with the bundled mapping
    pub fn create_index(&self) -> Result<()> {
        let mapping: Value = serde_json::from_str(INDEX_MAPPING).context("Invalid bundled index mapping")?;
        self.create_index_with(&mapping)
    }

    pub fn create_index_with(&self, mapping: &Value) -> Result<()> {
        let url = self.endpoint(&[self.index_name.as_str()])?;
        let response = self
            .http
            .put(url)
            .json(mapping)
            .send()
            .with_context(|| format!("Failed to create index {}", self.index_name))?;
        Self::expect_acknowledged(response, "create index")
    }

    pub fn delete_index(&self) -> Result<()> {
        let url = self.endpoint(&[self.index_name.as_str()])?;
        let response = self
            .http
            .delete(url)
            .send()
            .with_context(|| format!("Failed to delete index {}", self.index_name))?;
        Self::expect_acknowledged(response, "delete index")
    }

    /// Makes recent writes visible to search and get
    pub fn refresh(&self) -> Result<()> {
        let url = self.endpoint(&[self.index_name.as_str(), "_refresh"])?;
        self.http
            .post(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to refresh index {}", self.index_name))?;
        Ok(())
    }

    fn expect_acknowledged(response: reqwest::blocking::Response, action: &str) -> Result<()> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            anyhow::bail!("{} returned HTTP {}: {}", action, status, text);
        }

        let body: Value = response.json().with_context(|| format!("Invalid {} response", action))?;
        if body.get("acknowledged").and_then(Value::as_bool) != Some(true) {
            anyhow::bail!("{} was not acknowledged (timeout)", action);
        }
        Ok(())
    }
}

impl BulkTransport for ElasticClient {
    fn execute(&self, batch: &BulkBatch) -> Result<BulkResponse> {
        let url = self.endpoint(&["_bulk"])?;

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(batch.body())
            .send()
            .context("Bulk request failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            anyhow::bail!("Bulk request returned HTTP {}: {}", status, text);
        }

        response.json::<BulkResponse>().context("Invalid bulk response")
    }
}
