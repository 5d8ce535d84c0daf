//! Upstream dataset sources.
//!
//! A [`CatalogSource`] fetches the complete exercise dataset in one call.
//! The [`CatalogStore`](crate::store::CatalogStore) decides when to call it;
//! sources hold no cache of their own.
//!
//! | Source | Backing |
//! |--------|---------|
//! | [`HttpSource`] | JSON array served at a URL |
//! | [`FileSource`] | JSON array in a local file |

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SourceConfig;
use crate::models::Exercise;

/// Something that can produce the whole catalog.
///
/// Implementations should treat any transport failure, unexpected status,
/// or undecodable payload as an error. The store applies its own timeout
/// around [`fetch`](CatalogSource::fetch).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short label used in logs (e.g. the URL or file path).
    fn describe(&self) -> String;

    /// Fetch and decode the full dataset.
    async fn fetch(&self) -> Result<Vec<Exercise>>;
}

/// Fetches the dataset over HTTP.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<Exercise>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?;

        // Only a plain 200 carries the dataset; 204 and friends are failures.
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            bail!("upstream {} returned {}", self.url, status);
        }

        let body = response.bytes().await?;
        let exercises: Vec<Exercise> = serde_json::from_slice(&body)
            .with_context(|| format!("malformed catalog JSON from {}", self.url))?;
        Ok(exercises)
    }
}

/// Reads the dataset from a local JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<Exercise>> {
        let content = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog file: {}", self.path.display()))?;
        let exercises: Vec<Exercise> = serde_json::from_slice(&content)
            .with_context(|| format!("malformed catalog JSON in {}", self.path.display()))?;
        Ok(exercises)
    }
}

/// Builds the source described by `[source]`: a file when `path` is set,
/// otherwise HTTP.
pub fn create_source(config: &SourceConfig) -> Result<Arc<dyn CatalogSource>> {
    match &config.path {
        Some(path) => Ok(Arc::new(FileSource::new(path.clone()))),
        None => Ok(Arc::new(HttpSource::new(
            config.url.clone(),
            config.timeout(),
        )?)),
    }
}
