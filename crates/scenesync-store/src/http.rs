//! HTTP blob fetcher.
//!
//! Hosted providers hand out plain `https://` URLs from `get_file_url`;
//! [`HttpFetcher`] downloads them with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use crate::error::{Result, StoreError};
use crate::traits::{BlobFetcher, FetchResponse};

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpFetcherConfig {
    /// Per-request timeout in milliseconds. `None` waits indefinitely.
    pub timeout_ms: Option<u64>,
}

/// [`BlobFetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &HttpFetcherConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        trace!(url, status, len = body.len(), "fetched blob");
        Ok(FetchResponse { status, body })
    }
}
