//! HTTP access for metadata pages and PDF artifacts.
//!
//! [`Fetcher`] is the seam the extractor and downloader talk to; [`HttpClient`]
//! is the reqwest-backed implementation used by the binary.

use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[async_trait]
pub trait Fetcher {
    /// Fetch a page body as text. Non-success statuses still return the body.
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Stream a resource to `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// reqwest-backed fetcher
pub struct HttpClient {
    client: reqwest::Client,
    page_timeout: Duration,
}

impl HttpClient {
    /// Build a client whose page fetches time out after `page_timeout`.
    /// Downloads have no timeout.
    pub fn new(page_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HarvestError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            page_timeout,
        })
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.page_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = %status, "Non-success status, parsing body anyway");
        }

        Ok(response.text().await?)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = %status, "Saving body of non-success response");
        }

        let mut out = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| HarvestError::Download(format!("{}: {}", url, e)))?;
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        debug!(url, bytes = written, path = ?dest, "Download finished");
        Ok(written)
    }
}
