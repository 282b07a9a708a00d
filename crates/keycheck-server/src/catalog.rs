use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use http::{header, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::model::LicenseRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog responded with status {0}")]
    Status(StatusCode),
    #[error("catalog is not a list of license records: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the remote license catalog. The catalog is fetched fresh
/// on every call; nothing is cached between requests.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    url: Arc<str>,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("build catalog reqwest client")?;

        Ok(Self {
            client,
            url: Arc::from(url.into()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and decode the full catalog.
    pub async fn fetch(&self) -> Result<Vec<LicenseRecord>, CatalogError> {
        let resp = self
            .client
            .get(&*self.url)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        let body = resp.bytes().await?;
        let records: Vec<LicenseRecord> = serde_json::from_slice(&body)?;
        debug!(count = records.len(), "catalog fetched");
        Ok(records)
    }
}
