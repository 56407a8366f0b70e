//! Authenticated artifact download.

use crate::gemini::API_KEY_HEADER;
use crate::http::transport_error;
use archviz_types::{ArtifactFetcher, RemoteError};
use bytes::Bytes;
use std::time::Duration;

const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Fetches generated videos. Upstream URIs need the API key, which browsers don't have.
pub struct HttpArtifactFetcher {
    client: reqwest::Client,
    api_key: String,
    timeout: Duration,
}

impl HttpArtifactFetcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            // reqwest follows up to 10 redirects by default; file URIs redirect to storage.
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, uri: &str) -> Result<Bytes, RemoteError> {
        let res = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = res.bytes().await.map_err(transport_error)?;
        tracing::debug!(size_bytes = bytes.len(), "artifact fetched");
        Ok(bytes)
    }
}
