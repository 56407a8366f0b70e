//! Traits for the upstream client, artifact fetcher, artifact store and poller.

use crate::{GenerateVideoRequest, JobId, OperationStatus, PollOutcome};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Client for the upstream long-running-operation resource.
#[async_trait]
pub trait OperationClient: Send + Sync {
    /// Read the operation once and report whether a video URI is available.
    async fn check_status(&self, operation_name: &str) -> Result<OperationStatus, OperationError>;

    /// Start a generation job; returns the operation name used as job id.
    async fn start_generation(&self, req: &GenerateVideoRequest) -> Result<JobId, OperationError>;
}

/// Downloads artifact bytes from an upstream URI.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Bytes, RemoteError>;
}

/// Filename-keyed artifact cache.
///
/// Contract: `exists` returns `Ok(false)` for a missing file and only errors on real I/O
/// failures. `write` never replaces an artifact that is already present.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn exists(&self, filename: &str) -> Result<bool, StorageError>;

    async fn write(&self, filename: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// One poll of a video job: status check plus download-and-cache on completion.
#[async_trait]
pub trait JobPoller: Send + Sync {
    async fn poll(&self, job_id: &str) -> Result<PollOutcome, PollError>;

    async fn start(&self, req: &GenerateVideoRequest) -> Result<JobId, PollError>;
}

#[async_trait]
impl<T: OperationClient + ?Sized> OperationClient for Arc<T> {
    async fn check_status(&self, operation_name: &str) -> Result<OperationStatus, OperationError> {
        (**self).check_status(operation_name).await
    }

    async fn start_generation(&self, req: &GenerateVideoRequest) -> Result<JobId, OperationError> {
        (**self).start_generation(req).await
    }
}

#[async_trait]
impl<T: ArtifactFetcher + ?Sized> ArtifactFetcher for Arc<T> {
    async fn fetch(&self, uri: &str) -> Result<Bytes, RemoteError> {
        (**self).fetch(uri).await
    }
}

#[async_trait]
impl<T: ArtifactStore + ?Sized> ArtifactStore for Arc<T> {
    async fn exists(&self, filename: &str) -> Result<bool, StorageError> {
        (**self).exists(filename).await
    }

    async fn write(&self, filename: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write(filename, bytes).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Transport-level failure talking to upstream.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream request timed out: {0}")]
    Timeout(String),
    #[error("upstream transport error: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// Upstream answered but the payload does not have the expected shape.
    #[error("unexpected upstream payload: {0}")]
    DataShape(String),
    /// Operation completed with an error object instead of a response.
    #[error("upstream operation failed ({code}): {message}")]
    Failed { code: i64, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid artifact name: {0}")]
    InvalidName(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetch or write failure while caching an artifact. Never reaches callers of `poll`.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("fetch: {0}")]
    Fetch(#[from] RemoteError),
    #[error("write: {0}")]
    Write(#[from] StorageError),
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("invalid job id: {0}")]
    InvalidJobId(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}
