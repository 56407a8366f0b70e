//! Test doubles: scripted operation client and a download-counting fetcher. No network.

use crate::extract::operation_status;
use archviz_types::{
    ArtifactFetcher, GenerateVideoRequest, JobId, OperationClient, OperationError,
    OperationStatus, RemoteError,
};
use bytes::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Body(Value),
    Status(u16, String),
}

/// Operation client that answers from scripted operation bodies.
///
/// Bodies go through the same extraction as the real client, so tests exercise
/// the schema handling end to end. Unknown operations answer 404.
#[derive(Default)]
pub struct MockOperationClient {
    replies: Mutex<HashMap<String, Reply>>,
    checks: AtomicUsize,
    started: AtomicUsize,
}

impl MockOperationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the body returned for `operation_name` from now on.
    pub fn set_body(&self, operation_name: &str, body: Value) {
        self.lock().insert(operation_name.to_string(), Reply::Body(body));
    }

    /// Script a non-2xx answer for `operation_name`.
    pub fn set_status(&self, operation_name: &str, status: u16, body: &str) {
        self.lock()
            .insert(operation_name.to_string(), Reply::Status(status, body.to_string()));
    }

    /// Mark `operation_name` done with a video at `uri` (current schema).
    pub fn complete(&self, operation_name: &str, uri: &str) {
        self.set_body(
            operation_name,
            json!({
                "name": operation_name,
                "done": true,
                "response": { "generatedVideos": [ { "video": { "uri": uri } } ] }
            }),
        );
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Reply>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl OperationClient for MockOperationClient {
    async fn check_status(&self, operation_name: &str) -> Result<OperationStatus, OperationError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        match self.lock().get(operation_name) {
            Some(Reply::Body(body)) => operation_status(body),
            Some(Reply::Status(status, body)) => Err(RemoteError::Status {
                status: *status,
                body: body.clone(),
            }
            .into()),
            None => Err(RemoteError::Status {
                status: 404,
                body: "operation not found".to_string(),
            }
            .into()),
        }
    }

    async fn start_generation(&self, _req: &GenerateVideoRequest) -> Result<JobId, OperationError> {
        let n = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("models/mock/operations/{}", n);
        self.set_body(&name, json!({ "name": name, "done": false }));
        Ok(name)
    }
}

/// Fetcher that returns fixed bytes and counts calls.
pub struct CountingFetcher {
    bytes: Bytes,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingFetcher {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for CountingFetcher {
    async fn fetch(&self, _uri: &str) -> Result<Bytes, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("simulated download failure".to_string()));
        }
        Ok(self.bytes.clone())
    }
}
