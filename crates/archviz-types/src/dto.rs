//! Request and response DTOs for the job endpoints, plus poll state types.

use serde::{Deserialize, Serialize};

/// Opaque upstream operation name, e.g. `models/veo-3.0-generate-preview/operations/abc123`.
pub type JobId = String;

/// Result of a single upstream status check. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    Done { uri: String },
}

/// Caller-facing job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Done,
}

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Running,
    /// Artifact bytes are present in the store.
    Ready { filename: String, video_url: String },
}

impl PollOutcome {
    pub fn state(&self) -> JobState {
        match self {
            PollOutcome::Running => JobState::Running,
            PollOutcome::Ready { .. } => JobState::Done,
        }
    }

    pub fn into_response(self, job_id: impl Into<String>) -> JobStatusResponse {
        let state = self.state();
        let video_url = match self {
            PollOutcome::Running => None,
            PollOutcome::Ready { video_url, .. } => Some(video_url),
        };
        JobStatusResponse {
            job_id: job_id.into(),
            status: state,
            video_url,
        }
    }
}

/// Cached artifact for a job: derived filename plus on-disk existence at check time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub filename: String,
    pub exists: bool,
}

/// Body of `GET /jobs/{jobId}` and `POST /jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobState,
    /// Path under the service's artifact mount, present only when `status` is `done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Reference image sent inline with a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub prompt: String,
    #[serde(default)]
    pub image: Option<InlineImage>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub negative_prompt: Option<String>,
}

/// Error envelope returned with a non-2xx HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_body: Option<String>,
}
