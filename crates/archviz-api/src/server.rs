//! Axum server and routes.

use crate::config::AppConfig;
use crate::error::ApiError;
use archviz_poller::{VideoJobPoller, DEFAULT_ARTIFACT_MOUNT};
use archviz_remote::{GeminiOperationClient, HttpArtifactFetcher};
use archviz_store::FsArtifactStore;
use archviz_types::{GenerateVideoRequest, JobPoller, JobState, JobStatusResponse, StorageError};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub poller: Arc<dyn JobPoller>,
    /// Directory served under the artifact mount.
    pub artifact_root: PathBuf,
}

impl AppState {
    /// Wire the Gemini client, fetcher and filesystem store from config.
    /// Creates the output directory.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        let client = GeminiOperationClient::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.model.clone(),
        )
        .with_timeout(config.status_timeout);
        let fetcher =
            HttpArtifactFetcher::new(config.api_key.clone()).with_timeout(config.download_timeout);
        let store = FsArtifactStore::new(&config.output_dir).await?;
        let artifact_root = store.root().to_path_buf();
        let poller = VideoJobPoller::new(client, fetcher, store).with_mount(DEFAULT_ARTIFACT_MOUNT);
        Ok(Self {
            poller: Arc::new(poller),
            artifact_root,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/jobs", post(handle_start))
        .route("/jobs/*job_id", get(handle_poll))
        .route("/health", get(handle_health))
        .nest_service(DEFAULT_ARTIFACT_MOUNT, ServeDir::new(&state.artifact_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateVideoRequest>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job_id = state.poller.start(&req).await?;
    tracing::info!(job_id = %job_id, "video job started");
    Ok(Json(JobStatusResponse {
        job_id,
        status: JobState::Running,
        video_url: None,
    }))
}

/// The poll runs on its own task so a client disconnect does not abort a
/// download that is already in flight; the next poll finds it cached.
async fn handle_poll(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let poller = Arc::clone(&state.poller);
    let id = job_id.clone();
    let outcome = tokio::spawn(async move { poller.poll(&id).await })
        .await
        .map_err(|e| ApiError::internal(format!("poll task failed: {}", e)))??;
    tracing::info!(job_id = %job_id, status = ?outcome.state(), "job polled");
    Ok(Json(outcome.into_response(job_id)))
}

async fn handle_health() -> &'static str {
    "ok"
}
