//! VideoJobPoller: status check, then download-and-cache on the first completed poll.

use crate::single_flight::SingleFlight;
use archviz_store::artifact_filename;
use archviz_types::{
    ArtifactFetcher, ArtifactRecord, ArtifactStore, DownloadError, GenerateVideoRequest, JobId,
    JobPoller, OperationClient, OperationStatus, PollError, PollOutcome, StorageError,
};

/// URL prefix under which the artifact store is served.
pub const DEFAULT_ARTIFACT_MOUNT: &str = "/videos";

/// Poller composing an operation client, an artifact fetcher and an artifact store.
///
/// No background work: progress happens only inside `poll`. Downloads for the
/// same job are serialised, so at most one fetch runs per artifact.
pub struct VideoJobPoller<C, F, S> {
    client: C,
    fetcher: F,
    store: S,
    mount: String,
    flights: SingleFlight,
}

impl<C, F, S> VideoJobPoller<C, F, S>
where
    C: OperationClient,
    F: ArtifactFetcher,
    S: ArtifactStore,
{
    pub fn new(client: C, fetcher: F, store: S) -> Self {
        Self {
            client,
            fetcher,
            store,
            mount: DEFAULT_ARTIFACT_MOUNT.to_string(),
            flights: SingleFlight::new(),
        }
    }

    /// Prefix used to build `video_url`, e.g. `/videos`.
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into().trim_end_matches('/').to_string();
        self
    }

    fn video_url(&self, filename: &str) -> String {
        format!("{}/{}", self.mount, filename)
    }

    /// Derived filename for the job and whether the store already has it.
    async fn artifact_record(&self, job_id: &str) -> Result<ArtifactRecord, StorageError> {
        let filename = artifact_filename(job_id);
        let exists = self.store.exists(&filename).await?;
        Ok(ArtifactRecord { filename, exists })
    }

    async fn download(&self, uri: &str, filename: &str) -> Result<(), DownloadError> {
        let bytes = self.fetcher.fetch(uri).await?;
        self.store.write(filename, &bytes).await?;
        Ok(())
    }
}

/// Job ids are interpolated into the upstream URL path unencoded.
pub fn validate_job_id(job_id: &str) -> Result<(), PollError> {
    let bad = job_id.is_empty()
        || job_id.contains("..")
        || job_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '?' || c == '#');
    if bad {
        return Err(PollError::InvalidJobId(job_id.to_string()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl<C, F, S> JobPoller for VideoJobPoller<C, F, S>
where
    C: OperationClient,
    F: ArtifactFetcher,
    S: ArtifactStore,
{
    async fn poll(&self, job_id: &str) -> Result<PollOutcome, PollError> {
        validate_job_id(job_id)?;
        let uri = match self.client.check_status(job_id).await? {
            OperationStatus::Pending => {
                tracing::debug!(job_id, "job still running");
                return Ok(PollOutcome::Running);
            }
            OperationStatus::Done { uri } => uri,
        };

        let _flight = self.flights.acquire(job_id).await;
        let ArtifactRecord { filename, exists } = self.artifact_record(job_id).await?;
        if !exists {
            tracing::info!(job_id, filename = %filename, "job done, caching artifact");
            if let Err(e) = self.download(&uri, &filename).await {
                tracing::warn!(
                    job_id,
                    filename = %filename,
                    error = %e,
                    "artifact download failed, job stays running"
                );
                return Ok(PollOutcome::Running);
            }
        }

        Ok(PollOutcome::Ready {
            video_url: self.video_url(&filename),
            filename,
        })
    }

    async fn start(&self, req: &GenerateVideoRequest) -> Result<JobId, PollError> {
        if req.prompt.trim().is_empty() {
            return Err(PollError::InvalidRequest("prompt is required".to_string()));
        }
        Ok(self.client.start_generation(req).await?)
    }
}
