//! Video job poller: one status check per poll, download-and-cache on first completion.

mod poller;
mod single_flight;

pub use archviz_types::{JobPoller, PollError, PollOutcome};
pub use poller::{validate_job_id, VideoJobPoller, DEFAULT_ARTIFACT_MOUNT};
pub use single_flight::{FlightGuard, SingleFlight};
