//! Gemini long-running-operation client, video URI extraction and artifact fetcher.

mod download;
mod extract;
mod gemini;
mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use archviz_types::{ArtifactFetcher, OperationClient, OperationError, RemoteError};
pub use download::HttpArtifactFetcher;
pub use extract::{extract_video_uri, find_first_string, operation_status};
pub use gemini::{GeminiOperationClient, API_KEY_HEADER, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[cfg(feature = "test-util")]
pub use mock::{CountingFetcher, MockOperationClient};
