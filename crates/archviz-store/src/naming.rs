//! Job id -> artifact filename.

use sha2::{Digest, Sha256};

/// Extension appended to every artifact filename.
pub const ARTIFACT_EXTENSION: &str = "mp4";

/// Number of hex characters of the digest kept in the filename.
pub const NAME_HEX_LEN: usize = 16;

/// Filename for a job's artifact: first 16 hex chars of SHA-256(job id) plus `.mp4`.
///
/// Pure function of the id bytes, so it is stable across restarts and free of
/// characters that are unsafe in paths.
pub fn artifact_filename(job_id: &str) -> String {
    let digest = Sha256::digest(job_id.as_bytes());
    let hex = hex::encode(digest);
    format!("{}.{}", &hex[..NAME_HEX_LEN], ARTIFACT_EXTENSION)
}
