//! Error types for tubedl
//!
//! Every failure from ID resolution through selection is fatal to a job and
//! surfaces as one of these variants. Transcode failures are reported but
//! never turn a finished download into an error.

use strsim::{damerau_levenshtein, jaro_winkler};
use thiserror::Error;

/// Quality tier names accepted on input, best first
const TIER_NAMES: [&str; 3] = ["high", "medium", "low"];

/// Main error type for tubedl operations
#[derive(Debug, Error)]
pub enum Error {
    /// The extracted ID still contains URL syntax
    #[error("Invalid characters in video id '{0}'")]
    InvalidIdFormat(String),

    /// The extracted ID is shorter than any valid ID
    #[error("Video id '{0}' must be at least 10 characters long")]
    IdTooShort(String),

    /// Transport-level failure talking to the metadata endpoint
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The metadata endpoint answered with a non-success status
    #[error("Video info request failed with status {0}")]
    UnexpectedStatus(u16),

    /// The metadata body is not a valid query-string document
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("Status field not found in video info")]
    StatusFieldMissing,

    /// The manifest reports something other than `ok`
    #[error("Server response status is not ok: '{0}'")]
    StatusNotOk(String),

    #[error("No stream map found in video info")]
    NoStreamsFound,

    #[error("No downloadable variants left to choose from")]
    EmptyVariantList,

    /// Media transfer failed (transport or filesystem)
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// The external transcoder could not produce the audio file
    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    /// Invalid parameters supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

/// Convenience result type for tubedl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Suggest the quality tier a mistyped input most likely meant
///
/// Returns `None` for exact (case-insensitive) matches and for inputs that are
/// not close to any tier.
pub fn suggest_tier(input: &str) -> Option<&'static str> {
    let input_lower = input.trim().to_lowercase();
    if TIER_NAMES.contains(&input_lower.as_str()) {
        return None;
    }

    // Aliases people reach for out of habit
    match input_lower.as_str() {
        "best" | "hi" | "max" => return Some("high"),
        "worst" | "lo" | "min" => return Some("low"),
        "mid" | "med" | "normal" => return Some("medium"),
        _ => {}
    }

    let min_threshold = 0.75;
    TIER_NAMES
        .iter()
        .map(|name| (*name, jaro_winkler(&input_lower, name)))
        .filter(|(_, score)| *score >= min_threshold)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
        // Short inputs with swapped letters score too low on jaro-winkler
        .or_else(|| {
            TIER_NAMES
                .iter()
                .copied()
                .find(|name| damerau_levenshtein(&input_lower, name) == 1)
        })
}
