//! # tubedl Library
//!
//! Resolves a loosely-formed video reference to its resource ID, decodes the
//! variant manifest, picks a variant by quality tier and streams it to disk,
//! optionally extracting an mp3 afterwards.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use tubedl::QualityTier;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Best variant into the current directory
//!     let report = tubedl::get("https://youtu.be/dQw4w9WgXcQ", QualityTier::High, ".", false).await?;
//!     println!("Saved {}", report.video_path.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Progress Tracking
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubedl::{DownloadOptions, JobOptions, QualityTier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = JobOptions {
//!         tier: QualityTier::Medium,
//!         download: DownloadOptions {
//!             progress: Some(Arc::new(|downloaded, total| {
//!                 println!("Progress: {}/{} bytes", downloaded, total);
//!             })),
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     };
//!     tubedl::get_with_options("dQw4w9WgXcQ", &options).await?;
//!
//!     Ok(())
//! }
//! ```

use std::path::Path;

// Re-export core types that users might need
pub use crate::core::error::{Error, Result};
pub use crate::core::manifest::{decode as decode_manifest, StreamRecord};
pub use crate::core::query::{encode_query, parse_query, QueryDocument, QueryError};
pub use crate::core::resolver::{resolve, ResourceId};
pub use crate::core::selector::{order_by_quality, select, QualityTier};
pub use crate::core::stream::{DownloadOptions, OverwriteBehavior, ProgressCallback};
pub use crate::core::transcode::{FfmpegTranscoder, Transcoder};

// Internal modules
mod core;

/// Download a video with default transfer options
///
/// # Arguments
/// * `reference` - Bare ID or any watch, short or embed URL
/// * `tier` - Quality preference
/// * `destination_dir` - Directory the file is written to
/// * `extract_audio` - Also produce an mp3 next to the video
pub async fn get(
    reference: &str,
    tier: QualityTier,
    destination_dir: impl AsRef<Path>,
    extract_audio: bool,
) -> Result<DownloadReport> {
    let options = JobOptions {
        tier,
        destination_dir: destination_dir.as_ref().to_path_buf(),
        extract_audio,
        ..Default::default()
    };
    get_with_options(reference, &options).await
}

/// Download a video with custom job options
pub async fn get_with_options(reference: &str, options: &JobOptions) -> Result<DownloadReport> {
    Downloader::new().run(reference, options).await
}

/// List the decoded variants of a video, best first
pub async fn list_variants(reference: &str) -> Result<(ResourceId, Vec<StreamRecord>)> {
    Downloader::new().variants(reference).await
}

/// Advanced API: downloader with a custom endpoint or transcoder
///
/// # Examples
/// ```rust,no_run
/// use tubedl::{Downloader, EndpointConfig};
///
/// let config = EndpointConfig {
///     info_base_url: "http://my-mirror.example".to_string(),
/// };
/// let downloader = Downloader::with_config(config);
/// ```
pub use crate::core::{DownloadJob, DownloadReport, Downloader, EndpointConfig, JobOptions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_job_options() {
        let options = JobOptions::default();
        assert_eq!(options.tier, QualityTier::High);
        assert!(!options.extract_audio);
        assert_eq!(options.download.overwrite, OverwriteBehavior::Force);
    }

    #[tokio::test]
    async fn test_get_rejects_short_reference() {
        let dir = tempfile::tempdir().unwrap();
        let result = get("short", QualityTier::High, dir.path(), false).await;
        assert!(matches!(result, Err(Error::IdTooShort(_))));
    }
}
