//! Endpoint configuration and output naming for tubedl
//!
//! Knows where manifests come from and how a selected variant turns into a
//! file name on disk.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::core::error::{Error, Result};
use crate::core::resolver::ResourceId;

/// Extension used when the variant type names no container
pub const DEFAULT_EXTENSION: &str = "mp4";

/// Extension of the extracted audio file
pub const AUDIO_EXTENSION: &str = "mp3";

static VIDEO_TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"video/(\w+);").expect("type pattern must compile"));

/// Configuration for the metadata endpoint
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Scheme and host serving `get_video_info`
    pub info_base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            info_base_url: "http://youtube.com".to_string(),
        }
    }
}

impl EndpointConfig {
    /// Metadata URL for a resource, with the ID form-encoded
    pub fn info_url(&self, id: &ResourceId) -> Result<Url> {
        let endpoint = format!("{}/get_video_info", self.info_base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, [("video_id", id.as_str())]).map_err(|e| {
            Error::InvalidInput(format!("Invalid info endpoint '{}': {e}", self.info_base_url))
        })
    }
}

/// Container extension named by a variant's `type` attribute
pub fn find_extension(mime_type: &str) -> &str {
    VIDEO_TYPE_PATTERN
        .captures(mime_type)
        .and_then(|captures| captures.get(1))
        .map_or(DEFAULT_EXTENSION, |m| m.as_str())
}

/// Replace characters that cannot appear in a file name
fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Output file name for a video, falling back to the ID for blank titles
pub fn output_filename(title: Option<&str>, id: &ResourceId, extension: &str) -> String {
    let stem = title.map(sanitize_title).unwrap_or_default();
    let stem = if stem.is_empty() { id.to_string() } else { stem };
    format!("{stem}.{extension}")
}

/// Path of the audio file extracted from `video_path`
pub fn audio_path(video_path: &Path) -> PathBuf {
    video_path.with_extension(AUDIO_EXTENSION)
}
