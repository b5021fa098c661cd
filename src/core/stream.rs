//! Streaming types and transfer options for tubedl

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, ReadBuf};

/// Media body of an HTTP response as an `AsyncRead`
pub struct MediaStream(Box<dyn AsyncRead + Send + Unpin>);

impl AsyncRead for MediaStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

/// Progress callback function type: `(downloaded, total)` bytes, `total` is 0 when unknown
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Overwrite behavior for existing files
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OverwriteBehavior {
    /// Replace the file without asking (default)
    #[default]
    Force,
    /// Never overwrite, fail if file exists
    NeverOverwrite,
    /// Ask on stderr before replacing
    Prompt,
}

/// Options for the media transfer
#[derive(Clone)]
pub struct DownloadOptions {
    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Buffer size for streaming to disk
    pub buffer_size: usize,

    /// Behavior when destination file already exists
    pub overwrite: OverwriteBehavior,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            progress: None,
            buffer_size: 64 * 1024, // 64KB
            overwrite: OverwriteBehavior::default(),
        }
    }
}

impl std::fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("progress", &self.progress.is_some())
            .field("buffer_size", &self.buffer_size)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

/// Creates a MediaStream from an HTTP response
pub fn create_http_stream(response: reqwest::Response) -> MediaStream {
    let stream = tokio_util::io::StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other),
    );
    MediaStream(Box::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DownloadOptions::default();
        assert!(options.progress.is_none());
        assert_eq!(options.buffer_size, 64 * 1024);
        assert_eq!(options.overwrite, OverwriteBehavior::Force);
    }

    #[test]
    fn test_options_debug_hides_callback() {
        let options = DownloadOptions {
            progress: Some(Arc::new(|_, _| {})),
            ..Default::default()
        };
        let rendered = format!("{options:?}");
        assert!(rendered.contains("progress: true"));
    }
}
