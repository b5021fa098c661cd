//! Download orchestration for tubedl
//!
//! Sequences one job: resolve the reference, fetch and decode the manifest,
//! select a variant, stream it to disk and optionally extract its audio.
//! Every step is awaited in order; nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::core::error::{Error, Result};
use crate::core::manifest::{self, StreamRecord};
use crate::core::resolver::{self, ResourceId};
use crate::core::selector::{self, QualityTier};
use crate::core::source::{self, EndpointConfig};
use crate::core::stream::{create_http_stream, DownloadOptions, MediaStream, OverwriteBehavior};
use crate::core::transcode::{FfmpegTranscoder, Transcoder};

/// Global HTTP client
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(format!("tubedl/{}", env!("TUBEDL_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

/// Options for one download job
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Quality preference over the decoded variants
    pub tier: QualityTier,

    /// Directory the video (and audio) file is written to
    pub destination_dir: PathBuf,

    /// Extract an mp3 after the video is on disk
    pub extract_audio: bool,

    /// Transfer options (progress, overwrite, buffer)
    pub download: DownloadOptions,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            tier: QualityTier::default(),
            destination_dir: PathBuf::from("."),
            extract_audio: false,
            download: DownloadOptions::default(),
        }
    }
}

/// A resolved job: what gets fetched and where it lands
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: ResourceId,
    pub record: StreamRecord,
    pub source_url: String,
    pub file_name: String,
    pub destination_dir: PathBuf,
}

impl DownloadJob {
    pub fn output_path(&self) -> PathBuf {
        self.destination_dir.join(&self.file_name)
    }
}

/// Outcome of a finished job
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub id: ResourceId,
    pub record: StreamRecord,
    pub video_path: PathBuf,
    /// Set when audio extraction was requested and succeeded
    pub audio_path: Option<PathBuf>,
    /// Set when audio extraction was requested and failed
    pub transcode_error: Option<String>,
}

/// Check if destination file exists and handle overwrite behavior
fn check_overwrite_permission(file_path: &Path, behavior: &OverwriteBehavior) -> Result<()> {
    if !file_path.exists() {
        return Ok(());
    }

    let display = file_path.display();
    match behavior {
        OverwriteBehavior::Force => {
            warn!("Overwriting existing file: {display}");
            Ok(())
        }
        OverwriteBehavior::NeverOverwrite => Err(Error::DownloadFailed(format!(
            "File already exists: {display} (drop --no-clobber to overwrite)"
        ))),
        OverwriteBehavior::Prompt => {
            eprintln!("⚠️  File already exists: {display}");
            eprint!("Overwrite? [y/N]: ");

            use std::io::Write;
            std::io::stderr()
                .flush()
                .map_err(|e| Error::DownloadFailed(e.to_string()))?;

            let mut input = String::new();
            std::io::stdin()
                .read_line(&mut input)
                .map_err(|e| Error::DownloadFailed(e.to_string()))?;

            match input.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(Error::DownloadFailed("Download cancelled by user".to_string())),
            }
        }
    }
}

/// Copy the media stream into `writer`, reporting progress
async fn stream_to_writer<W>(
    mut stream: MediaStream,
    writer: &mut W,
    total_size: u64,
    options: &DownloadOptions,
) -> Result<u64>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut downloaded = 0u64;

    loop {
        let bytes_read = stream
            .read(&mut buffer)
            .await
            .map_err(|e| Error::DownloadFailed(format!("Stream read error: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .await
            .map_err(|e| Error::DownloadFailed(format!("Write error: {e}")))?;
        downloaded += bytes_read as u64;

        if let Some(ref progress) = options.progress {
            progress(downloaded, total_size);
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| Error::DownloadFailed(format!("Write error: {e}")))?;
    Ok(downloaded)
}

/// Runs download jobs against one metadata endpoint
pub struct Downloader {
    config: EndpointConfig,
    transcoder: Arc<dyn Transcoder>,
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Downloader {
    /// Create a new downloader with default configuration
    pub fn new() -> Self {
        Self::with_config(EndpointConfig::default())
    }

    /// Create a new downloader with custom configuration
    pub fn with_config(config: EndpointConfig) -> Self {
        Self {
            config,
            transcoder: Arc::new(FfmpegTranscoder::new()),
        }
    }

    /// Replace the transcoder used for audio extraction
    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Fetch the raw manifest body for a resource
    pub async fn fetch_manifest(&self, id: &ResourceId) -> Result<String> {
        let url = self.config.info_url(id)?;
        debug!("Fetching video info: {url}");

        let response = GLOBAL_CLIENT.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Resolve a reference and list its variants, best first
    pub async fn variants(&self, reference: &str) -> Result<(ResourceId, Vec<StreamRecord>)> {
        let id = resolver::resolve(reference)?;
        let body = self.fetch_manifest(&id).await?;
        let variants = selector::order_by_quality(manifest::decode(&body)?);
        Ok((id, variants))
    }

    /// Resolve everything up to the output file, without transferring bytes
    pub async fn plan(
        &self,
        reference: &str,
        tier: QualityTier,
        destination_dir: &Path,
    ) -> Result<DownloadJob> {
        let (id, variants) = self.variants(reference).await?;
        let record = selector::select(&variants, tier)?.clone();

        let source_url = record
            .url()
            .ok_or_else(|| Error::DownloadFailed("Selected variant has no url".to_string()))?
            .to_string();
        let extension = source::find_extension(record.mime_type().unwrap_or_default());
        let file_name = source::output_filename(record.title(), &id, extension);

        Ok(DownloadJob {
            id,
            record,
            source_url,
            file_name,
            destination_dir: destination_dir.to_path_buf(),
        })
    }

    /// Stream `url` into `file_path`, returning the number of bytes written
    pub async fn download_to_file(
        &self,
        url: &str,
        file_path: &Path,
        options: &DownloadOptions,
    ) -> Result<u64> {
        check_overwrite_permission(file_path, &options.overwrite)?;

        let response = GLOBAL_CLIENT
            .get(url)
            .send()
            .await
            .map_err(|e| Error::DownloadFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::DownloadFailed(format!("Media request returned {status}")));
        }
        let total_size = response.content_length().unwrap_or(0);

        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::DownloadFailed(format!("{}: {e}", parent.display())))?;
        }
        let mut file = tokio::fs::File::create(file_path)
            .await
            .map_err(|e| Error::DownloadFailed(format!("{}: {e}", file_path.display())))?;

        stream_to_writer(create_http_stream(response), &mut file, total_size, options).await
    }

    /// Run a complete job for `reference`
    ///
    /// A failed audio extraction is logged and recorded in the report; the
    /// job still succeeds because the video is already on disk.
    pub async fn run(&self, reference: &str, options: &JobOptions) -> Result<DownloadReport> {
        let job = self
            .plan(reference, options.tier, &options.destination_dir)
            .await?;
        let video_path = job.output_path();

        info!("Downloading file: {}", job.file_name);
        let bytes = self
            .download_to_file(&job.source_url, &video_path, &options.download)
            .await?;
        info!("Download completed: {} ({bytes} bytes)", video_path.display());

        let mut report = DownloadReport {
            id: job.id,
            record: job.record,
            video_path,
            audio_path: None,
            transcode_error: None,
        };

        if options.extract_audio {
            debug!("Extracting audio with {}", self.transcoder.name());
            match self.transcoder.extract_audio(&report.video_path).await {
                Ok(path) => report.audio_path = Some(path),
                Err(e) => {
                    warn!("{e}");
                    report.transcode_error = Some(e.to_string());
                }
            }
        }

        Ok(report)
    }
}
