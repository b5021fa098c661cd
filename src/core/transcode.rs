//! Audio extraction through an external transcoder
//!
//! The orchestrator only sees the [`Transcoder`] trait, so jobs can run with
//! a fake in tests and with ffmpeg everywhere else.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::core::error::{Error, Result};
use crate::core::source::audio_path;

/// Produces an audio-only file from a downloaded video
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Name of the transcoder (for logging)
    fn name(&self) -> &'static str;

    /// Extract the audio track of `source`, returning the path written
    async fn extract_audio(&self, source: &Path) -> Result<PathBuf>;
}

/// Transcoder backed by the `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegTranscoder {
    /// Use `ffmpeg` from `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Use a specific ffmpeg binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for an overwrite, quiet, audio-only conversion
    fn arguments(source: &Path, target: &Path) -> Vec<std::ffi::OsString> {
        vec![
            "-y".into(),
            "-loglevel".into(),
            "quiet".into(),
            "-i".into(),
            source.as_os_str().to_owned(),
            "-vn".into(),
            target.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn extract_audio(&self, source: &Path) -> Result<PathBuf> {
        let target = audio_path(source);
        debug!("Running {} on {}", self.program.display(), source.display());

        let status = Command::new(&self.program)
            .args(Self::arguments(source, &target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::TranscodeFailed(format!(
                    "{} not found in PATH",
                    self.program.display()
                )),
                _ => Error::TranscodeFailed(e.to_string()),
            })?;

        if !status.success() {
            return Err(Error::TranscodeFailed(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }

        info!("Mp3 extracted: {}", target.display());
        Ok(target)
    }
}
