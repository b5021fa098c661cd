//! # tubedl CLI
//!
//! Command-line interface for the tubedl library.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, LevelFilter};
use tubedl::{
    DownloadOptions, Downloader, EndpointConfig, Error, JobOptions, OverwriteBehavior,
    QualityTier, Result,
};

mod cli;

/// Command-line interface for tubedl
#[derive(Parser)]
#[command(name = "tubedl")]
#[command(about = "Download a hosted video in the quality you ask for")]
#[command(long_about = "Downloads one video variant chosen by quality tier:
  tubedl dQw4w9WgXcQ                          # Best variant into the current directory
  tubedl https://youtu.be/dQw4w9WgXcQ -q low  # Smallest variant
  tubedl <URL> -d ~/Videos --mp3 yes          # Also extract an mp3 (needs ffmpeg)
  tubedl <URL> --list                         # Print the variants as JSON lines

File Overwrite Behavior:
  By default an existing file is replaced
  --no-clobber                                # Never overwrite, fail if file exists
  --prompt                                    # Ask before overwriting")]
#[command(version = env!("TUBEDL_VERSION"))]
struct Cli {
    /// Video ID or any watch, short or embed URL
    reference: String,

    /// Quality: low|medium|high
    #[arg(short, long, default_value = "high")]
    quality: QualityTier,

    /// Download directory (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Extract Mp3: yes|no
    #[arg(long, default_value = "no", action = clap::ArgAction::Set, value_parser = parse_yes_no)]
    mp3: bool,

    /// Show what would be downloaded without downloading
    #[arg(long)]
    dry_run: bool,

    /// List the available variants and exit
    #[arg(long)]
    list: bool,

    /// Never overwrite existing files (fail if destination exists)
    #[arg(long)]
    no_clobber: bool,

    /// Ask before overwriting an existing file
    #[arg(long)]
    prompt: bool,

    /// Metadata endpoint base URL
    #[arg(long, hide = true)]
    info_endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Parse the `yes|no` style flags
fn parse_yes_no(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{other}'")),
    }
}

/// Overwrite behavior selected by the CLI flags
fn overwrite_behavior(cli: &Cli) -> OverwriteBehavior {
    if cli.no_clobber {
        OverwriteBehavior::NeverOverwrite
    } else if cli.prompt {
        OverwriteBehavior::Prompt
    } else {
        OverwriteBehavior::Force
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr; RUST_LOG wins over the defaults
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🎬 tubedl v{} starting...", env!("TUBEDL_VERSION"));
    }

    if cli.no_clobber && cli.prompt {
        return Err(Error::InvalidInput(
            "--no-clobber and --prompt cannot be used together".to_string(),
        ));
    }

    let config = match &cli.info_endpoint {
        Some(base) => EndpointConfig {
            info_base_url: base.clone(),
        },
        None => EndpointConfig::default(),
    };
    let downloader = Downloader::with_config(config);

    if cli.list {
        return list_variants(&downloader, &cli.reference).await;
    }

    let destination_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| {
            Error::InvalidInput(format!("Download directory not found: {e}"))
        })?,
    };

    if cli.dry_run {
        let job = downloader
            .plan(&cli.reference, cli.quality, &destination_dir)
            .await?;
        eprintln!(
            "🔍 [DRY RUN] Would download video {} ({} quality) to {}",
            job.id,
            cli.quality,
            job.output_path().display()
        );
        eprintln!("🌐 Source: {}", job.source_url);
        return Ok(());
    }

    let progress_manager = cli::ProgressManager::new(0, &format!("🌐 Downloading {}", cli.reference));
    let options = JobOptions {
        tier: cli.quality,
        destination_dir,
        extract_audio: cli.mp3,
        download: DownloadOptions {
            progress: Some(progress_manager.callback()),
            overwrite: overwrite_behavior(&cli),
            ..Default::default()
        },
    };

    let report = downloader.run(&cli.reference, &options).await?;
    progress_manager.finish("✅ Download completed!");

    eprintln!("📁 Saved to: {}", report.video_path.display());
    if let Some(audio) = &report.audio_path {
        eprintln!("🎵 Audio: {}", audio.display());
    }
    if let Some(reason) = &report.transcode_error {
        info!("Video kept, audio extraction skipped: {reason}");
    }

    Ok(())
}

/// Print every variant as one JSON line on stdout
async fn list_variants(downloader: &Downloader, reference: &str) -> Result<()> {
    let (id, variants) = downloader.variants(reference).await?;
    info!("{} variant(s) for {id}", variants.len());

    for variant in &variants {
        let line = serde_json::to_string(variant)
            .map_err(|e| Error::InvalidInput(format!("Cannot encode variant: {e}")))?;
        println!("{line}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("yes"), Ok(true));
        assert_eq!(parse_yes_no("NO"), Ok(false));
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["tubedl", "dQw4w9WgXcQ"]).unwrap();
        assert_eq!(cli.quality, QualityTier::High);
        assert!(!cli.mp3);
        assert!(cli.dir.is_none());
        assert_eq!(overwrite_behavior(&cli), OverwriteBehavior::Force);
    }

    #[test]
    fn test_cli_full_flags() {
        let cli = Cli::try_parse_from([
            "tubedl",
            "https://youtu.be/dQw4w9WgXcQ",
            "--quality",
            "medium",
            "--dir",
            "/tmp/videos",
            "--mp3",
            "yes",
            "--no-clobber",
        ])
        .unwrap();

        assert_eq!(cli.quality, QualityTier::Medium);
        assert!(cli.mp3);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/videos")));
        assert_eq!(overwrite_behavior(&cli), OverwriteBehavior::NeverOverwrite);
    }

    #[test]
    fn test_cli_rejects_unknown_quality() {
        let err = match Cli::try_parse_from(["tubedl", "dQw4w9WgXcQ", "-q", "hgih"]) {
            Err(err) => err,
            Ok(_) => panic!("Expected an unknown quality to be rejected"),
        };
        assert!(err.to_string().contains("Did you mean 'high'?"));
    }
}
