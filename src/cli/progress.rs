//! CLI-specific progress handling for tubedl
//!
//! Provides the progress bar shown while a variant streams to disk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tubedl::ProgressCallback;

/// Template used once the total size is known
const SIZED_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} ETA: {eta}";

/// Template for bodies without a Content-Length
const UNSIZED_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} {bytes_per_sec}";

/// Creates a progress bar for CLI display
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(SIZED_TEMPLATE)
            .expect("Failed to create progress style")
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager for a single download
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_size: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_size);

        // Print initial message to stderr
        eprintln!("{message}");

        Self { pb }
    }

    /// Callback that drives this bar from library progress reports
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        let switched_to_spinner = AtomicBool::new(false);
        Arc::new(move |downloaded, total| {
            if total > 0 && pb.length() != Some(total) {
                pb.set_length(total);
            } else if total == 0 && !switched_to_spinner.swap(true, Ordering::Relaxed) {
                if let Ok(style) = ProgressStyle::default_spinner().template(UNSIZED_TEMPLATE) {
                    pb.set_style(style);
                }
            }
            pb.set_position(downloaded);
        })
    }

    pub fn finish(&self, message: &'static str) {
        self.pb.finish_with_message(message);
    }
}
