//! Core library modules for tubedl
//!
//! This module contains the internal implementation details of the tubedl library.

pub mod error;
pub mod resolver;
pub mod query;
pub mod manifest;
pub mod selector;
pub mod source;
pub mod stream;
pub mod transcode;
pub mod downloader;

// Re-export main types for internal use
pub use downloader::{DownloadJob, DownloadReport, Downloader, JobOptions};
pub use source::EndpointConfig;
