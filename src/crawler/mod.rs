//! Crawler module for page fetching and file downloading
//!
//! This module contains the core crawl-and-download logic:
//! - Depth-first page traversal with visited-set deduplication
//! - Link extraction and resource/follow classification
//! - The bounded-concurrency download scheduler
//! - HTTP fetching, header probes, and streaming downloads

mod controller;
mod downloader;
mod fetcher;
mod parser;
mod visited;

pub use controller::Controller;
pub use downloader::{
    BatchStats, DownloadOutcome, Downloader, ResourceDescriptor, MAX_CONCURRENT_DOWNLOADS,
};
pub use fetcher::{build_http_client, download_to_file, fetch_header, fetch_text};
pub use parser::{extract_links, LinkRecord};
pub use visited::VisitedSet;

use crate::config::Config;
use crate::output::StatusSink;
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl-and-download operation
///
/// This is the main entry point. It will:
/// 1. Create the save directory if absent
/// 2. Build the shared HTTP client
/// 3. Walk pages depth-first from the seed
/// 4. Download each page's matching resources before recursing
///
/// # Arguments
///
/// * `config` - The run configuration
///
/// # Returns
///
/// * `Ok(())` - Crawl completed (individual page/transfer failures are
///   contained and logged, never fatal)
/// * `Err(WebgetError)` - Setup failed before the crawl could start
pub async fn crawl(config: Config) -> Result<()> {
    let sink = Arc::new(StatusSink::stdout());
    let mut controller = Controller::new(config, sink)?;
    controller.run().await
}
