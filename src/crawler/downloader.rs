//! Bounded-concurrency download scheduler
//!
//! Drives one page's resource batch to completion. Filters (name,
//! already-exists, size probe) run before a permit is acquired, so a
//! skipped resource never consumes concurrency. The permit pool is a
//! counting semaphore with owned permits: each in-flight transfer holds
//! exactly one permit for its whole lifetime and releases it on every
//! exit path when the permit drops.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, download_to_file, fetch_header};
use crate::output::StatusSink;
use crate::url::{extension_of, file_name_of};
use crate::{Result, WebgetError};
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Fixed ceiling on simultaneously in-flight downloads
pub const MAX_CONCURRENT_DOWNLOADS: usize = 5;

/// Progress updates are rendered at most once per this many bytes
const PROGRESS_STEP_BYTES: u64 = 64 * 1024;

/// One downloadable resource derived from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Absolute URI of the resource
    pub uri: String,

    /// Normalized human-readable label, if the link had one
    pub label: Option<String>,
}

/// Terminal state of one resource in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Destination file already exists; never overwritten
    SkippedExists,
    /// Target filename did not match the name filter
    SkippedByName,
    /// Size probe placed the resource outside the configured bounds
    SkippedBySize,
    Completed,
    Failed,
}

/// Per-batch outcome counts, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub completed: usize,
    pub failed: usize,
    pub skipped_exists: usize,
    pub skipped_by_name: usize,
    pub skipped_by_size: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::SkippedExists => self.skipped_exists += 1,
            DownloadOutcome::SkippedByName => self.skipped_by_name += 1,
            DownloadOutcome::SkippedBySize => self.skipped_by_size += 1,
            DownloadOutcome::Completed => self.completed += 1,
            DownloadOutcome::Failed => self.failed += 1,
        }
    }
}

/// Schedules one page's resources through the permit pool
pub struct Downloader {
    config: Arc<Config>,
    sink: Arc<StatusSink>,
    semaphore: Arc<Semaphore>,
    name_filter: Option<Regex>,
}

impl Downloader {
    /// Creates a downloader for the run
    ///
    /// The name filter is compiled once here, case-insensitively.
    pub fn new(config: Arc<Config>, sink: Arc<StatusSink>) -> Result<Self> {
        let name_filter = match &config.name_filter {
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| WebgetError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: e,
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            config,
            sink,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_DOWNLOADS)),
            name_filter,
        })
    }

    /// Downloads a page's resource batch, returning after every resource
    /// has reached a terminal outcome
    ///
    /// Resources are dispatched in extraction order. Acquiring a permit is
    /// the only suspension point: once the pool is exhausted the dispatch
    /// loop waits, while transfers already in flight keep running. A
    /// transfer failure is logged and contained; siblings are unaffected.
    pub async fn download_batch(
        &self,
        probe_client: &reqwest::Client,
        resources: Vec<ResourceDescriptor>,
        depth: i64,
    ) -> BatchStats {
        let mut stats = BatchStats::default();
        let mut transfers: Vec<JoinHandle<DownloadOutcome>> = Vec::new();

        for (index, resource) in resources.into_iter().enumerate() {
            let name = match target_file_name(&resource, self.config.prefer_label) {
                Some(name) => name,
                None => {
                    tracing::warn!("No usable filename for {}, skipping", resource.uri);
                    stats.record(DownloadOutcome::Failed);
                    continue;
                }
            };

            if let Some(filter) = &self.name_filter {
                if !filter.is_match(&name) {
                    tracing::debug!("\"{}\" filtered by name pattern", name);
                    stats.record(DownloadOutcome::SkippedByName);
                    continue;
                }
            }

            let path = self.config.save_dir.join(&name);
            if path.exists() {
                self.sink
                    .write_line(&format!("\"{}\" already exists, skipping...", name));
                stats.record(DownloadOutcome::SkippedExists);
                continue;
            }

            if let Some(outcome) = self.size_filter(probe_client, &resource.uri, &name).await {
                stats.record(outcome);
                continue;
            }

            // Throttle point: blocks further dispatch, not transfers in flight
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // pool closed, nothing more can run
            };

            let tag = format!("[{}.{}]", depth, index);
            let row = self.sink.reserve_row();
            self.sink
                .write_at(row, 1, &format!("{}: downloading \"{}\"...", tag, name));

            let config = Arc::clone(&self.config);
            let sink = Arc::clone(&self.sink);
            let uri = resource.uri.clone();
            transfers.push(tokio::spawn(async move {
                // Held for the entire transfer; dropped on every exit path
                let _permit = permit;
                transfer(&config, &sink, &uri, path, &name, &tag, row).await
            }));
        }

        for handle in transfers {
            match handle.await {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    tracing::warn!("Download task panicked: {}", e);
                    stats.record(DownloadOutcome::Failed);
                }
            }
        }

        stats
    }

    /// Applies the byte-size bounds via a header-only probe
    ///
    /// Returns `Some(SkippedBySize)` when a parsed Content-Length falls
    /// outside the bounds. A failed probe or unparsable length returns
    /// `None`: absence of size information never blocks a download.
    async fn size_filter(
        &self,
        client: &reqwest::Client,
        uri: &str,
        name: &str,
    ) -> Option<DownloadOutcome> {
        if self.config.min_size == 0 && self.config.max_size == 0 {
            return None;
        }

        let length = fetch_header(client, uri, "content-length")
            .await?
            .parse::<u64>()
            .ok()?;

        if self.config.min_size > 0 && length < self.config.min_size {
            tracing::debug!("\"{}\" is {} bytes, below min-size", name, length);
            return Some(DownloadOutcome::SkippedBySize);
        }
        if self.config.max_size > 0 && length > self.config.max_size {
            tracing::debug!("\"{}\" is {} bytes, above max-size", name, length);
            return Some(DownloadOutcome::SkippedBySize);
        }

        None
    }
}

/// Runs one transfer on a fresh, identically configured client
///
/// A per-download client keeps request state isolated across concurrent
/// transfers. Failures are reported on the status row and the partial
/// file is removed so skip-on-exists stays meaningful on the next run.
async fn transfer(
    config: &Config,
    sink: &StatusSink,
    uri: &str,
    path: PathBuf,
    name: &str,
    tag: &str,
    row: u16,
) -> DownloadOutcome {
    let client = match build_http_client(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Failed to build client for {}: {}", uri, e);
            sink.write_at(row, 1, &format!("{}: \"{}\" failed: {}", tag, name, e));
            return DownloadOutcome::Failed;
        }
    };

    let mut last_reported: u64 = 0;
    let progress = |received: u64, total: Option<u64>| {
        let done = total.map(|t| received >= t).unwrap_or(false);
        if received - last_reported < PROGRESS_STEP_BYTES && !done {
            return;
        }
        last_reported = received;
        let line = match total {
            Some(total) => format!(
                "{}: \"{}\" {}% ({} KB / {} KB)",
                tag,
                name,
                received * 100 / total.max(1),
                received / 1024,
                total / 1024
            ),
            None => format!("{}: \"{}\" {} KB received", tag, name, received / 1024),
        };
        sink.write_at(row, 1, &line);
    };

    match download_to_file(&client, uri, &path, progress).await {
        Ok(()) => {
            sink.write_at(row, 1, &format!("{}: \"{}\" completed", tag, name));
            DownloadOutcome::Completed
        }
        Err(e) => {
            tracing::warn!("Transfer failed for {}: {}", uri, e);
            sink.write_at(row, 1, &format!("{}: \"{}\" failed: {}", tag, name, e));
            let _ = std::fs::remove_file(&path);
            DownloadOutcome::Failed
        }
    }
}

/// Computes the target filename for a resource
///
/// With label preference enabled and a label present, the name is
/// `{label}.{extension-of-uri}`; otherwise the last path segment of the
/// resolved URI.
fn target_file_name(resource: &ResourceDescriptor, prefer_label: bool) -> Option<String> {
    if prefer_label {
        if let (Some(label), Some(ext)) = (resource.label.as_deref(), extension_of(&resource.uri))
        {
            return Some(format!("{}.{}", label, ext));
        }
    }
    file_name_of(&resource.uri).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_config(save_dir: PathBuf) -> Config {
        Config {
            seed: "https://example.com/".to_string(),
            save_dir,
            extensions: vec![".jpg".to_string(), ".zip".to_string()],
            recursion_target: None,
            name_filter: None,
            min_size: 0,
            max_size: 0,
            max_depth: 0,
            timeout_secs: 5,
            proxy: None,
            user_agent: "webget-test/1.0".to_string(),
            prefer_label: false,
        }
    }

    fn resource(uri: &str, label: Option<&str>) -> ResourceDescriptor {
        ResourceDescriptor {
            uri: uri.to_string(),
            label: label.map(|l| l.to_string()),
        }
    }

    fn quiet_sink() -> Arc<StatusSink> {
        Arc::new(StatusSink::new(Box::new(std::io::sink())))
    }

    #[test]
    fn test_target_file_name_from_uri() {
        let r = resource("https://example.com/files/photo.jpg", Some("Holiday"));
        assert_eq!(target_file_name(&r, false).as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_target_file_name_prefers_label() {
        let r = resource("https://example.com/files/photo.jpg", Some("Holiday"));
        assert_eq!(target_file_name(&r, true).as_deref(), Some("Holiday.jpg"));
    }

    #[test]
    fn test_target_file_name_label_without_extension_falls_back() {
        let r = resource("https://example.com/files/photo", Some("Holiday"));
        assert_eq!(target_file_name(&r, true).as_deref(), Some("photo"));
    }

    #[test]
    fn test_target_file_name_no_label_falls_back() {
        let r = resource("https://example.com/files/photo.jpg", None);
        assert_eq!(target_file_name(&r, true).as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_target_file_name_none_for_bare_host() {
        let r = resource("https://example.com/", None);
        assert_eq!(target_file_name(&r, false), None);
    }

    #[test]
    fn test_bad_name_filter_rejected() {
        let mut config = create_test_config(PathBuf::from("."));
        config.name_filter = Some("([unclosed".to_string());
        let result = Downloader::new(Arc::new(config), quiet_sink());
        assert!(matches!(
            result,
            Err(WebgetError::InvalidPattern { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let config = Arc::new(create_test_config(PathBuf::from(".")));
        let downloader = Downloader::new(Arc::clone(&config), quiet_sink()).unwrap();
        let client = build_http_client(&config).unwrap();

        let stats = downloader.download_batch(&client, vec![], 0).await;
        assert_eq!(stats, BatchStats::default());
    }

    #[tokio::test]
    async fn test_name_filter_skips_without_network() {
        // The URI is unreachable; a name-filtered resource must never
        // touch the network.
        let mut config = create_test_config(PathBuf::from("."));
        config.name_filter = Some("^photo".to_string());
        let config = Arc::new(config);
        let downloader = Downloader::new(Arc::clone(&config), quiet_sink()).unwrap();
        let client = build_http_client(&config).unwrap();

        let batch = vec![resource("http://no-such-host.invalid/other.jpg", None)];
        let stats = downloader.download_batch(&client, batch, 0).await;

        assert_eq!(stats.skipped_by_name, 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_existing_file_skipped_without_network() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kept.zip"), b"original").unwrap();

        let config = Arc::new(create_test_config(dir.path().to_path_buf()));
        let downloader = Downloader::new(Arc::clone(&config), quiet_sink()).unwrap();
        let client = build_http_client(&config).unwrap();

        let batch = vec![resource("http://no-such-host.invalid/kept.zip", None)];
        let stats = downloader.download_batch(&client, batch, 0).await;

        assert_eq!(stats.skipped_exists, 1);
        // Never overwritten
        assert_eq!(
            std::fs::read(dir.path().join("kept.zip")).unwrap(),
            b"original"
        );
    }

    #[tokio::test]
    async fn test_failed_transfer_contained_and_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(create_test_config(dir.path().to_path_buf()));
        let downloader = Downloader::new(Arc::clone(&config), quiet_sink()).unwrap();
        let client = build_http_client(&config).unwrap();

        let batch = vec![resource("http://no-such-host.invalid/gone.zip", None)];
        let stats = downloader.download_batch(&client, batch, 0).await;

        assert_eq!(stats.failed, 1);
        assert!(!dir.path().join("gone.zip").exists());
    }
}
