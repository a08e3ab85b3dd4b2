//! Crawl controller - depth-first traversal orchestration
//!
//! The controller owns the run: the visited set, the shared HTTP client,
//! and the downloader. Traversal is an explicit work stack rather than
//! self-recursion, visiting pages depth-first, left-to-right in extraction
//! order. A page's whole download batch completes before any of its
//! children are visited.

use crate::config::Config;
use crate::crawler::downloader::{Downloader, ResourceDescriptor};
use crate::crawler::fetcher::{build_http_client, fetch_text};
use crate::crawler::parser::{extract_links, LinkRecord};
use crate::crawler::visited::VisitedSet;
use crate::output::StatusSink;
use crate::url::{ends_with_any, has_no_extension, normalize_label, to_absolute};
use crate::{Result, WebgetError};
use regex::{Regex, RegexBuilder};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Upper bound on normalized label length
const LABEL_MAX_LEN: usize = 100;

/// Main crawl controller
pub struct Controller {
    config: Arc<Config>,
    client: Client,
    downloader: Downloader,
    sink: Arc<StatusSink>,
    visited: VisitedSet,
    recursion_target: Option<Regex>,
}

impl Controller {
    /// Creates a controller for one run
    ///
    /// Creates the save directory if absent, builds the shared HTTP
    /// client, and compiles the recursion-target pattern once.
    pub fn new(config: Config, sink: Arc<StatusSink>) -> Result<Self> {
        std::fs::create_dir_all(&config.save_dir)?;

        let config = Arc::new(config);
        let client = build_http_client(&config)?;

        let recursion_target = match &config.recursion_target {
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

        let downloader = Downloader::new(Arc::clone(&config), Arc::clone(&sink))?;

        Ok(Self {
            config,
            client,
            downloader,
            sink,
            visited: VisitedSet::new(),
            recursion_target,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Termination is guaranteed by the monotonic visited set together
    /// with the optional depth ceiling: no page is fetched twice, so the
    /// stack drains once the reachable set is exhausted.
    pub async fn run(&mut self) -> Result<()> {
        let mut stack: Vec<(String, i64)> = vec![(self.config.seed.clone(), 0)];

        while let Some((uri, depth)) = stack.pop() {
            // A page can be pushed from several parents before its first
            // visit; only the first pop fetches it.
            if !self.visited.insert(&uri) {
                continue;
            }
            self.visit(&uri, depth, &mut stack).await;
        }

        tracing::info!("Crawl finished: {} pages visited", self.visited.len());
        Ok(())
    }

    /// Visits one page: fetch, extract, download, enqueue children
    ///
    /// Any fetch or parse failure terminates this branch only; siblings
    /// already on the stack are unaffected.
    async fn visit(&self, uri: &str, depth: i64, stack: &mut Vec<(String, i64)>) {
        self.sink
            .write_line(&format!("[--> {}]: \"{}\"...", depth, uri));

        let text = match fetch_text(&self.client, uri).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("error: {}", e);
                return;
            }
        };

        let content = html_escape::decode_html_entities(&text).to_string();
        if content.is_empty() {
            return;
        }

        let base = match Url::parse(uri) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("error: unparsable page URL {}: {}", uri, e);
                return;
            }
        };

        let links = extract_links(&content);
        let resources = build_resource_batch(&links, &base, &self.config.extensions);

        if !resources.is_empty() {
            let stats = self
                .downloader
                .download_batch(&self.client, resources, depth)
                .await;
            tracing::info!(
                "{}: {} completed, {} failed, {} skipped",
                uri,
                stats.completed,
                stats.failed,
                stats.skipped_exists + stats.skipped_by_name + stats.skipped_by_size
            );
        }

        if self.config.max_depth < 0 || depth < self.config.max_depth {
            let follows = self.follow_candidates(&links, &base);
            // Reverse so the first extracted link is popped first:
            // depth-first, left-to-right.
            for follow in follows.into_iter().rev() {
                stack.push((follow, depth + 1));
            }
        }
    }

    /// Builds the follow-set for one page
    ///
    /// A link is followable when it resolves, has no filename extension
    /// at all, has not been visited, and matches the recursion-target
    /// pattern when one is configured.
    fn follow_candidates(&self, links: &[LinkRecord], base: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut follows = Vec::new();

        for link in links {
            let absolute = match to_absolute(&link.value, base) {
                Some(absolute) => absolute,
                None => continue,
            };
            if !has_no_extension(&absolute) {
                continue;
            }
            if self.visited.contains(&absolute) {
                continue;
            }
            if let Some(target) = &self.recursion_target {
                if !target.is_match(&absolute) {
                    continue;
                }
            }
            if seen.insert(absolute.to_lowercase()) {
                follows.push(absolute);
            }
        }

        follows
    }
}

/// Builds the deduplicated resource batch for one page
///
/// Keeps links whose resolved URI ends with a configured extension,
/// normalizes labels, and deduplicates by resolved URI case-insensitively
/// with the first occurrence winning, order preserved.
fn build_resource_batch(
    links: &[LinkRecord],
    base: &Url,
    extensions: &[String],
) -> Vec<ResourceDescriptor> {
    let mut seen = HashSet::new();
    let mut batch = Vec::new();

    for link in links {
        let absolute = match to_absolute(&link.value, base) {
            Some(absolute) => absolute,
            None => continue,
        };
        if !ends_with_any(&absolute, extensions) {
            continue;
        }
        if !seen.insert(absolute.to_lowercase()) {
            continue;
        }

        let label = link
            .label
            .as_deref()
            .map(|l| normalize_label(l, LABEL_MAX_LEN))
            .filter(|l| !l.is_empty());

        batch.push(ResourceDescriptor {
            uri: absolute,
            label,
        });
    }

    batch
}
