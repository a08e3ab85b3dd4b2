//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building HTTP clients with user agent, timeout, and proxy settings
//! - GET requests for page text
//! - HEAD requests for header-only probes
//! - Streaming file downloads with byte-progress reporting

use crate::config::Config;
use crate::{Result, WebgetError};
use futures_util::StreamExt;
use reqwest::{Client, Proxy};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Builds an HTTP client from the run configuration
///
/// Every transfer in a run uses a client built by this function, so a
/// per-download client is configured identically to the shared one.
///
/// # Arguments
///
/// * `config` - The run configuration (user agent, timeout, proxy)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(WebgetError)` - Failed to build client or proxy
pub fn build_http_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_config) = &config.proxy {
        let mut proxy = Proxy::all(&proxy_config.address)?;
        if let (Some(user), Some(password)) = (&proxy_config.username, &proxy_config.password) {
            proxy = proxy.basic_auth(user, password);
        }
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches a page and returns its text body
///
/// Non-success HTTP statuses are errors; the caller decides whether the
/// failure terminates a branch.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let fetch_err = |source| WebgetError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(fetch_err)?;
    let response = response.error_for_status().map_err(fetch_err)?;
    response.text().await.map_err(fetch_err)
}

/// Sends a HEAD request and returns a single response header value
///
/// No body is transferred. Any failure (network, HTTP status, missing
/// header) yields `None`; callers treat absence as "no information".
pub async fn fetch_header(client: &Client, url: &str, name: &str) -> Option<String> {
    let response = match client.head(url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("HEAD request for {} failed: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!("HEAD request for {} returned {}", url, response.status());
        return None;
    }

    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Streams a URL to a file on disk, reporting byte progress per chunk
///
/// The progress callback receives `(bytes_received, total_bytes)` where
/// the total comes from the Content-Length header when the server sends
/// one. On failure the partially written file is left in place; cleanup
/// is the caller's decision.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to download
/// * `path` - Destination file path
/// * `on_progress` - Invoked after every chunk written
pub async fn download_to_file<F>(
    client: &Client,
    url: &str,
    path: &Path,
    mut on_progress: F,
) -> Result<()>
where
    F: FnMut(u64, Option<u64>),
{
    let transfer_err = |source| WebgetError::Transfer {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(transfer_err)?;
    let response = response.error_for_status().map_err(transfer_err)?;
    let total = response.content_length();

    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut received: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(transfer_err)?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
        on_progress(received, total);
    }

    file.flush().await?;
    Ok(())
}
