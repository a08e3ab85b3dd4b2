//! Webget: a recursive site crawler and bulk file downloader
//!
//! This crate fetches a seed page, downloads every linked resource whose
//! filename extension matches the configured set, and optionally follows
//! extension-less links to a configurable recursion depth.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for webget operations
#[derive(Debug, Error)]
pub enum WebgetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Transfer error for {url}: {source}")]
    Transfer { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Result type alias for webget operations
pub type Result<T> = std::result::Result<T, WebgetError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::MAX_CONCURRENT_DOWNLOADS;
pub use output::StatusSink;
pub use crate::url::{ends_with_any, has_no_extension, normalize_label, to_absolute};
