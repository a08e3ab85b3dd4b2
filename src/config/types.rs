use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for a webget run
///
/// Supplied once at startup and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seed URL the crawl starts from
    pub seed: String,

    /// Directory downloaded files are saved into (created if absent)
    #[serde(rename = "save-dir", default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Accepted filename extensions (e.g. ".jpg", ".zip")
    pub extensions: Vec<String>,

    /// Regex restricting which sites recursion may follow into
    #[serde(rename = "recursion-target", default)]
    pub recursion_target: Option<String>,

    /// Regex a target filename must match to be downloaded
    #[serde(rename = "name-filter", default)]
    pub name_filter: Option<String>,

    /// Minimum resource size in bytes (0 = unbounded)
    #[serde(rename = "min-size", default)]
    pub min_size: u64,

    /// Maximum resource size in bytes (0 = unbounded)
    #[serde(rename = "max-size", default)]
    pub max_size: u64,

    /// Maximum recursion depth (negative = unbounded, 0 = seed page only)
    #[serde(rename = "max-depth", default)]
    pub max_depth: i64,

    /// Request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional HTTP proxy
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Prefer the link's human-readable label over the raw filename
    #[serde(rename = "prefer-label", default)]
    pub prefer_label: bool,
}

/// HTTP proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Proxy address, e.g. "http://127.0.0.1:8080"
    pub address: String,

    /// Optional basic-auth username
    #[serde(default)]
    pub username: Option<String>,

    /// Optional basic-auth password
    #[serde(default)]
    pub password: Option<String>,
}

fn default_save_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("webget/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Normalizes the extension list in place
    ///
    /// Extensions are lowercased and given a leading dot so that both
    /// `jpg` and `.JPG` on the command line mean the same thing.
    pub fn normalize(&mut self) {
        for ext in &mut self.extensions {
            let lower = ext.trim().to_ascii_lowercase();
            *ext = if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            };
        }
    }
}
