//! Webget main entry point
//!
//! Command-line interface for the webget recursive site downloader.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webget::config::{load_config, validate, Config, ProxyConfig};
use webget::crawler::crawl;

/// Webget: recursive site crawler and bulk file downloader
///
/// Fetches a seed page, downloads every linked file whose extension
/// matches, and optionally follows extension-less links to a configurable
/// recursion depth.
#[derive(Parser, Debug)]
#[command(name = "webget")]
#[command(version)]
#[command(about = "Recursive site crawler and bulk file downloader", long_about = None)]
struct Cli {
    /// Seed URL to start from (alternatively use --config)
    #[arg(value_name = "URL", required_unless_present = "config")]
    seed: Option<String>,

    /// Load the run configuration from a TOML file instead of flags
    #[arg(long, value_name = "FILE", conflicts_with = "seed")]
    config: Option<PathBuf>,

    /// Accepted filename extension, repeatable (e.g. -e jpg -e png)
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Directory downloaded files are saved into
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    save_dir: PathBuf,

    /// Maximum recursion depth (negative = unbounded, 0 = seed page only)
    #[arg(short = 'r', long, default_value_t = 0, allow_negative_numbers = true)]
    max_depth: i64,

    /// Regex restricting which sites recursion may follow into
    #[arg(long, value_name = "PATTERN")]
    recursion_target: Option<String>,

    /// Regex a target filename must match to be downloaded
    #[arg(long, value_name = "PATTERN")]
    name_filter: Option<String>,

    /// Minimum file size in bytes (0 = unbounded)
    #[arg(long, default_value_t = 0, value_name = "BYTES")]
    min_size: u64,

    /// Maximum file size in bytes (0 = unbounded)
    #[arg(long, default_value_t = 0, value_name = "BYTES")]
    max_size: u64,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value_t = 30, value_name = "SECS")]
    timeout: u64,

    /// HTTP proxy address (e.g. http://127.0.0.1:8080)
    #[arg(long, value_name = "ADDRESS")]
    proxy: Option<String>,

    /// Proxy basic-auth username
    #[arg(long, value_name = "USER", requires = "proxy")]
    proxy_user: Option<String>,

    /// Proxy basic-auth password
    #[arg(long, value_name = "PASSWORD", requires = "proxy_user")]
    proxy_password: Option<String>,

    /// User agent string sent with every request
    #[arg(long, value_name = "STRING")]
    user_agent: Option<String>,

    /// Name downloads after link labels instead of raw filenames
    #[arg(long)]
    prefer_label: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would run without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    crawl(config).await.context("Crawl failed")?;
    Ok(())
}

/// Builds the run configuration from a TOML file or from the CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
        return load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }

    let seed = cli
        .seed
        .clone()
        .context("A seed URL is required unless --config is given")?;

    let proxy = cli.proxy.as_ref().map(|address| ProxyConfig {
        address: address.clone(),
        username: cli.proxy_user.clone(),
        password: cli.proxy_password.clone(),
    });

    let mut config = Config {
        seed,
        save_dir: cli.save_dir.clone(),
        extensions: cli.extensions.clone(),
        recursion_target: cli.recursion_target.clone(),
        name_filter: cli.name_filter.clone(),
        min_size: cli.min_size,
        max_size: cli.max_size,
        max_depth: cli.max_depth,
        timeout_secs: cli.timeout,
        proxy,
        user_agent: cli
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("webget/{}", env!("CARGO_PKG_VERSION"))),
        prefer_label: cli.prefer_label,
    };

    config.normalize();
    validate(&config)?;
    Ok(config)
}

/// Sets up the tracing subscriber based on verbosity level
///
/// Logs go to stderr; the status sink owns stdout for progress rendering.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webget=info,warn"),
            1 => EnvFilter::new("webget=debug,info"),
            2 => EnvFilter::new("webget=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Webget Dry Run ===\n");

    println!("Seed URL: {}", config.seed);
    println!("Save directory: {}", config.save_dir.display());
    println!("Extensions: {}", config.extensions.join(", "));
    println!(
        "Max depth: {}",
        if config.max_depth < 0 {
            "unbounded".to_string()
        } else {
            config.max_depth.to_string()
        }
    );

    if let Some(pattern) = &config.recursion_target {
        println!("Recursion target: {}", pattern);
    }
    if let Some(pattern) = &config.name_filter {
        println!("Name filter: {}", pattern);
    }
    if config.min_size > 0 {
        println!("Min size: {} bytes", config.min_size);
    }
    if config.max_size > 0 {
        println!("Max size: {} bytes", config.max_size);
    }
    if let Some(proxy) = &config.proxy {
        println!("Proxy: {}", proxy.address);
    }

    println!("Timeout: {}s", config.timeout_secs);
    println!("User agent: {}", config.user_agent);
    println!("Prefer labels: {}", config.prefer_label);
    println!(
        "Concurrent downloads: {}",
        webget::MAX_CONCURRENT_DOWNLOADS
    );

    println!("\n✓ Configuration is valid");
}
