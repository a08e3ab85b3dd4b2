use crate::config::types::Config;
use crate::{ConfigError, ConfigResult};
use regex::RegexBuilder;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_seed(&config.seed)?;
    validate_extensions(&config.extensions)?;
    validate_size_bounds(config.min_size, config.max_size)?;
    validate_timeout(config.timeout_secs)?;

    if let Some(pattern) = &config.recursion_target {
        validate_pattern(pattern)?;
    }
    if let Some(pattern) = &config.name_filter {
        validate_pattern(pattern)?;
    }
    if let Some(proxy) = &config.proxy {
        Url::parse(&proxy.address).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid proxy address '{}': {}", proxy.address, e))
        })?;
    }

    Ok(())
}

/// Validates the seed URL: must parse and be HTTP(S)
fn validate_seed(seed: &str) -> ConfigResult<()> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use the http or https scheme",
            seed
        )));
    }

    Ok(())
}

/// Validates the accepted-extensions list
fn validate_extensions(extensions: &[String]) -> ConfigResult<()> {
    if extensions.is_empty() {
        return Err(ConfigError::Validation(
            "At least one extension must be configured".to_string(),
        ));
    }

    for ext in extensions {
        // Normalization runs before validation, so "." means an empty name
        if ext.len() < 2 || !ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "Invalid extension '{}'",
                ext
            )));
        }
    }

    Ok(())
}

/// Validates the byte-size bounds (0 = unbounded)
fn validate_size_bounds(min_size: u64, max_size: u64) -> ConfigResult<()> {
    if min_size > 0 && max_size > 0 && min_size > max_size {
        return Err(ConfigError::Validation(format!(
            "min-size ({}) must not exceed max-size ({})",
            min_size, max_size
        )));
    }
    Ok(())
}

/// Validates the request timeout
fn validate_timeout(timeout_secs: u64) -> ConfigResult<()> {
    if timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates that a filter pattern compiles as a case-insensitive regex
fn validate_pattern(pattern: &str) -> ConfigResult<()> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}
