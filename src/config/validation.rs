use crate::config::types::{Config, CrawlSettings, FetchSettings, PathSettings};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let seed = config
        .crawl
        .seed_url
        .as_deref()
        .ok_or_else(|| ConfigError::InvalidSeed("a seed URL is required".to_string()))?;
    validate_seed(seed)?;
    validate_crawl_settings(&config.crawl)?;
    validate_fetch_settings(&config.fetch)?;
    validate_paths(&config.paths)?;
    Ok(())
}

/// Parses the seed URL and checks that it can scope a crawl
///
/// The seed must be an absolute http(s) URL with a host.
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed.trim())
        .map_err(|e| ConfigError::InvalidSeed(format!("'{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidSeed(format!(
            "'{}' must use the http or https scheme",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidSeed(format!("'{}' has no host", seed)));
    }

    Ok(url)
}

fn validate_crawl_settings(config: &CrawlSettings) -> Result<(), ConfigError> {
    if config.try_re_crawl_interval().is_none() {
        return Err(ConfigError::Validation(format!(
            "re_crawl_time of {} hours is out of range",
            config.re_crawl_hours
        )));
    }

    Ok(())
}

fn validate_fetch_settings(config: &FetchSettings) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout must be at least 1 second".to_string(),
        ));
    }

    if config.max_retries == 0 {
        return Err(ConfigError::Validation(
            "max_retries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_paths(config: &PathSettings) -> Result<(), ConfigError> {
    if config.logs_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("logs_dir cannot be empty".to_string()));
    }

    if config.db_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("db_dir cannot be empty".to_string()));
    }

    Ok(())
}
