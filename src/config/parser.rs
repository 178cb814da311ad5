use crate::config::types::{Config, ConfigOverrides};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a TOML settings file from the given path
///
/// The file is not validated here: it may legitimately omit the seed URL,
/// which is then supplied on the command line.
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully parsed configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses TOML settings from a string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Builds the effective configuration for a run
///
/// Starts from the settings file (or the defaults when there is none),
/// applies the command-line overrides and validates the result.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tidemark::config::{resolve_config, ConfigOverrides};
///
/// let config = resolve_config(Some(Path::new("tidemark.toml")), ConfigOverrides::default()).unwrap();
/// println!("Seed: {:?}", config.crawl.seed_url);
/// ```
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, ConfigError> {
    let base = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    let config = base.merge(overrides);
    validate(&config)?;

    Ok(config)
}
