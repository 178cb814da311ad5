//! Configuration module
//!
//! A crawl is configured from an optional TOML settings file overlaid with
//! command-line flags. The merged result is validated before any crawling
//! starts.
//!
//! # Example
//!
//! ```no_run
//! use tidemark::config::{resolve_config, ConfigOverrides};
//!
//! let overrides = ConfigOverrides {
//!     seed_url: Some("https://example.com/".to_string()),
//!     ..Default::default()
//! };
//! let config = resolve_config(None, overrides).unwrap();
//! println!("Crawl delay: {:?}", config.crawl.crawl_delay());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, ConfigOverrides, CrawlSettings, FetchSettings, PathSettings, DEFAULT_USER_AGENT,
};

pub use parser::{load_config, parse_config, resolve_config};
pub use validation::{validate, validate_seed};
