use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// User agent sent with every request, including the robots.txt fetch
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Tidemark/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/tidemark-crawler/tidemark)"
);

/// Main configuration structure
///
/// Every section and key is optional in the settings file; missing values
/// fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlSettings,
    pub fetch: FetchSettings,
    pub paths: PathSettings,
}

/// Crawl behavior configuration, fixed for the lifetime of a run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// URL the crawl starts from; its host scopes the whole crawl
    #[serde(rename = "seed-url")]
    pub seed_url: Option<String>,

    /// Consult the domain's robots.txt before every fetch
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// Skip pages whose content was already seen during this run
    #[serde(rename = "no-duplicates")]
    pub no_duplicates: bool,

    /// Seconds to wait between fetches (raised by a larger robots.txt delay)
    #[serde(rename = "crawl-delay")]
    pub crawl_delay_secs: u64,

    /// Continue from the pending records of an existing frontier store
    pub resume: bool,

    /// Hours after which a crawled page becomes eligible for re-crawl
    #[serde(rename = "re-crawl-time")]
    pub re_crawl_hours: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            seed_url: None,
            respect_robots: false,
            no_duplicates: false,
            crawl_delay_secs: 30,
            resume: false,
            re_crawl_hours: 3,
        }
    }
}

impl CrawlSettings {
    pub fn crawl_delay(&self) -> Duration {
        Duration::from_secs(self.crawl_delay_secs)
    }

    /// The re-crawl interval, or `None` when the hours do not fit a `chrono::Duration`
    pub fn try_re_crawl_interval(&self) -> Option<chrono::Duration> {
        i64::try_from(self.re_crawl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
    }

    /// The re-crawl interval, saturating at `chrono::Duration::MAX`
    ///
    /// Validated configurations never saturate.
    pub fn re_crawl_interval(&self) -> chrono::Duration {
        self.try_re_crawl_interval().unwrap_or(chrono::Duration::MAX)
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout of the first attempt in seconds; doubles with every retry
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,

    /// Total number of attempts for timeouts and server errors
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl FetchSettings {
    pub fn initial_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    #[serde(rename = "logs-dir")]
    pub logs_dir: PathBuf,

    #[serde(rename = "db-dir")]
    pub db_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            db_dir: PathBuf::from("db"),
        }
    }
}

/// Values given on the command line
///
/// `None` (or `false` for switches) leaves the value from the settings file
/// untouched. Switches can only turn a behavior on.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub seed_url: Option<String>,
    pub respect_robots: bool,
    pub no_duplicates: bool,
    pub crawl_delay_secs: Option<u64>,
    pub resume: bool,
    pub re_crawl_hours: Option<u64>,
    pub logs_dir: Option<PathBuf>,
    pub db_dir: Option<PathBuf>,
}

impl Config {
    /// Applies command-line values on top of this configuration
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(seed) = overrides.seed_url {
            self.crawl.seed_url = Some(seed);
        }
        self.crawl.respect_robots |= overrides.respect_robots;
        self.crawl.no_duplicates |= overrides.no_duplicates;
        self.crawl.resume |= overrides.resume;
        if let Some(delay) = overrides.crawl_delay_secs {
            self.crawl.crawl_delay_secs = delay;
        }
        if let Some(hours) = overrides.re_crawl_hours {
            self.crawl.re_crawl_hours = hours;
        }
        if let Some(dir) = overrides.logs_dir {
            self.paths.logs_dir = dir;
        }
        if let Some(dir) = overrides.db_dir {
            self.paths.db_dir = dir;
        }
        self
    }
}
