//! Tidemark main entry point
//!
//! This is the command-line interface for the Tidemark crawler.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tidemark::config::{resolve_config, validate_seed, ConfigOverrides};
use tidemark::crawler::run_crawl;
use tidemark::output::{load_statistics, print_report, print_statistics};
use tidemark::storage::open_storage;
use tidemark::url::extract_domain;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Tidemark: a domain-scoped, resumable web crawler
///
/// Tidemark crawls every page on the seed URL's host, stores the content in
/// a per-domain SQLite database, and can resume from that database later.
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(version)]
#[command(about = "A domain-scoped, resumable web crawler", long_about = None)]
struct Cli {
    /// Seed URL; its host scopes the crawl
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Honor the domain's robots.txt rules and crawl delay
    #[arg(long)]
    respect_robots: bool,

    /// Skip pages whose content was already seen in this run
    #[arg(long)]
    no_duplicates: bool,

    /// Seconds to wait between fetches [default: 30]
    #[arg(long, value_name = "SECONDS")]
    crawl_delay: Option<u64>,

    /// Continue from the pending URLs of an existing database
    #[arg(long)]
    resume: bool,

    /// Hours before a crawled page is fetched again [default: 3]
    #[arg(long, value_name = "HOURS")]
    re_crawl_time: Option<u64>,

    /// Directory for log files [default: logs]
    #[arg(long, value_name = "DIR")]
    logs_dir: Option<PathBuf>,

    /// Directory for the crawl databases [default: db]
    #[arg(long, value_name = "DIR")]
    db_dir: Option<PathBuf>,

    /// Optional TOML settings file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the domain's database and exit
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed_url: self.url.clone(),
            respect_robots: self.respect_robots,
            no_duplicates: self.no_duplicates,
            crawl_delay_secs: self.crawl_delay,
            resume: self.resume,
            re_crawl_hours: self.re_crawl_time,
            logs_dir: self.logs_dir.clone(),
            db_dir: self.db_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.overrides())
        .context("Invalid configuration")?;

    let seed = config.crawl.seed_url.as_deref().unwrap_or_default();
    let seed = validate_seed(seed)?;
    let domain = extract_domain(&seed).context("Seed URL has no host")?;

    if cli.stats {
        return handle_stats(&config.paths.db_dir, &domain);
    }

    let (log_path, _log_guard) =
        setup_logging(cli.verbose, cli.quiet, &config.paths.logs_dir, &domain)?;
    tracing::info!("Logging to {}", log_path.display());
    tracing::info!(
        "Crawling {} (respect robots: {}, no duplicates: {}, delay: {}s, resume: {}, re-crawl: {}h)",
        seed,
        config.crawl.respect_robots,
        config.crawl.no_duplicates,
        config.crawl.crawl_delay_secs,
        config.crawl.resume,
        config.crawl.re_crawl_hours
    );

    match run_crawl(config).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e).context("Crawl failed")
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// Events go to stderr and to a new log file for this run. `RUST_LOG`
/// overrides the verbosity flags. The returned guard flushes the file writer
/// when dropped.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    logs_dir: &Path,
    domain: &str,
) -> Result<(PathBuf, WorkerGuard)> {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "tidemark=info,warn",
            1 => "tidemark=debug,info",
            2 => "tidemark=trace,debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file_stem = log_file_stem(domain, chrono::Local::now());
    let (log_writer, guard) = log_writer(logs_dir, &file_stem)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_writer),
        )
        .init();

    Ok((logs_dir.join(format!("{}.log", file_stem)), guard))
}

/// Opens `{logs_dir}/{file_stem}.log` behind a non-blocking writer
///
/// The file is never rotated; the directory is created if missing.
fn log_writer(logs_dir: &Path, file_stem: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_stem)
        .filename_suffix("log")
        .build(logs_dir)
        .with_context(|| format!("Failed to create log file in {}", logs_dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

fn log_file_stem(domain: &str, now: chrono::DateTime<chrono::Local>) -> String {
    format!(
        "crawler_{}_{}",
        domain.replace(':', "_"),
        now.format("%Y%m%d%H%M%S")
    )
}

/// Handles the --stats mode: shows statistics from the domain's database
fn handle_stats(db_dir: &Path, domain: &str) -> Result<()> {
    let store = open_storage(db_dir, domain, true)?;
    let stats = load_statistics(&store).context("Failed to read frontier statistics")?;

    print_statistics(domain, &stats);

    Ok(())
}
