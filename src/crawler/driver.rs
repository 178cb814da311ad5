//! Crawl driver - the main crawl loop
//!
//! The driver owns everything that changes during a run: the in-memory work
//! list, the set of content hashes seen so far and the frontier store handle.
//! Each iteration takes one URL through robots, staleness, fetch and link
//! ingestion, then waits for the crawl delay unless the URL was rejected
//! without a fetch.

use crate::config::CrawlSettings;
use crate::crawler::fetcher::{compute_hash, FetchResult, Fetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::staleness::should_refetch;
use crate::crawler::transport::Transport;
use crate::robots::{effective_delay, RobotsGate};
use crate::state::{CrawlOutcome, FrontierStatus};
use crate::storage::FrontierStore;
use crate::url::extract_domain;
use crate::{CrawlError, UrlError};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use url::Url;

/// Per-outcome tally of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub skipped_robots: u64,
    pub skipped_fresh: u64,
    pub failed: u64,
    pub duplicates: u64,
    pub crawled: u64,
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn record(&mut self, outcome: CrawlOutcome) {
        let counter = match outcome {
            CrawlOutcome::SkipRobots => &mut self.skipped_robots,
            CrawlOutcome::SkipFresh => &mut self.skipped_fresh,
            CrawlOutcome::FetchFailed => &mut self.failed,
            CrawlOutcome::DuplicateContent => &mut self.duplicates,
            CrawlOutcome::CrawledOk => &mut self.crawled,
        };
        *counter += 1;
    }

    /// Number of URLs processed
    pub fn total(&self) -> u64 {
        self.skipped_robots + self.skipped_fresh + self.failed + self.duplicates + self.crawled
    }
}

/// Sequential crawler for a single domain
pub struct CrawlDriver<S, T> {
    store: S,
    fetcher: Fetcher<T>,
    robots: RobotsGate,
    domain: String,
    delay: Duration,
    no_duplicates: bool,
    re_crawl_interval: chrono::Duration,
    work_list: VecDeque<String>,
    /// URLs already put on the work list during this run
    scheduled: HashSet<String>,
    visited_hashes: HashSet<String>,
}

impl<S: FrontierStore, T: Transport> CrawlDriver<S, T> {
    /// Creates a driver and builds its initial work list
    ///
    /// A resumed run over a non-empty store starts from the store's pending
    /// URLs. Any other run starts from `seed`, which is enqueued right away.
    pub fn new(
        settings: &CrawlSettings,
        seed: Url,
        store: S,
        fetcher: Fetcher<T>,
        robots: RobotsGate,
    ) -> Result<Self, CrawlError> {
        let domain = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

        let delay = effective_delay(settings.crawl_delay(), robots.crawl_delay());
        if delay > settings.crawl_delay() {
            tracing::info!("robots.txt raises the crawl delay to {:?}", delay);
        }

        let mut driver = Self {
            store,
            fetcher,
            robots,
            domain,
            delay,
            no_duplicates: settings.no_duplicates,
            re_crawl_interval: settings.re_crawl_interval(),
            work_list: VecDeque::new(),
            scheduled: HashSet::new(),
            visited_hashes: HashSet::new(),
        };
        driver.seed_work_list(settings.resume, seed);

        Ok(driver)
    }

    fn seed_work_list(&mut self, resume: bool, seed: Url) {
        if resume {
            match self.store.is_empty() {
                Ok(false) => match self.store.load_pending() {
                    Ok(pending) => {
                        tracing::info!("Resuming with {} pending URLs", pending.len());
                        for url in pending {
                            self.schedule(url);
                        }
                        return;
                    }
                    Err(e) => tracing::error!("Failed to load pending URLs: {}", e),
                },
                Ok(true) => tracing::info!("Frontier store is empty, starting from the seed"),
                Err(e) => tracing::error!("Failed to inspect frontier store: {}", e),
            }
        }

        let seed = seed.to_string();
        if let Err(e) = self
            .store
            .enqueue(&self.domain, &seed, FrontierStatus::Pending)
        {
            tracing::error!("Failed to enqueue seed {}: {}", seed, e);
        }
        self.schedule(seed);
    }

    fn schedule(&mut self, url: String) {
        if self.scheduled.insert(url.clone()) {
            self.work_list.push_back(url);
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Effective delay between fetches
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// URLs waiting to be processed
    pub fn pending(&self) -> usize {
        self.work_list.len()
    }

    /// Processes URLs until the work list is empty
    pub async fn run(&mut self) -> CrawlReport {
        let span = tracing::info_span!("crawl", domain = %self.domain);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(&mut self) -> CrawlReport {
        tracing::info!("Starting crawl with {} URLs queued", self.work_list.len());

        let start = Instant::now();
        let mut report = CrawlReport::default();

        while let Some(url) = self.work_list.pop_front() {
            let outcome = self.process_url(&url).await;
            tracing::debug!("{} -> {}", url, outcome);
            report.record(outcome);

            if report.total() % 10 == 0 {
                tracing::info!(
                    "Progress: {} URLs processed, {} queued",
                    report.total(),
                    self.work_list.len()
                );
            }

            if outcome.applies_delay() && !self.delay.is_zero() && !self.work_list.is_empty() {
                tokio::time::sleep(self.delay).await;
            }
        }

        report.elapsed = start.elapsed();
        tracing::info!(
            "Crawl completed: {} crawled, {} failed, {} duplicates, {} skipped (robots), {} skipped (fresh) in {:?}",
            report.crawled,
            report.failed,
            report.duplicates,
            report.skipped_robots,
            report.skipped_fresh,
            report.elapsed
        );

        report
    }

    /// Takes one URL through a full iteration
    async fn process_url(&mut self, url: &str) -> CrawlOutcome {
        if !self.robots.allowed(url) {
            tracing::info!("Skipping {}: disallowed by robots.txt", url);
            return CrawlOutcome::SkipRobots;
        }

        match should_refetch(&self.store, url, self.re_crawl_interval) {
            Ok(false) => {
                tracing::info!("Skipping {}: crawled recently", url);
                if let Err(e) = self.store.requeue(url) {
                    tracing::error!("Failed to requeue {}: {}", url, e);
                }
                return CrawlOutcome::SkipFresh;
            }
            Ok(true) => {}
            Err(e) => tracing::error!("Failed to read crawl time of {}: {}", url, e),
        }

        tracing::info!("Crawling {}", url);

        match self.fetcher.fetch(url).await {
            FetchResult::Failed { error, .. } => {
                let hash = compute_hash(&error);
                self.persist(url, &error, &hash);
                CrawlOutcome::FetchFailed
            }
            FetchResult::Fetched(content) => {
                let stored = content.as_stored();
                let hash = compute_hash(&stored);

                if self.no_duplicates && self.visited_hashes.contains(&hash) {
                    tracing::info!("Skipping {}: duplicate content", url);
                    return CrawlOutcome::DuplicateContent;
                }

                self.persist(url, &stored, &hash);
                self.visited_hashes.insert(hash);

                if let Some(html) = content.as_text() {
                    match Url::parse(url) {
                        Ok(base) => {
                            for link in extract_links(html, &base) {
                                self.ingest_link(link.as_str());
                            }
                        }
                        Err(e) => tracing::warn!("Cannot resolve links of {}: {}", url, e),
                    }
                }

                CrawlOutcome::CrawledOk
            }
        }
    }

    fn persist(&mut self, url: &str, content: &str, hash: &str) {
        if let Err(e) = self
            .store
            .record_result(url, content, hash, FrontierStatus::Crawled)
        {
            tracing::error!("Failed to record result for {}: {}", url, e);
        }
    }

    /// Queues a discovered link unless robots.txt forbids it
    fn ingest_link(&mut self, link: &str) {
        if !self.robots.allowed(link) {
            tracing::debug!("Not queueing {}: disallowed by robots.txt", link);
            return;
        }

        if let Err(e) = self
            .store
            .enqueue(&self.domain, link, FrontierStatus::Pending)
        {
            tracing::error!("Failed to enqueue {}: {}", link, e);
        }
        self.schedule(link.to_string());
    }
}
