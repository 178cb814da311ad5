use std::fmt;

/// Result of processing a single URL in one crawl iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// Disallowed by robots.txt
    SkipRobots,

    /// Crawled within the re-crawl interval; re-queued as pending
    SkipFresh,

    /// Fetch ended in an error that was recorded on the frontier
    FetchFailed,

    /// Content already seen during this run; discarded
    DuplicateContent,

    /// Content stored and links followed
    CrawledOk,
}

impl CrawlOutcome {
    /// Fast-reject outcomes never wait for the crawl delay
    pub fn applies_delay(&self) -> bool {
        !matches!(self, Self::SkipRobots | Self::SkipFresh)
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SkipRobots => "skip-robots",
            Self::SkipFresh => "skip-fresh",
            Self::FetchFailed => "fetch-failed",
            Self::DuplicateContent => "duplicate-content",
            Self::CrawledOk => "crawled-ok",
        };
        f.write_str(label)
    }
}
