//! Frontier record status definitions

use std::fmt;

/// Lifecycle state of a URL in the frontier
///
/// A record is created `Pending`, becomes `Crawled` after a terminal fetch
/// attempt (successful or not), and goes back to `Pending` when it is
/// re-queued for a later visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierStatus {
    /// Waiting to be fetched
    Pending,

    /// Fetched at least once; `crawled_at` is set
    Crawled,
}

impl FrontierStatus {
    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Crawled => "crawled",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "crawled" => Some(Self::Crawled),
            _ => None,
        }
    }
}

impl fmt::Display for FrontierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
