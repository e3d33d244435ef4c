/// Crawl phase definitions
///
/// This module defines the phases a single crawl invocation moves through.
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Crawl has been created but no request has been issued
    Idle,

    /// Listing pages are being walked to collect product URLs
    ListingInFlight,

    /// Detail pages are being fetched under the concurrency cap
    DetailFanOut,

    /// All detail fetches settled; results are being collected
    Aggregating,

    /// Crawl finished; the result belongs to the caller
    Done,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from this phase to `next` is allowed
    ///
    /// A listing walk that discovers no product URLs goes straight to `Done`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::ListingInFlight)
                | (Self::ListingInFlight, Self::DetailFanOut)
                | (Self::ListingInFlight, Self::Done)
                | (Self::DetailFanOut, Self::Aggregating)
                | (Self::Aggregating, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ListingInFlight => "listing_in_flight",
            Self::DetailFanOut => "detail_fan_out",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
