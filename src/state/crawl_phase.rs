/// Crawl phase definitions for the pagination state machine
///
/// The engine moves `FetchingPage -> ProcessingAuthors` for every page and then
/// either back to `FetchingPage` or on to `Terminal` once the feed is exhausted.
use crate::HarvestError;
use std::fmt;

/// Represents where the crawl engine is in its pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Waiting to request the next page of the feed
    FetchingPage,

    /// Walking the authors of the page that was just fetched
    ProcessingAuthors,

    /// The feed reported no further pages
    Terminal,
}

impl CrawlPhase {
    /// Returns true if the engine will not request any more pages
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::FetchingPage, Self::ProcessingAuthors)
                | (Self::ProcessingAuthors, Self::FetchingPage)
                | (Self::ProcessingAuthors, Self::Terminal)
        )
    }

    /// Moves to `next`, rejecting steps the state machine does not allow
    pub fn transition(self, next: CrawlPhase) -> Result<CrawlPhase, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingPage => "fetching_page",
            Self::ProcessingAuthors => "processing_authors",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
