//! Randomized pacing between remote requests
//!
//! Delays are drawn uniformly from a configured range so that request timing
//! carries no fixed-interval signature.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// A uniform random delay range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min: Duration,
    max: Duration,
}

impl Backoff {
    /// Creates a range; bounds given in the wrong order are swapped
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    /// Pause between two feed pages
    pub fn between_pages(pacing: &PacingConfig) -> Self {
        Self::from_secs(pacing.page_delay_min, pacing.page_delay_max)
    }

    /// Pause before re-checking a newly seen author
    pub fn before_recheck(pacing: &PacingConfig) -> Self {
        Self::from_secs(pacing.author_delay_min, pacing.author_delay_max)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws a delay from the range, at millisecond granularity
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Sleeps for a sampled delay and returns how long it slept
    pub async fn wait(&self) -> Duration {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
