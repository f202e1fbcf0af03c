//! Crawler module for harvesting authors from a hashtag feed
//!
//! This module contains the core crawling logic, including:
//! - Randomized pacing between requests
//! - The crawl engine (pagination loop and author deduplication)
//! - The top-level harvest driver that wires the real collaborators together

mod engine;
mod pacing;

pub use engine::{AuthorOutcome, CrawlEngine, CrawlStats};
pub use pacing::Backoff;

use crate::api::InstagramClient;
use crate::state::{StateStore, TomlStateStore};
use crate::storage::SqliteRecordStore;
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Runs a complete harvest from the settings document at `settings_path`
///
/// This is the main entry point for a crawl. It will:
/// 1. Load the settings document, which also holds the cursor
/// 2. Optionally reset the cursor to the first page
/// 3. Build the HTTP client and open the record store
/// 4. Run the crawl engine until the feed is exhausted or an error stops it
///
/// The record store and client are dropped before this returns, whether the
/// run finished or failed.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tag_harvest::crawler::harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = harvest(Path::new("harvest.toml"), false).await?;
/// println!("Saved {} authors", stats.authors_saved);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(settings_path: &Path, reset: bool) -> Result<CrawlStats> {
    let mut state = TomlStateStore::open(settings_path)?;
    if reset {
        tracing::info!("Resetting cursor to the first page");
        state.reset()?;
    }

    let settings = state.settings().clone();
    tracing::debug!("Resuming from {}", state.load());

    let api = InstagramClient::new(&settings.api, &settings.session)?;
    let records = SqliteRecordStore::open(Path::new(&settings.database.path))?
        .with_claim_ttl(Duration::from_secs(settings.crawl.claim_ttl_secs));

    let mut engine = CrawlEngine::new(
        api,
        records,
        state,
        &settings.pacing,
        settings.crawl.dedupe,
    );
    engine.run().await
}
