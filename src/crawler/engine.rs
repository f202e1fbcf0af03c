//! Crawl engine - pagination loop and author deduplication
//!
//! The engine owns the cursor. For every page it:
//! 1. Fetches the page the cursor points at
//! 2. Moves the cursor to the page's continuation and saves it
//! 3. Processes every author on the page, in page order
//! 4. Stops if the page reports no more pages, otherwise pauses and repeats
//!
//! The cursor is saved before any author is processed, so a crash while
//! processing authors re-fetches at most the page in flight. Reprocessing a
//! page is harmless because authors that are already stored are skipped.
//!
//! Everything runs sequentially; the only suspension points are the two
//! randomized pauses.

use crate::api::FeedApi;
use crate::config::{DedupeMode, PacingConfig};
use crate::crawler::pacing::Backoff;
use crate::state::{CrawlPhase, Cursor, StateStore};
use crate::storage::{AuthorRecord, RecordStore};
use crate::Result;

/// Counters for one harvest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Feed pages fetched
    pub pages: u64,

    /// Author references seen across all pages, duplicates included
    pub authors_seen: u64,

    /// Profiles fetched and stored
    pub authors_saved: u64,

    /// Author references skipped because someone already stored or claimed them
    pub authors_skipped: u64,
}

/// What `process_author` did with one author reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorOutcome {
    /// A record already existed; nothing was fetched
    AlreadyStored,

    /// A record appeared while waiting for the re-check; nothing was fetched
    StoredDuringWait,

    /// Another crawler holds the claim for this author; nothing was fetched
    ClaimedElsewhere,

    /// The profile was fetched and a new record stored
    Saved,
}

/// Drives one hashtag feed from the saved cursor to the end of the feed
pub struct CrawlEngine<A, R, S> {
    api: A,
    records: R,
    state: S,
    cursor: Cursor,
    phase: CrawlPhase,
    page_backoff: Backoff,
    author_backoff: Backoff,
    dedupe: DedupeMode,
    stats: CrawlStats,
}

impl<A, R, S> CrawlEngine<A, R, S>
where
    A: FeedApi,
    R: RecordStore,
    S: StateStore,
{
    /// Creates an engine positioned at the cursor `state` holds
    pub fn new(api: A, records: R, state: S, pacing: &PacingConfig, dedupe: DedupeMode) -> Self {
        let cursor = state.load();

        Self {
            api,
            records,
            state,
            cursor,
            phase: CrawlPhase::FetchingPage,
            page_backoff: Backoff::between_pages(pacing),
            author_backoff: Backoff::before_recheck(pacing),
            dedupe,
            stats: CrawlStats::default(),
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consumes the engine, handing back its collaborators
    pub fn into_parts(self) -> (A, R, S) {
        (self.api, self.records, self.state)
    }

    /// Runs the pagination loop until the feed is exhausted
    ///
    /// Returns the run's counters. Any error, `Blocked` included, stops the
    /// loop immediately; the cursor of the last fetched page stays saved.
    pub async fn run(&mut self) -> Result<CrawlStats> {
        tracing::info!("Start parsing #{}", self.cursor.tag);
        if !self.cursor.is_at_start() {
            tracing::info!("Resuming from saved cursor {}", self.cursor);
        }

        loop {
            if self.advance().await?.is_terminal() {
                break;
            }

            let pause = self.page_backoff.wait().await;
            tracing::debug!("Waited {:.1}s before the next page", pause.as_secs_f64());
        }

        tracing::info!(
            "Harvest of #{} finished: {} pages, {} authors seen, {} saved, {} skipped",
            self.cursor.tag,
            self.stats.pages,
            self.stats.authors_seen,
            self.stats.authors_saved,
            self.stats.authors_skipped
        );

        Ok(self.stats)
    }

    /// Fetches and processes one page
    ///
    /// Returns `FetchingPage` if the feed has more pages and `Terminal` if it
    /// does not. The pause between pages is left to the caller.
    pub async fn advance(&mut self) -> Result<CrawlPhase> {
        let processing = self.phase.transition(CrawlPhase::ProcessingAuthors)?;

        let page = self.api.fetch_tagged_page(&self.cursor).await?;
        self.stats.pages += 1;

        self.cursor.advance(page.next_max_id.clone(), page.next_page);
        self.state.save(&self.cursor)?;
        self.phase = processing;

        let author_ids: Vec<&str> = page.author_ids().collect();
        tracing::info!(
            "Fetched page {} of #{} with {} posts",
            self.stats.pages,
            self.cursor.tag,
            author_ids.len()
        );

        for author_id in author_ids {
            self.process_author(author_id).await?;
        }

        if !page.more_available {
            self.phase = self.phase.transition(CrawlPhase::Terminal)?;
            tracing::info!("That's it, there are no more posts.");
            return Ok(self.phase);
        }

        if self.cursor.is_at_start() {
            tracing::warn!("Feed reports more posts but returned no continuation; the first page will be requested again");
        }

        self.phase = self.phase.transition(CrawlPhase::FetchingPage)?;
        tracing::info!(
            "Next page: {}",
            self.cursor
                .page_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        Ok(self.phase)
    }

    /// Stores `author_id` unless it is already stored
    ///
    /// With `DedupeMode::Recheck` a newly seen author is checked, the engine
    /// waits a random interval, and the author is checked again before the
    /// profile is fetched. This narrows but does not close the window in which
    /// another crawler sharing the record store could store the same author.
    ///
    /// With `DedupeMode::Claim` the author id is claimed through an atomic
    /// insert-if-absent instead, and only the claim holder fetches the profile.
    pub async fn process_author(&mut self, author_id: &str) -> Result<AuthorOutcome> {
        self.stats.authors_seen += 1;

        if self.records.exists(author_id)? {
            self.stats.authors_skipped += 1;
            return Ok(AuthorOutcome::AlreadyStored);
        }

        match self.dedupe {
            DedupeMode::Recheck => {
                let pause = self.author_backoff.wait().await;
                tracing::trace!(
                    "Re-checking author {} after {:.1}s",
                    author_id,
                    pause.as_secs_f64()
                );

                if self.records.exists(author_id)? {
                    tracing::debug!("Author {} was stored while waiting", author_id);
                    self.stats.authors_skipped += 1;
                    return Ok(AuthorOutcome::StoredDuringWait);
                }

                self.fetch_and_store(author_id).await?;
            }
            DedupeMode::Claim => {
                if !self.records.try_claim(author_id, &self.cursor.tag)? {
                    tracing::debug!("Author {} is claimed by another crawler", author_id);
                    self.stats.authors_skipped += 1;
                    return Ok(AuthorOutcome::ClaimedElsewhere);
                }

                if let Err(e) = self.fetch_and_store(author_id).await {
                    if let Err(release_err) = self.records.release_claim(author_id) {
                        tracing::warn!(
                            "Failed to release claim on author {}: {}",
                            author_id,
                            release_err
                        );
                    }
                    return Err(e);
                }
            }
        }

        self.stats.authors_saved += 1;
        Ok(AuthorOutcome::Saved)
    }

    async fn fetch_and_store(&mut self, author_id: &str) -> Result<()> {
        tracing::info!("Fetching and saving user {}", author_id);

        let profile = self.api.fetch_author_profile(author_id).await?;
        let record = AuthorRecord::from_profile(&profile, &self.cursor.tag);
        self.records.insert(&record)?;

        Ok(())
    }
}
