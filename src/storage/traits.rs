//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::AuthorRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the author record store used by the crawl engine
///
/// Nothing here is transactional. `exists` followed by `insert` is a
/// check-then-act sequence; only `try_claim` is atomic.
pub trait RecordStore {
    /// Returns true if a record for `author_id` has already been stored
    fn exists(&self, author_id: &str) -> StorageResult<bool>;

    /// Stores a new author record
    fn insert(&mut self, record: &AuthorRecord) -> StorageResult<()>;

    /// Atomically claims `author_id` for this crawler
    ///
    /// Returns false if the id is held by a claim that has not expired yet.
    /// An expired claim, left behind by a crawler that stopped before storing
    /// the author, is taken over.
    fn try_claim(&mut self, author_id: &str, tag: &str) -> StorageResult<bool>;

    /// Drops this crawler's claim on an author whose profile could not be stored
    fn release_claim(&mut self, author_id: &str) -> StorageResult<()>;
}
