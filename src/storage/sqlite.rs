//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageResult};
use crate::storage::AuthorRecord;
use crate::config::DEFAULT_CLAIM_TTL_SECS;
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// SQLite record store backend
pub struct SqliteRecordStore {
    conn: Connection,
    /// Identifies the claims taken through this handle
    owner: String,
    /// Age after which a claim held by anyone may be taken over
    claim_ttl: Duration,
}

impl SqliteRecordStore {
    /// Opens or creates the record database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRecordStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn open(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // WAL lets a second harvester read while this one writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::with_connection(conn))
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            owner: format!("{}-{:08x}", std::process::id(), rand::random::<u32>()),
            claim_ttl: Duration::from_secs(DEFAULT_CLAIM_TTL_SECS),
        }
    }

    /// Sets how old a claim must be before `try_claim` takes it over
    ///
    /// A crawler that is killed while holding a claim never releases it, so
    /// the ttl should exceed the longest profile request.
    pub fn with_claim_ttl(mut self, ttl: Duration) -> Self {
        self.claim_ttl = ttl;
        self
    }

    /// Gets the first stored record for an author
    pub fn get(&self, author_id: &str) -> StorageResult<Option<AuthorRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT instagram_user_id, login, name, bio, contact_phone_number,
                 whatsapp_number, public_phone_number, public_phone_country_code,
                 public_email, city_name, category, tag
                 FROM users WHERE instagram_user_id = ?1 ORDER BY id LIMIT 1",
                params![author_id],
                |row| {
                    Ok(AuthorRecord {
                        instagram_user_id: row.get(0)?,
                        login: row.get(1)?,
                        name: row.get(2)?,
                        bio: row.get(3)?,
                        contact_phone_number: row.get(4)?,
                        whatsapp_number: row.get(5)?,
                        public_phone_number: row.get(6)?,
                        public_phone_country_code: row.get(7)?,
                        public_email: row.get(8)?,
                        city_name: row.get(9)?,
                        category: row.get(10)?,
                        tag: row.get(11)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Counts stored rows for one author id
    ///
    /// More than one row means two harvesters raced past the existence check.
    pub fn count_rows_for(&self, author_id: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE instagram_user_id = ?1",
            params![author_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Gets total record count
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Gets count of distinct authors
    pub fn count_distinct_authors(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT instagram_user_id) FROM users",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Gets record counts per hashtag, largest first
    pub fn count_by_tag(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT tag, COUNT(*) as count FROM users GROUP BY tag ORDER BY count DESC, tag",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    /// Counts records that carry at least one way to contact the author
    pub fn count_with_contact(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE
             COALESCE(contact_phone_number, '') <> ''
             OR COALESCE(whatsapp_number, '') <> ''
             OR COALESCE(public_phone_number, '') <> ''
             OR COALESCE(public_email, '') <> ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl RecordStore for SqliteRecordStore {
    fn exists(&self, author_id: &str) -> StorageResult<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE instagram_user_id = ?1)",
            params![author_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert(&mut self, record: &AuthorRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (instagram_user_id, login, name, bio, contact_phone_number,
             whatsapp_number, public_phone_number, public_phone_country_code, public_email,
             city_name, category, tag, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.instagram_user_id,
                record.login,
                record.name,
                record.bio,
                record.contact_phone_number,
                record.whatsapp_number,
                record.public_phone_number,
                record.public_phone_country_code,
                record.public_email,
                record.city_name,
                record.category,
                record.tag,
                now
            ],
        )?;
        Ok(())
    }

    fn try_claim(&mut self, author_id: &str, tag: &str) -> StorageResult<bool> {
        let now = Utc::now().timestamp_millis();
        let ttl_ms = i64::try_from(self.claim_ttl.as_millis()).unwrap_or(i64::MAX);
        let stale_before = now.saturating_sub(ttl_ms);

        // Inserts a new claim or takes over one older than the ttl, in one statement
        let changed = self.conn.execute(
            "INSERT INTO author_claims (instagram_user_id, tag, owner, claimed_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(instagram_user_id) DO UPDATE SET
                 tag = excluded.tag,
                 owner = excluded.owner,
                 claimed_at = excluded.claimed_at
             WHERE author_claims.claimed_at < ?5",
            params![author_id, tag, self.owner, now, stale_before],
        )?;
        Ok(changed == 1)
    }

    fn release_claim(&mut self, author_id: &str) -> StorageResult<()> {
        // A claim taken over by another crawler is not ours to drop
        self.conn.execute(
            "DELETE FROM author_claims WHERE instagram_user_id = ?1 AND owner = ?2",
            params![author_id, self.owner],
        )?;
        Ok(())
    }
}
