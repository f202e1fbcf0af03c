//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Tag-Harvest database.

/// SQL schema for the database
///
/// `users.instagram_user_id` is indexed but not unique: authors are kept
/// unique by checking before inserting. `author_claims` is the atomic
/// insert-if-absent marker used by the claim dedupe strategy; each claim
/// records which store handle took it and when.
pub const SCHEMA_SQL: &str = r#"
-- One row per harvested author
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    instagram_user_id TEXT NOT NULL,
    login TEXT NOT NULL,
    name TEXT NOT NULL,
    bio TEXT NOT NULL,
    contact_phone_number TEXT,
    whatsapp_number TEXT,
    public_phone_number TEXT,
    public_phone_country_code TEXT,
    public_email TEXT,
    city_name TEXT,
    category TEXT,
    tag TEXT NOT NULL,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_instagram_user_id ON users(instagram_user_id);
CREATE INDEX IF NOT EXISTS idx_users_tag ON users(tag);

-- Author ids claimed by a crawler before their profile is fetched.
-- claimed_at is in Unix milliseconds; an old claim may be taken over.
CREATE TABLE IF NOT EXISTS author_claims (
    instagram_user_id TEXT PRIMARY KEY,
    tag TEXT NOT NULL,
    owner TEXT NOT NULL,
    claimed_at INTEGER NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
