//! Storage module for persisting harvested authors
//!
//! This module handles all database operations for the harvester:
//! - SQLite database initialization and schema management
//! - Author record existence checks and inserts
//! - Author id claims for the atomic dedupe strategy

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRecordStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::api::Profile;

/// Represents a harvested author in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub instagram_user_id: String,
    pub login: String,
    pub name: String,
    pub bio: String,
    pub contact_phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub public_phone_number: Option<String>,
    pub public_phone_country_code: Option<String>,
    pub public_email: Option<String>,
    pub city_name: Option<String>,
    pub category: Option<String>,
    /// Hashtag whose feed led to this author
    pub tag: String,
}

impl AuthorRecord {
    /// Maps a fetched profile to a record; absent optional fields stay `None`
    pub fn from_profile(profile: &Profile, tag: &str) -> Self {
        Self {
            instagram_user_id: profile.pk.clone(),
            login: profile.username.clone(),
            name: profile.full_name.clone(),
            bio: profile.biography.clone(),
            contact_phone_number: profile.contact_phone_number.clone(),
            whatsapp_number: profile.whatsapp_number.clone(),
            public_phone_number: profile.public_phone_number.clone(),
            public_phone_country_code: profile.public_phone_country_code.clone(),
            public_email: profile.public_email.clone(),
            city_name: profile.city_name.clone(),
            category: profile.category.clone(),
            tag: tag.to_string(),
        }
    }
}
