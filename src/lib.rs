//! Tag-Harvest: a resumable hashtag feed author harvester
//!
//! This crate pages through a hashtag feed, discovers the authors referenced on
//! each page, fetches every new author's profile once and records it, skipping
//! authors that are already stored.

pub mod api;
pub mod config;
pub mod crawler;
pub mod logging;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Tag-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The remote service answered with an empty or falsy body, which means
    /// the session has been banned. Nothing can be recovered in this run.
    #[error("Account has been banned! ({operation} returned an empty response)")]
    Blocked { operation: &'static str },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unexpected response shape from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

impl HarvestError {
    /// Returns true if this error is the fatal ban signal
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in settings: {0}")]
    InvalidUrl(String),
}

/// Errors raised while persisting the cursor document
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for Tag-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Settings;
pub use crawler::{harvest, CrawlEngine, CrawlStats};
pub use state::{CrawlPhase, Cursor};
