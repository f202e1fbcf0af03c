//! Settings module for Tag-Harvest
//!
//! This module handles loading, normalizing, and validating the TOML settings
//! document. The document also carries the crawl cursor, which the state store
//! rewrites after every page.
//!
//! # Example
//!
//! ```no_run
//! use tag_harvest::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("harvest.toml")).unwrap();
//! println!("Crawling #{}", settings.crawl.hashtag);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, CrawlConfig, DatabaseConfig, DedupeMode, OutputConfig, PacingConfig,
    SessionConfig, Settings, DEFAULT_CLAIM_TTL_SECS,
};

// Re-export parser functions
pub use parser::{load_settings, parse_settings};
