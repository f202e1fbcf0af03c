use crate::state::Cursor;
use serde::{Deserialize, Serialize};

/// Settings document for Tag-Harvest
///
/// The same document carries the static settings and the crawl cursor. It is
/// read once at startup and rewritten in full whenever the cursor advances.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub crawl: CrawlConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub cursor: Cursor,
}

/// What to crawl and how to deduplicate authors
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Hashtag whose feed is crawled, without the leading '#'
    pub hashtag: String,

    /// Strategy used to avoid storing the same author twice
    #[serde(default)]
    pub dedupe: DedupeMode,

    /// Seconds after which a claim left by a stopped crawler may be taken over
    #[serde(rename = "claim-ttl-secs", default = "default_claim_ttl_secs")]
    pub claim_ttl_secs: u64,
}

/// Claim lifetime used when `claim-ttl-secs` is not set
pub const DEFAULT_CLAIM_TTL_SECS: u64 = 120;

fn default_claim_ttl_secs() -> u64 {
    DEFAULT_CLAIM_TTL_SECS
}

/// Author deduplication strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeMode {
    /// Check, wait a random interval, check again, then fetch and insert
    #[default]
    Recheck,

    /// Claim the author id with an atomic insert-if-absent before fetching
    Claim,
}

/// Logged-in session used for every request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Raw cookie header value; must contain a `csrftoken` pair
    pub cookie: String,
}

/// Remote endpoint and the fixed headers sent with every request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(rename = "app-id", default = "default_app_id")]
    pub app_id: String,

    #[serde(rename = "asbd-id", default = "default_asbd_id")]
    pub asbd_id: String,

    #[serde(default = "default_ajax")]
    pub ajax: String,

    #[serde(rename = "www-claim", default, skip_serializing_if = "Option::is_none")]
    pub www_claim: Option<String>,

    /// Additional raw `Name: value` header lines, one per line
    #[serde(rename = "extra-headers", default, skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            app_id: default_app_id(),
            asbd_id: default_asbd_id(),
            ajax: default_ajax(),
            www_claim: None,
            extra_headers: None,
        }
    }
}

fn default_base_url() -> String {
    "https://i.instagram.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:100.0) Gecko/20100101 Firefox/100.0"
        .to_string()
}

fn default_app_id() -> String {
    "936619743392459".to_string()
}

fn default_asbd_id() -> String {
    "198387".to_string()
}

fn default_ajax() -> String {
    "72b68f0470c8".to_string()
}

/// Randomized delays, in seconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacingConfig {
    /// Lower bound of the pause between two feed pages
    #[serde(rename = "page-delay-min", default = "default_page_delay_min")]
    pub page_delay_min: u64,

    /// Upper bound of the pause between two feed pages
    #[serde(rename = "page-delay-max", default = "default_page_delay_max")]
    pub page_delay_max: u64,

    /// Lower bound of the pause before re-checking a newly seen author
    #[serde(rename = "author-delay-min", default = "default_author_delay_min")]
    pub author_delay_min: u64,

    /// Upper bound of the pause before re-checking a newly seen author
    #[serde(rename = "author-delay-max", default = "default_author_delay_max")]
    pub author_delay_max: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_min: default_page_delay_min(),
            page_delay_max: default_page_delay_max(),
            author_delay_min: default_author_delay_min(),
            author_delay_max: default_author_delay_max(),
        }
    }
}

impl PacingConfig {
    /// Pacing with every delay set to zero
    pub fn immediate() -> Self {
        Self {
            page_delay_min: 0,
            page_delay_max: 0,
            author_delay_min: 0,
            author_delay_max: 0,
        }
    }
}

fn default_page_delay_min() -> u64 {
    10
}

fn default_page_delay_max() -> u64 {
    30
}

fn default_author_delay_min() -> u64 {
    5
}

fn default_author_delay_max() -> u64 {
    20
}

/// Record store location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

/// Operational output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Append-only log file mirrored from stdout
    #[serde(rename = "log-path", default = "default_log_path")]
    pub log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
        }
    }
}

fn default_log_path() -> String {
    "./log.txt".to_string()
}
