//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Cursor`: the pagination continuation (tag, page token, page number)
//! - `CrawlPhase`: the engine's pagination state machine
//! - `StateStore`: durable cursor persistence, implemented by `TomlStateStore`

mod crawl_phase;
mod cursor;
mod store;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use cursor::Cursor;
pub use store::{StateStore, TomlStateStore};
