//! Remote API module
//!
//! This module contains everything that talks to the remote service:
//! - Wire types for the tag feed and profile responses
//! - The `FeedApi` trait the crawl engine depends on
//! - The reqwest-based `InstagramClient` implementation
//! - Header and cookie helpers

mod client;
mod headers;
mod types;

pub use client::{decode_body, FeedApi, InstagramClient};
pub use headers::{build_default_headers, parse_cookie, parse_raw_headers};
pub use types::{LayoutContent, Media, MediaItem, MediaOwner, Profile, Section, TagPage, UserInfoResponse};
