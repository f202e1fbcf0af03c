//! Remote feed client
//!
//! Wraps the two remote operations the crawler needs:
//! - fetching the next page of a hashtag feed for a cursor
//! - fetching an author's profile by id
//!
//! An empty or falsy body is how the remote side answers a banned session, so
//! both operations turn it into `HarvestError::Blocked`. Transport failures and
//! non-2xx statuses propagate as they are; nothing is retried.

use crate::api::headers::build_default_headers;
use crate::api::types::{Profile, TagPage, UserInfoResponse};
use crate::config::{ApiConfig, SessionConfig};
use crate::state::Cursor;
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// The remote operations used by the crawl engine
#[async_trait]
pub trait FeedApi {
    /// Fetches the feed page `cursor` points at
    async fn fetch_tagged_page(&self, cursor: &Cursor) -> Result<TagPage>;

    /// Fetches the full profile of `author_id`
    async fn fetch_author_profile(&self, author_id: &str) -> Result<Profile>;
}

/// reqwest-backed client for the private web API
#[derive(Debug, Clone)]
pub struct InstagramClient {
    client: Client,
    base_url: Url,
}

impl InstagramClient {
    /// Builds a client that sends the session cookie and fixed headers on every request
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tag_harvest::api::InstagramClient;
    /// use tag_harvest::config::{ApiConfig, SessionConfig};
    ///
    /// let session = SessionConfig {
    ///     cookie: "csrftoken=abc; sessionid=xyz".to_string(),
    /// };
    /// let client = InstagramClient::new(&ApiConfig::default(), &session).unwrap();
    /// ```
    pub fn new(api: &ApiConfig, session: &SessionConfig) -> Result<Self> {
        let headers = build_default_headers(api, session)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&api.base_url)?,
        })
    }

    /// `{base}/api/v1/tags/{tag}/sections/`
    pub fn tag_sections_url(&self, tag: &str) -> Result<Url> {
        self.endpoint(&["api", "v1", "tags", tag, "sections", ""])
    }

    /// `{base}/api/v1/users/{id}/info/`
    pub fn user_info_url(&self, author_id: &str) -> Result<Url> {
        self.endpoint(&["api", "v1", "users", author_id, "info", ""])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends `request` and decodes its body, detecting the banned-session shape
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        let response = response
            .error_for_status()
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let body = response.text().await?;
        decode_body(operation, url.as_str(), &body)
    }
}

#[async_trait]
impl FeedApi for InstagramClient {
    async fn fetch_tagged_page(&self, cursor: &Cursor) -> Result<TagPage> {
        let url = self.tag_sections_url(&cursor.tag)?;
        let form = page_form(cursor);

        tracing::debug!("Requesting feed page {}", cursor);
        let request = self.client.post(url.clone()).form(&form);
        self.send_json("tag feed page", &url, request).await
    }

    async fn fetch_author_profile(&self, author_id: &str) -> Result<Profile> {
        let url = self.user_info_url(author_id)?;

        tracing::debug!("Requesting profile {}", author_id);
        let request = self.client.get(url.clone());
        let info: UserInfoResponse = self.send_json("author profile", &url, request).await?;
        Ok(info.user)
    }
}

/// Form fields of a feed page request; an empty continuation is omitted
fn page_form(cursor: &Cursor) -> Vec<(&'static str, String)> {
    let mut form = vec![("include_persistent", "0".to_string())];
    if let Some(token) = &cursor.page_token {
        form.push(("max_id", token.clone()));
    }
    if let Some(page) = cursor.page_number {
        form.push(("page", page.to_string()));
    }
    form.push(("surface", "grid".to_string()));
    form.push(("tab", "recent".to_string()));
    form
}

/// Decodes a response body into `T`
///
/// A body that is empty, is not JSON, or is a falsy JSON value means the
/// session was banned and yields `Blocked`. Anything else that does not match
/// `T` is a `Decode` error.
pub fn decode_body<T: DeserializeOwned>(
    operation: &'static str,
    url: &str,
    body: &str,
) -> Result<T> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) if !is_falsy(&value) => value,
        _ => {
            tracing::debug!("{} returned an empty or falsy body from {}", operation, url);
            return Err(HarvestError::Blocked { operation });
        }
    };

    serde_json::from_value(value).map_err(|source| HarvestError::Decode {
        url: url.to_string(),
        source,
    })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}
