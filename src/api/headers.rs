//! Request header and cookie helpers

use crate::config::{ApiConfig, SessionConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, USER_AGENT};
use std::collections::HashMap;

const WEB_ORIGIN: &str = "https://www.instagram.com";

/// Splits a raw cookie header (`a=1; b=2`) into name/value pairs
///
/// Values may themselves contain '='; only the first one separates the pair.
pub fn parse_cookie(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Parses a block of `Name: value` lines, skipping blank lines
///
/// Values may contain ':'; only the first one separates name and value.
pub fn parse_raw_headers(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

/// Builds the headers sent with every request
pub fn build_default_headers(
    api: &ApiConfig,
    session: &SessionConfig,
) -> Result<HeaderMap, ConfigError> {
    let cookies = parse_cookie(&session.cookie);
    let csrf = cookies
        .get("csrftoken")
        .ok_or_else(|| ConfigError::Validation("session.cookie has no csrftoken".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("user-agent", &api.user_agent)?);
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static(WEB_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(WEB_ORIGIN));
    headers.insert(
        HeaderName::from_static("x-instagram-ajax"),
        header_value("ajax", &api.ajax)?,
    );
    headers.insert(
        HeaderName::from_static("x-ig-app-id"),
        header_value("app-id", &api.app_id)?,
    );
    headers.insert(
        HeaderName::from_static("x-asbd-id"),
        header_value("asbd-id", &api.asbd_id)?,
    );
    if let Some(claim) = &api.www_claim {
        headers.insert(
            HeaderName::from_static("x-ig-www-claim"),
            header_value("www-claim", claim)?,
        );
    }
    headers.insert(COOKIE, header_value("cookie", &session.cookie)?);
    headers.insert(
        HeaderName::from_static("x-csrftoken"),
        header_value("csrftoken", csrf)?,
    );

    if let Some(extra) = &api.extra_headers {
        for (name, value) in parse_raw_headers(extra) {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ConfigError::Validation(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = header_value(name.as_str(), &value)?;
            headers.insert(name, value);
        }
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid value for header {}: {}", name, e)))
}
