use crate::api::parse_cookie;
use crate::config::types::{
    ApiConfig, CrawlConfig, DedupeMode, PacingConfig, SessionConfig, Settings,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire settings document
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_crawl_config(&settings.crawl)?;
    validate_session_config(&settings.session)?;
    validate_api_config(&settings.api)?;
    validate_pacing_config(&settings.pacing)?;
    validate_claim_ttl(&settings.crawl, &settings.api)?;

    if settings.database.path.is_empty() {
        return Err(ConfigError::Validation(
            "database.path cannot be empty".to_string(),
        ));
    }

    if settings.output.log_path.is_empty() {
        return Err(ConfigError::Validation(
            "output.log-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the hashtag
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.hashtag.is_empty() {
        return Err(ConfigError::Validation(
            "crawl.hashtag cannot be empty".to_string(),
        ));
    }

    if config
        .hashtag
        .chars()
        .any(|c| c.is_whitespace() || c == '#' || c == '/')
    {
        return Err(ConfigError::Validation(format!(
            "crawl.hashtag must be a single tag without spaces, '#' or '/', got '{}'",
            config.hashtag
        )));
    }

    Ok(())
}

/// Validates the session cookie
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.cookie.is_empty() {
        return Err(ConfigError::Validation(
            "session.cookie cannot be empty".to_string(),
        ));
    }

    let has_csrf = parse_cookie(&config.cookie)
        .get("csrftoken")
        .is_some_and(|token| !token.is_empty());

    if !has_csrf {
        return Err(ConfigError::Validation(
            "session.cookie must contain a csrftoken pair".to_string(),
        ));
    }

    Ok(())
}

/// Validates the remote endpoint settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api.base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "api.base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "api.timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "api.user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// A claim must outlive the profile request made while holding it
fn validate_claim_ttl(crawl: &CrawlConfig, api: &ApiConfig) -> Result<(), ConfigError> {
    if crawl.dedupe == DedupeMode::Claim && crawl.claim_ttl_secs <= api.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "crawl.claim-ttl-secs ({}) must exceed api.timeout-secs ({})",
            crawl.claim_ttl_secs, api.timeout_secs
        )));
    }

    Ok(())
}

/// Validates that every delay range is well formed
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.page_delay_min > config.page_delay_max {
        return Err(ConfigError::Validation(format!(
            "pacing.page-delay-min ({}) must not exceed pacing.page-delay-max ({})",
            config.page_delay_min, config.page_delay_max
        )));
    }

    if config.author_delay_min > config.author_delay_max {
        return Err(ConfigError::Validation(format!(
            "pacing.author-delay-min ({}) must not exceed pacing.author-delay-max ({})",
            config.author_delay_min, config.author_delay_max
        )));
    }

    Ok(())
}
