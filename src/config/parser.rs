use crate::config::types::Settings;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a settings document from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings document
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded, normalized and validated settings
/// * `Err(ConfigError)` - Failed to load, parse, or validate the document
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tag_harvest::config::load_settings;
///
/// let settings = load_settings(Path::new("harvest.toml")).unwrap();
/// println!("Hashtag: #{}", settings.crawl.hashtag);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_settings(&content)
}

/// Parses a settings document from a TOML string
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let mut settings: Settings = toml::from_str(content)?;
    normalize(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Trims every string value and strips a leading '#' from the hashtag
fn normalize(settings: &mut Settings) {
    let hashtag = settings.crawl.hashtag.trim();
    settings.crawl.hashtag = hashtag.trim_start_matches('#').trim().to_string();

    trim_in_place(&mut settings.session.cookie);
    trim_in_place(&mut settings.api.base_url);
    trim_in_place(&mut settings.api.user_agent);
    trim_in_place(&mut settings.api.app_id);
    trim_in_place(&mut settings.api.asbd_id);
    trim_in_place(&mut settings.api.ajax);
    settings.api.www_claim = trimmed_non_empty(settings.api.www_claim.take());
    settings.api.extra_headers = trimmed_non_empty(settings.api.extra_headers.take());
    trim_in_place(&mut settings.database.path);
    trim_in_place(&mut settings.output.log_path);

    trim_in_place(&mut settings.cursor.tag);
    settings.cursor.page_token = trimmed_non_empty(settings.cursor.page_token.take());
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trimmed_non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
