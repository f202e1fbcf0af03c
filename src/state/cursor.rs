use serde::{Deserialize, Serialize};
use std::fmt;

/// Pagination continuation state for one hashtag feed
///
/// An absent page token and page number mean "start from the first page".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Cursor {
    /// Hashtag this cursor belongs to
    #[serde(default)]
    pub tag: String,

    /// Opaque continuation token returned by the previous page (`next_max_id`)
    #[serde(rename = "page-token", default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    /// Page number returned by the previous page (`next_page`)
    #[serde(rename = "page-number", default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u64>,
}

impl Cursor {
    /// Creates a cursor pointing at the first page of `tag`
    pub fn start(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            page_token: None,
            page_number: None,
        }
    }

    /// Returns true if no page of the feed has been consumed yet
    pub fn is_at_start(&self) -> bool {
        self.page_token.is_none() && self.page_number.is_none()
    }

    /// Keeps this cursor when it belongs to `tag`, otherwise starts over for `tag`
    pub fn for_tag(self, tag: &str) -> Self {
        if self.tag == tag {
            self
        } else {
            Self::start(tag)
        }
    }

    /// Moves the cursor to the continuation reported by a fetched page
    pub fn advance(&mut self, next_token: Option<String>, next_page: Option<u64>) {
        self.page_token = next_token.filter(|t| !t.is_empty());
        self.page_number = next_page;
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} page {} (token {})",
            self.tag,
            self.page_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.page_token.as_deref().unwrap_or("-")
        )
    }
}
