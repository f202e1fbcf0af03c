//! Wire types for the tag feed and profile endpoints
//!
//! Only the members the harvester reads are modelled. Decoding is lenient
//! where the remote side is known to vary: ids arrive as numbers or strings,
//! `more_available` is boolean-like, and some sections carry no media list.

use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

/// One page of the hashtag feed (`/api/v1/tags/{tag}/sections/`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPage {
    #[serde(default)]
    pub sections: Vec<Section>,

    /// Continuation token for the next page
    #[serde(default, deserialize_with = "optional_text")]
    pub next_max_id: Option<String>,

    /// Page number to request next
    #[serde(default, deserialize_with = "optional_number")]
    pub next_page: Option<u64>,

    #[serde(default, deserialize_with = "bool_like")]
    pub more_available: bool,
}

impl TagPage {
    /// Author ids in page order: section order, then media order within a section
    pub fn author_ids(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .filter_map(|section| section.layout_content.as_ref())
            .flat_map(|content| content.medias.iter())
            .map(|item| item.media.user.pk.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub layout_content: Option<LayoutContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutContent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub medias: Vec<MediaItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaItem {
    pub media: Media,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub user: MediaOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaOwner {
    #[serde(deserialize_with = "author_id")]
    pub pk: String,
}

/// Envelope of `/api/v1/users/{id}/info/`
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoResponse {
    pub user: Profile,
}

/// An author's public profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "author_id")]
    pub pk: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub biography: String,

    #[serde(default, deserialize_with = "optional_text")]
    pub contact_phone_number: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub whatsapp_number: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub public_phone_number: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub public_phone_country_code: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub public_email: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub city_name: Option<String>,

    #[serde(default, deserialize_with = "optional_text")]
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Signed(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }

    /// Truthiness of a loosely typed flag: "", "0", 0 and false are false
    fn truthy(&self) -> bool {
        match self {
            Scalar::Text(s) => !(s.is_empty() || s == "0"),
            Scalar::Unsigned(n) => *n != 0,
            Scalar::Signed(n) => *n != 0,
            Scalar::Float(n) => *n != 0.0,
            Scalar::Bool(b) => *b,
        }
    }
}

fn author_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Scalar::Unsigned(n) => Ok(n.to_string()),
        Scalar::Signed(n) => Ok(n.to_string()),
        _ => Err(D::Error::custom("author id must be a non-empty string or integer")),
    }
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Unsigned(n)) => Ok(Some(n)),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid page number '{}'", s))),
        Some(_) => Err(D::Error::custom("page number must be a non-negative integer")),
    }
}

fn bool_like<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.is_some_and(|v| v.truthy()))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<MediaItem>, D::Error> {
    Ok(Option::<Vec<MediaItem>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_author_ids_follow_page_order() {
        let page: TagPage = serde_json::from_value(json!({
            "sections": [
                {"layout_content": {"medias": [
                    {"media": {"user": {"pk": 1}}},
                    {"media": {"user": {"pk": "2"}}}
                ]}},
                {"layout_content": {"one_by_two_item": {}}},
                {"layout_content": {"medias": [
                    {"media": {"user": {"pk": 3}}}
                ]}}
            ],
            "next_max_id": "QVFE",
            "next_page": 2,
            "more_available": true
        }))
        .unwrap();

        let ids: Vec<&str> = page.author_ids().collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(page.next_max_id.as_deref(), Some("QVFE"));
        assert_eq!(page.next_page, Some(2));
        assert!(page.more_available);
    }

    #[test]
    fn test_more_available_is_boolean_like() {
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
            (json!(""), false),
            (json!(null), false),
        ] {
            let page: TagPage =
                serde_json::from_value(json!({ "sections": [], "more_available": raw })).unwrap();
            assert_eq!(page.more_available, expected, "more_available = {}", raw);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let page: TagPage = serde_json::from_value(json!({ "status": "ok" })).unwrap();
        assert!(page.sections.is_empty());
        assert_eq!(page.next_max_id, None);
        assert_eq!(page.next_page, None);
        assert!(!page.more_available);
    }

    #[test]
    fn test_next_page_as_string() {
        let page: TagPage =
            serde_json::from_value(json!({ "next_page": "5", "more_available": true })).unwrap();
        assert_eq!(page.next_page, Some(5));
    }

    #[test]
    fn test_media_without_owner_is_rejected() {
        let result: Result<TagPage, _> = serde_json::from_value(json!({
            "sections": [{"layout_content": {"medias": [{"media": {}}]}}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_optional_fields() {
        let info: UserInfoResponse = serde_json::from_value(json!({
            "user": {
                "pk": 123,
                "username": "a",
                "full_name": "B",
                "biography": "bio",
                "public_email": "a@example.com",
                "public_phone_country_code": 7,
                "city_name": null
            }
        }))
        .unwrap();

        let profile = info.user;
        assert_eq!(profile.pk, "123");
        assert_eq!(profile.public_email.as_deref(), Some("a@example.com"));
        assert_eq!(profile.public_phone_country_code.as_deref(), Some("7"));
        assert_eq!(profile.city_name, None);
        assert_eq!(profile.contact_phone_number, None);
        assert_eq!(profile.category, None);
    }
}
