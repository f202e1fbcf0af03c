//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the remote API and run the full
//! harvest cycle end-to-end: settings file, HTTP client, SQLite record store.

use serde_json::json;
use std::path::{Path, PathBuf};
use tag_harvest::config::load_settings;
use tag_harvest::crawler::harvest;
use tag_harvest::state::{StateStore, TomlStateStore};
use tag_harvest::storage::{AuthorRecord, RecordStore, SqliteRecordStore};
use tag_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const SECTIONS_PATH: &str = "/api/v1/tags/streetfood/sections/";

/// Matches feed requests that carry no continuation token
struct FirstPage;

impl Match for FirstPage {
    fn matches(&self, request: &Request) -> bool {
        !String::from_utf8_lossy(&request.body).contains("max_id=")
    }
}

/// Writes a settings document pointing at the mock server
fn write_settings(dir: &TempDir, base_url: &str, extra: &str) -> PathBuf {
    let settings_path = dir.path().join("harvest.toml");
    let db_path = dir.path().join("authors.db");
    let content = format!(
        r#"
[crawl]
hashtag = "streetfood"

[session]
cookie = "csrftoken=abc123; sessionid=xyz"

[api]
base-url = "{}"
timeout-secs = 5

[pacing]
page-delay-min = 0
page-delay-max = 0
author-delay-min = 0
author-delay-max = 0

[database]
path = "{}"

[output]
log-path = "{}"
{}
"#,
        base_url,
        db_path.display(),
        dir.path().join("log.txt").display(),
        extra
    );
    std::fs::write(&settings_path, content).expect("Failed to write settings");
    settings_path
}

fn enable_claim_mode(settings_path: &Path) {
    let content = std::fs::read_to_string(settings_path)
        .unwrap()
        .replace("hashtag = \"streetfood\"", "hashtag = \"streetfood\"\ndedupe = \"claim\"");
    std::fs::write(settings_path, content).unwrap();
}

fn open_records(settings_path: &Path) -> SqliteRecordStore {
    let settings = load_settings(settings_path).expect("Failed to reload settings");
    SqliteRecordStore::open(Path::new(&settings.database.path)).expect("Failed to open DB")
}

fn feed_page(ids: &[&str], next_max_id: Option<&str>, next_page: Option<u64>, more: bool) -> serde_json::Value {
    let medias: Vec<_> = ids
        .iter()
        .map(|id| json!({ "media": { "id": format!("m{}", id), "user": { "pk": id } } }))
        .collect();
    json!({
        "sections": [
            { "layout_type": "media_grid", "layout_content": { "medias": medias } }
        ],
        "next_max_id": next_max_id,
        "next_page": next_page,
        "more_available": more,
        "status": "ok"
    })
}

async fn mount_profile(server: &MockServer, id: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/users/{}/info/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "pk": id.parse::<u64>().unwrap(),
                "username": format!("user{}", id),
                "full_name": format!("User {}", id),
                "biography": "",
                "public_email": format!("{}@example.com", id)
            },
            "status": "ok"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_two_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(FirstPage)
        .and(header("x-csrftoken", "abc123"))
        .and(header("cookie", "csrftoken=abc123; sessionid=xyz"))
        .and(body_string_contains("tab=recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(
            &["1", "2"],
            Some("P2"),
            Some(2),
            true,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(body_string_contains("max_id=P2"))
        .and(body_string_contains("page=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(
            &["2", "3"],
            None,
            None,
            false,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    for id in ["1", "2", "3"] {
        mount_profile(&mock_server, id, 1).await;
    }

    let stats = harvest(&settings_path, false).await.expect("Harvest failed");

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.authors_seen, 4);
    assert_eq!(stats.authors_saved, 3);
    assert_eq!(stats.authors_skipped, 1);

    let records = open_records(&settings_path);
    assert_eq!(records.count().unwrap(), 3);
    assert_eq!(records.count_distinct_authors().unwrap(), 3);
    assert_eq!(
        records.get("3").unwrap().unwrap().public_email.as_deref(),
        Some("3@example.com")
    );

    // The exhausted feed leaves no continuation behind
    let store = TomlStateStore::open(&settings_path).unwrap();
    assert!(store.load().is_at_start());
    assert_eq!(store.load().tag, "streetfood");
}

#[tokio::test]
async fn test_resume_from_saved_cursor() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(
        &dir,
        &mock_server.uri(),
        "[cursor]\ntag = \"streetfood\"\npage-token = \"QVFE\"\npage-number = 4\n",
    );

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[], None, None, false)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(body_string_contains("max_id=QVFE"))
        .and(body_string_contains("page=4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[], None, None, false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = harvest(&settings_path, false).await.expect("Harvest failed");
    assert_eq!(stats.pages, 1);
}

#[tokio::test]
async fn test_reset_starts_from_first_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(
        &dir,
        &mock_server.uri(),
        "[cursor]\ntag = \"streetfood\"\npage-token = \"QVFE\"\npage-number = 4\n",
    );

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[], None, None, false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    harvest(&settings_path, true).await.expect("Harvest failed");
}

#[tokio::test]
async fn test_field_mapping_end_to_end() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&["123"], None, None, false)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/123/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "pk": "123", "username": "a", "full_name": "B", "biography": "bio" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    harvest(&settings_path, false).await.expect("Harvest failed");

    let record = open_records(&settings_path)
        .get("123")
        .unwrap()
        .expect("Author 123 should be stored");
    assert_eq!(
        record,
        AuthorRecord {
            instagram_user_id: "123".to_string(),
            login: "a".to_string(),
            name: "B".to_string(),
            bio: "bio".to_string(),
            contact_phone_number: None,
            whatsapp_number: None,
            public_phone_number: None,
            public_phone_country_code: None,
            public_email: None,
            city_name: None,
            category: None,
            tag: "streetfood".to_string(),
        }
    );
}

#[tokio::test]
async fn test_known_authors_are_not_fetched() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");

    {
        let mut records = open_records(&settings_path);
        let known = AuthorRecord {
            instagram_user_id: "1".to_string(),
            login: "user1".to_string(),
            name: "User 1".to_string(),
            bio: String::new(),
            contact_phone_number: None,
            whatsapp_number: None,
            public_phone_number: None,
            public_phone_country_code: None,
            public_email: None,
            city_name: None,
            category: None,
            tag: "coffee".to_string(),
        };
        records.insert(&known).unwrap();
    }

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&["1", "2"], None, None, false)))
        .mount(&mock_server)
        .await;

    mount_profile(&mock_server, "1", 0).await;
    mount_profile(&mock_server, "2", 1).await;

    let stats = harvest(&settings_path, false).await.expect("Harvest failed");

    assert_eq!(stats.authors_saved, 1);
    assert_eq!(stats.authors_skipped, 1);
    let records = open_records(&settings_path);
    assert_eq!(records.count_rows_for("1").unwrap(), 1);
    assert_eq!(records.get("1").unwrap().unwrap().tag, "coffee");
}

#[tokio::test]
async fn test_empty_profile_body_is_fatal_and_cursor_is_kept() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(FirstPage)
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(
            &["1", "2"],
            Some("P2"),
            Some(2),
            true,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .and(body_string_contains("max_id=P2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&[], None, None, false)))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/1/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_profile(&mock_server, "2", 0).await;

    let err = harvest(&settings_path, false).await.unwrap_err();
    assert!(err.is_blocked(), "expected a ban, got {}", err);

    // The page's continuation was saved before its authors were processed
    let cursor = TomlStateStore::open(&settings_path).unwrap().load();
    assert_eq!(cursor.page_token.as_deref(), Some("P2"));
    assert_eq!(cursor.page_number, Some(2));

    assert_eq!(open_records(&settings_path).count().unwrap(), 0);
}

#[tokio::test]
async fn test_empty_page_body_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(
        &dir,
        &mock_server.uri(),
        "[cursor]\ntag = \"streetfood\"\npage-token = \"QVFE\"\npage-number = 4\n",
    );

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = harvest(&settings_path, false).await.unwrap_err();
    assert!(matches!(err, HarvestError::Blocked { .. }));

    let cursor = TomlStateStore::open(&settings_path).unwrap().load();
    assert_eq!(cursor.page_token.as_deref(), Some("QVFE"));
    assert_eq!(cursor.page_number, Some(4));
}

#[tokio::test]
async fn test_server_error_propagates_without_retry() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&["1"], Some("P2"), Some(2), true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/1/info/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = harvest(&settings_path, false).await.unwrap_err();

    assert!(!err.is_blocked());
    assert!(matches!(err, HarvestError::Http { .. }), "got {}", err);
}

#[tokio::test]
async fn test_claim_mode_harvest() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");
    enable_claim_mode(&settings_path);

    // Another crawler already claimed author 2
    assert!(open_records(&settings_path)
        .try_claim("2", "streetfood")
        .unwrap());

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&["1", "2", "1"], None, None, false)))
        .mount(&mock_server)
        .await;

    mount_profile(&mock_server, "1", 1).await;
    mount_profile(&mock_server, "2", 0).await;

    let stats = harvest(&settings_path, false).await.expect("Harvest failed");

    assert_eq!(stats.authors_saved, 1);
    assert_eq!(stats.authors_skipped, 2);
    let records = open_records(&settings_path);
    assert!(records.exists("1").unwrap());
    assert!(!records.exists("2").unwrap());
}

#[tokio::test]
async fn test_claim_left_by_stopped_crawler_is_taken_over() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let settings_path = write_settings(&dir, &mock_server.uri(), "");
    enable_claim_mode(&settings_path);

    // A crawler claimed author 7 long ago and was killed before storing it
    drop(open_records(&settings_path));
    let conn = rusqlite::Connection::open(dir.path().join("authors.db")).unwrap();
    conn.execute(
        "INSERT INTO author_claims (instagram_user_id, tag, owner, claimed_at)
         VALUES ('7', 'streetfood', 'stopped-crawler', 0)",
        [],
    )
    .unwrap();
    drop(conn);

    Mock::given(method("POST"))
        .and(path(SECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_page(&["7"], None, None, false)))
        .mount(&mock_server)
        .await;

    mount_profile(&mock_server, "7", 1).await;

    let stats = harvest(&settings_path, false).await.expect("Harvest failed");

    assert_eq!(stats.authors_saved, 1);
    assert_eq!(stats.authors_skipped, 0);
    assert!(open_records(&settings_path).exists("7").unwrap());
}
