//! Integration tests for folder listing and error classification

use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::remote_store::IRemoteStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_children_maps_files_and_folders() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "'root' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [
                common::drive_folder("folder-1", "docs"),
                common::drive_file("file-1", "a.txt", "2026-08-01T12:00:00.000Z"),
            ]
        })))
        .mount(&server)
        .await;

    let page = store
        .list_children(&RemoteId::new("root"), None)
        .await
        .expect("listing failed");

    assert!(page.next_cursor.is_none());
    assert_eq!(page.entries.len(), 2);

    assert_eq!(page.entries[0].name, "docs");
    assert!(page.entries[0].is_folder);
    assert!(page.entries[0].modified.is_none());

    assert_eq!(page.entries[1].id, RemoteId::new("file-1"));
    assert!(!page.entries[1].is_folder);
    assert_eq!(
        page.entries[1].modified.as_deref(),
        Some("2026-08-01T12:00:00.000Z")
    );
}

#[tokio::test]
async fn test_list_children_passes_the_page_token_through() {
    let (server, store) = common::setup_store().await;

    // Mount the token-specific page first so it wins the match.
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::drive_file("file-2", "b.txt", "T2")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "'parent-1' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page-2",
            "files": [common::drive_file("file-1", "a.txt", "T1")]
        })))
        .mount(&server)
        .await;

    let parent = RemoteId::new("parent-1");
    let first = store.list_children(&parent, None).await.unwrap();
    assert_eq!(first.next_cursor.as_deref(), Some("page-2"));
    assert_eq!(first.entries[0].name, "a.txt");

    let second = store
        .list_children(&parent, first.next_cursor.as_deref())
        .await
        .unwrap();
    assert!(second.next_cursor.is_none());
    assert_eq!(second.entries[0].name, "b.txt");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = store
        .list_children(&RemoteId::new("root"), None)
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_forbidden_is_permanent() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient permissions"))
        .mount(&server)
        .await;

    let err = store
        .list_children(&RemoteId::new("root"), None)
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_throttled_request_is_retried_after_backoff() {
    let (server, store) = common::setup_store().await;

    // One 429 with an immediate Retry-After, then success.
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::drive_file("file-1", "a.txt", "T1")]
        })))
        .mount(&server)
        .await;

    let page = store
        .list_children(&RemoteId::new("root"), None)
        .await
        .expect("throttled listing should succeed on retry");
    assert_eq!(page.entries.len(), 1);
}
