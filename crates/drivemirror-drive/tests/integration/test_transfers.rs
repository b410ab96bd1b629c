//! Integration tests for folder creation, uploads, and downloads

use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::remote_store::IRemoteStore;
use wiremock::matchers::{body_json, body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

// ============================================================================
// Folder creation
// ============================================================================

#[tokio::test]
async fn test_create_folder_sends_the_folder_mime_type() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("fields", "id"))
        .and(body_json(serde_json::json!({
            "name": "docs",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": ["parent-1"],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "folder-9"})),
        )
        .mount(&server)
        .await;

    let id = store
        .create_folder(&RemoteId::new("parent-1"), "docs")
        .await
        .expect("folder creation failed");
    assert_eq!(id, RemoteId::new("folder-9"));
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_create_file_uploads_metadata_and_content_in_one_request() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .and(body_string_contains("\"name\":\"a.txt\""))
        .and(body_string_contains("\"parents\":[\"parent-1\"]"))
        .and(body_string_contains("hello drive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "file-1",
            "modifiedTime": "2026-08-27T09:00:00.000Z",
        })))
        .mount(&server)
        .await;

    let meta = store
        .create_file(&RemoteId::new("parent-1"), "a.txt", b"hello drive".to_vec())
        .await
        .expect("upload failed");

    assert_eq!(meta.id, RemoteId::new("file-1"));
    assert_eq!(meta.modified, "2026-08-27T09:00:00.000Z");
}

#[tokio::test]
async fn test_update_file_patches_content_in_place() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("PATCH"))
        .and(path("/files/file-1"))
        .and(query_param("uploadType", "media"))
        .and(body_string("new content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "file-1",
            "modifiedTime": "2026-08-27T10:30:00.000Z",
        })))
        .mount(&server)
        .await;

    let meta = store
        .update_file(&RemoteId::new("file-1"), b"new content".to_vec())
        .await
        .expect("update failed");

    assert_eq!(meta.id, RemoteId::new("file-1"));
    assert_eq!(meta.modified, "2026-08-27T10:30:00.000Z");
}

#[tokio::test]
async fn test_failed_upload_surfaces_the_api_error() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(403).set_body_string("storage quota exceeded"))
        .mount(&server)
        .await;

    let err = store
        .create_file(&RemoteId::new("parent-1"), "big.bin", vec![0u8; 64])
        .await
        .unwrap_err();
    assert!(!err.is_transient());
    assert!(err.to_string().contains("quota"));
}

// ============================================================================
// Downloads
// ============================================================================

#[tokio::test]
async fn test_download_file_returns_the_raw_bytes() {
    let (server, store) = common::setup_store().await;

    let content = b"Hello, Drive! This is test content.";
    Mock::given(method("GET"))
        .and(path("/files/file-1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&server)
        .await;

    let data = store
        .download_file(&RemoteId::new("file-1"))
        .await
        .expect("download failed");
    assert_eq!(data, content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path("/files/empty-1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::new()))
        .mount(&server)
        .await;

    let data = store.download_file(&RemoteId::new("empty-1")).await.unwrap();
    assert!(data.is_empty());
}

#[tokio::test]
async fn test_download_of_missing_file_is_permanent() {
    let (server, store) = common::setup_store().await;

    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found"))
        .mount(&server)
        .await;

    let err = store.download_file(&RemoteId::new("gone")).await.unwrap_err();
    assert!(!err.is_transient());
}
