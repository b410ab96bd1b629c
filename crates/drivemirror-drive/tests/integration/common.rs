//! Shared test helpers for Drive API integration tests
//!
//! Spins up a wiremock server and returns a DriveStore whose metadata
//! and upload base URLs both point at it.

use std::sync::Arc;

use drivemirror_drive::{DriveClient, DriveStore, StaticTokenProvider};
use wiremock::MockServer;

pub async fn setup_store() -> (MockServer, DriveStore) {
    let server = MockServer::start().await;
    let token = Arc::new(StaticTokenProvider::new("test-access-token"));
    let client = DriveClient::with_base_urls(token, server.uri(), server.uri());
    (server, DriveStore::new(client))
}

/// Listing entry for a regular file.
pub fn drive_file(id: &str, name: &str, modified: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "mimeType": "text/plain",
        "modifiedTime": modified,
    })
}

/// Listing entry for a folder.
pub fn drive_folder(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "mimeType": "application/vnd.google-apps.folder",
    })
}
