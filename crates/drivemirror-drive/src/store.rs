//! DriveStore - IRemoteStore implementation over the Drive v3 API
//!
//! Wire mapping:
//!
//! - `list_children` → `GET /files` with a `'{parent}' in parents and
//!   trashed=false` query and `pageToken` pagination
//! - `create_folder` → `POST /files` with the Drive folder MIME type
//! - `create_file` → `POST /upload/files?uploadType=multipart` with a
//!   `multipart/related` body (metadata part + media part)
//! - `update_file` → `PATCH /upload/files/{id}?uploadType=media`
//! - `download_file` → `GET /files/{id}?alt=media`
//!
//! Trashed objects never appear in listings, so a remotely trashed file
//! simply stops existing from the engine's point of view.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use drivemirror_core::domain::{RemoteId, RemoteStoreError};
use drivemirror_core::ports::remote_store::{ChildPage, IRemoteStore, RemoteEntry, RemoteFileMeta};

use crate::client::DriveClient;

/// MIME type Drive uses to mark folder objects.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Projection for listing responses.
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType,modifiedTime)";

/// Projection for create/update responses.
const FILE_FIELDS: &str = "id,modifiedTime";

/// Fixed boundary for multipart/related upload bodies.
const MULTIPART_BOUNDARY: &str = "drivemirror_boundary_7f3a9c";

// ============================================================================
// Drive API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveItem {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    modified_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedFile {
    id: String,
    modified_time: Option<String>,
}

// ============================================================================
// DriveStore
// ============================================================================

/// [`IRemoteStore`] implementation backed by one [`DriveClient`].
pub struct DriveStore {
    client: DriveClient,
}

impl DriveStore {
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteStoreError> {
        response
            .json::<T>()
            .await
            .map_err(|err| RemoteStoreError::Permanent(format!("malformed API response: {err}")))
    }
}

#[async_trait]
impl IRemoteStore for DriveStore {
    fn namespace_root(&self) -> RemoteId {
        // Drive's alias for the account's root folder.
        RemoteId::new("root")
    }

    async fn list_children(
        &self,
        parent: &RemoteId,
        cursor: Option<&str>,
    ) -> Result<ChildPage, RemoteStoreError> {
        let query = format!("'{}' in parents and trashed=false", parent.as_str());
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.as_str()),
            ("spaces", "drive"),
            ("fields", LIST_FIELDS),
        ];
        if let Some(token) = cursor {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .execute(self.client.api(Method::GET, "/files").query(&params))
            .await?;
        let list: FileList = Self::parse_json(response).await?;

        debug!(parent = %parent, entries = list.files.len(), "Listed folder page");
        let entries = list
            .files
            .into_iter()
            .map(|item| RemoteEntry {
                id: RemoteId::new(item.id),
                name: item.name,
                is_folder: item.mime_type == FOLDER_MIME_TYPE,
                modified: item.modified_time,
            })
            .collect();

        Ok(ChildPage {
            entries,
            next_cursor: list.next_page_token,
        })
    }

    async fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
    ) -> Result<RemoteId, RemoteStoreError> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": FOLDER_MIME_TYPE,
            "parents": [parent.as_str()],
        });

        let response = self
            .client
            .execute(
                self.client
                    .api(Method::POST, "/files")
                    .query(&[("fields", "id")])
                    .json(&body),
            )
            .await?;
        let created: CreatedFile = Self::parse_json(response).await?;

        debug!(name, id = %created.id, "Created Drive folder");
        Ok(RemoteId::new(created.id))
    }

    async fn create_file(
        &self,
        parent: &RemoteId,
        name: &str,
        content: Vec<u8>,
    ) -> Result<RemoteFileMeta, RemoteStoreError> {
        let metadata = serde_json::json!({
            "name": name,
            "parents": [parent.as_str()],
        });
        let body = multipart_related(&metadata, &content);

        let response = self
            .client
            .execute(
                self.client
                    .upload(Method::POST, "/files")
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(
                        "Content-Type",
                        format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
                    )
                    .body(body),
            )
            .await?;
        let created: CreatedFile = Self::parse_json(response).await?;

        debug!(name, id = %created.id, "Created Drive file");
        Ok(RemoteFileMeta {
            id: RemoteId::new(created.id),
            modified: created.modified_time.unwrap_or_default(),
        })
    }

    async fn update_file(
        &self,
        id: &RemoteId,
        content: Vec<u8>,
    ) -> Result<RemoteFileMeta, RemoteStoreError> {
        let path = format!("/files/{}", id.as_str());
        let response = self
            .client
            .execute(
                self.client
                    .upload(Method::PATCH, &path)
                    .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
                    .header("Content-Type", "application/octet-stream")
                    .body(content),
            )
            .await?;
        let updated: CreatedFile = Self::parse_json(response).await?;

        debug!(id = %id, "Updated Drive file content");
        Ok(RemoteFileMeta {
            id: RemoteId::new(updated.id),
            modified: updated.modified_time.unwrap_or_default(),
        })
    }

    async fn download_file(&self, id: &RemoteId) -> Result<Vec<u8>, RemoteStoreError> {
        let path = format!("/files/{}", id.as_str());
        let response = self
            .client
            .execute(
                self.client
                    .api(Method::GET, &path)
                    .query(&[("alt", "media")]),
            )
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|err| RemoteStoreError::Transient(format!("reading download body: {err}")))?;
        debug!(id = %id, bytes = bytes.len(), "Downloaded Drive file");
        Ok(bytes.to_vec())
    }
}

/// Builds a `multipart/related` upload body: a JSON metadata part
/// followed by the raw media part.
fn multipart_related(metadata: &serde_json::Value, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
