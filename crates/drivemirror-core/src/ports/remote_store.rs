//! Remote store port (driven/secondary port)
//!
//! Defines the interface to a hierarchical remote object store addressed
//! by opaque node identifiers. The primary implementation targets Google
//! Drive, but the trait is provider-agnostic: nothing in it names a
//! vendor concept beyond "folders contain named children".
//!
//! ## Design Notes
//!
//! - Methods return [`RemoteStoreError`] so adapters classify failures
//!   as transient or permanent at the boundary; the engine logs the
//!   distinction but handles both identically (skip, retry next cycle).
//! - `ChildPage` is a port-level DTO. Pagination is explicit: the caller
//!   loops on [`IRemoteStore::list_children`] until `next_cursor` is
//!   `None`.
//! - Listings must exclude trashed/deleted nodes; the engine never sees
//!   them.

use serde::{Deserialize, Serialize};

use crate::domain::{RemoteId, RemoteStoreError};

/// One child node as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Provider-assigned node identifier.
    pub id: RemoteId,
    /// Node name within its parent folder.
    pub name: String,
    /// Whether this node is a folder (traversed, never transferred).
    pub is_folder: bool,
    /// Remote-reported modification timestamp. Vendor-opaque; absent for
    /// folder nodes on some providers.
    pub modified: Option<String>,
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default)]
pub struct ChildPage {
    /// Children on this page, in provider order.
    pub entries: Vec<RemoteEntry>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Metadata of a file after a create or content update.
#[derive(Debug, Clone)]
pub struct RemoteFileMeta {
    /// Node identifier (newly assigned on create, unchanged on update).
    pub id: RemoteId,
    /// Remote-reported modification timestamp of the written content.
    pub modified: String,
}

/// Port trait for the remote object store.
///
/// Implementations are held one per worker slot by the transfer
/// scheduler: a single handle is never shared across concurrent
/// operations, so implementations are free to keep per-handle transport
/// state.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// The provider's top-level container, under which the configured
    /// sync root folder lives.
    fn namespace_root(&self) -> RemoteId;

    /// Lists one page of the non-trashed children of `parent`.
    ///
    /// Pass the `next_cursor` from the previous page to continue; start
    /// with `None`.
    async fn list_children(
        &self,
        parent: &RemoteId,
        cursor: Option<&str>,
    ) -> Result<ChildPage, RemoteStoreError>;

    /// Creates an empty folder named `name` under `parent`.
    async fn create_folder(
        &self,
        parent: &RemoteId,
        name: &str,
    ) -> Result<RemoteId, RemoteStoreError>;

    /// Creates a file named `name` under `parent` with the given content.
    async fn create_file(
        &self,
        parent: &RemoteId,
        name: &str,
        content: Vec<u8>,
    ) -> Result<RemoteFileMeta, RemoteStoreError>;

    /// Replaces the content of an existing file node.
    async fn update_file(
        &self,
        id: &RemoteId,
        content: Vec<u8>,
    ) -> Result<RemoteFileMeta, RemoteStoreError>;

    /// Reads the full content of a file node.
    async fn download_file(&self, id: &RemoteId) -> Result<Vec<u8>, RemoteStoreError>;
}
