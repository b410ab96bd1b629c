//! Remote folder hierarchy resolver
//!
//! Maps a file's parent-directory segments to the remote folder that
//! should hold it, creating missing folders on the way down. A
//! per-cycle cache avoids re-listing shared ancestors, and a per-path
//! creation lock guarantees that concurrent workers resolving the same
//! unresolved path create at most one folder for it.
//!
//! When the remote side already holds several same-named folders under
//! one parent (residue of an earlier partial failure), the first listing
//! match is taken. That is a deliberate tolerance, not a guarantee; the
//! listing order is whatever the store returns.

use std::sync::Arc;

use anyhow::Context;
use dashmap::DashMap;
use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::remote_store::IRemoteStore;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Resolves parent-directory segment sequences to remote folder ids.
///
/// Scoped to one sync cycle: the cache carries no durable state and a
/// fresh resolver is cheap.
pub struct FolderResolver {
    sync_root: RemoteId,
    cache: DashMap<Vec<String>, RemoteId>,
    creation_locks: DashMap<Vec<String>, Arc<Mutex<()>>>,
}

impl FolderResolver {
    /// Creates a resolver anchored at the remote sync root folder.
    pub fn new(sync_root: RemoteId) -> Self {
        Self {
            sync_root,
            cache: DashMap::new(),
            creation_locks: DashMap::new(),
        }
    }

    /// Remote folder in which a file with the given relative path belongs.
    ///
    /// An empty segment sequence means "directly under the sync root".
    pub async fn resolve(
        &self,
        store: &dyn IRemoteStore,
        segments: &[String],
    ) -> anyhow::Result<RemoteId> {
        let mut parent = self.sync_root.clone();
        let mut prefix: Vec<String> = Vec::with_capacity(segments.len());

        for segment in segments {
            prefix.push(segment.clone());

            if let Some(hit) = self.cache.get(&prefix) {
                parent = hit.clone();
                continue;
            }

            // Serialize find-or-create per distinct segment sequence so
            // two workers never both decide the folder is missing.
            let lock = self
                .creation_locks
                .entry(prefix.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            let _guard = lock.lock().await;

            // Another worker may have resolved it while we waited.
            if let Some(hit) = self.cache.get(&prefix) {
                parent = hit.clone();
                continue;
            }

            let id = find_or_create_folder(store, &parent, segment)
                .await
                .with_context(|| format!("resolving remote folder {}", prefix.join("/")))?;
            self.cache.insert(prefix.clone(), id.clone());
            parent = id;
        }

        Ok(parent)
    }
}

/// Finds a non-trashed folder child named `name` under `parent`, or
/// creates it. First listing match wins.
pub async fn find_or_create_folder(
    store: &dyn IRemoteStore,
    parent: &RemoteId,
    name: &str,
) -> anyhow::Result<RemoteId> {
    if let Some(existing) = find_folder_child(store, parent, name).await? {
        debug!(folder = name, id = %existing, "Using existing remote folder");
        return Ok(existing);
    }

    let id = store
        .create_folder(parent, name)
        .await
        .with_context(|| format!("creating remote folder '{name}'"))?;
    info!(folder = name, id = %id, "Created remote folder");
    Ok(id)
}

/// First folder-typed child of `parent` with exactly the given name.
async fn find_folder_child(
    store: &dyn IRemoteStore,
    parent: &RemoteId,
    name: &str,
) -> anyhow::Result<Option<RemoteId>> {
    let mut cursor: Option<String> = None;
    loop {
        let page = store
            .list_children(parent, cursor.as_deref())
            .await
            .with_context(|| format!("listing children of {parent}"))?;

        for entry in page.entries {
            if entry.is_folder && entry.name == name {
                return Ok(Some(entry.id));
            }
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(None),
        }
    }
}

/// Parent-directory segments of a relative path: `"a/b/c.txt"` → `["a", "b"]`.
pub fn parent_segments(rel: &str) -> Vec<String> {
    let mut parts: Vec<String> = rel.split('/').map(str::to_string).collect();
    parts.pop();
    parts
}

/// File name component of a relative path.
pub fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}
