//! Transfer scheduler - bounded concurrent execution of a cycle's work
//!
//! Executes the upload and download lists produced by the change
//! detector against the remote store, bounded by a fixed worker limit.
//! The two lists are never mixed: the orchestrator fully drains uploads
//! before downloads start.
//!
//! ## Adapter handles
//!
//! The remote store's underlying transport is not assumed safe for
//! concurrent use from one shared handle, so the scheduler owns an
//! [`AdapterPool`] holding one handle per worker slot. A worker checks a
//! handle out for the duration of one transfer and returns it on drop.
//!
//! ## Failure policy
//!
//! Per-item failures are logged and counted, never abort the batch, and
//! are not retried within the cycle: the failed path's ledger entry is
//! unchanged, so the next cycle picks it up again naturally.

use std::collections::VecDeque;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use drivemirror_core::domain::{FileRecord, RemoteId};
use drivemirror_core::ports::remote_store::IRemoteStore;
use futures_util::stream::{self, StreamExt};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ledger::Ledger;
use crate::resolver::{file_name, parent_segments, FolderResolver};
use crate::scanner::{file_mtime, local_path, RemoteFileSet};

/// Suffix of in-flight download files; renamed away on completion.
pub(crate) const PARTIAL_SUFFIX: &str = ".drivemirror-partial";

// ============================================================================
// AdapterPool
// ============================================================================

/// Fixed pool of remote store handles, one per worker slot.
pub struct AdapterPool {
    handles: std::sync::Mutex<VecDeque<Arc<dyn IRemoteStore>>>,
    available: Semaphore,
    capacity: usize,
}

impl AdapterPool {
    /// Builds a pool from pre-constructed handles. The pool size is the
    /// effective concurrency ceiling for remote operations.
    pub fn new(handles: Vec<Arc<dyn IRemoteStore>>) -> Self {
        let capacity = handles.len();
        Self {
            handles: std::sync::Mutex::new(handles.into()),
            available: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Total number of handles the pool was built with.
    pub fn size(&self) -> usize {
        self.capacity
    }

    /// Checks a handle out, waiting if all are in use.
    pub async fn checkout(&self) -> StoreLease<'_> {
        let permit = self
            .available
            .acquire()
            .await
            .expect("pool semaphore closed");
        let store = self
            .handles
            .lock()
            .expect("pool mutex poisoned")
            .pop_front()
            .expect("permit held but pool empty");
        StoreLease {
            pool: self,
            store: Some(store),
            _permit: permit,
        }
    }
}

/// A checked-out remote store handle; returns to the pool on drop.
pub struct StoreLease<'a> {
    pool: &'a AdapterPool,
    store: Option<Arc<dyn IRemoteStore>>,
    _permit: SemaphorePermit<'a>,
}

impl Deref for StoreLease<'_> {
    type Target = dyn IRemoteStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_deref().expect("lease already returned")
    }
}

impl Drop for StoreLease<'_> {
    fn drop(&mut self) {
        if let Some(store) = self.store.take() {
            self.pool
                .handles
                .lock()
                .expect("pool mutex poisoned")
                .push_back(store);
        }
    }
}

// ============================================================================
// TransferScheduler
// ============================================================================

/// Aggregate outcome of one phase's batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Transfers that completed and updated the ledger.
    pub completed: u32,
    /// Transfers that failed; their ledger entries are unchanged.
    pub failed: u32,
    /// Items never dequeued because cancellation arrived first.
    pub skipped: u32,
}

enum ItemOutcome {
    Done,
    Skipped,
}

/// Executes upload and download batches with bounded concurrency,
/// updating the ledger once per completed transfer.
pub struct TransferScheduler {
    pool: Arc<AdapterPool>,
    ledger: Arc<Ledger>,
    local_root: PathBuf,
    concurrency: usize,
    cancel: CancellationToken,
}

impl TransferScheduler {
    pub fn new(
        pool: Arc<AdapterPool>,
        ledger: Arc<Ledger>,
        local_root: PathBuf,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            pool,
            ledger,
            local_root,
            concurrency,
            cancel,
        }
    }

    /// Runs the upload batch. Completion order between items is
    /// unspecified; each ledger update is keyed by path and independent.
    pub async fn run_uploads(
        &self,
        resolver: &FolderResolver,
        uploads: &[String],
    ) -> TransferStats {
        self.run_batch(uploads, |path| self.upload_one(resolver, path))
            .await
    }

    /// Runs the download batch against the remote files discovered this
    /// cycle.
    pub async fn run_downloads(
        &self,
        downloads: &[String],
        remote: &RemoteFileSet,
    ) -> TransferStats {
        self.run_batch(downloads, |path| self.download_one(path, remote))
            .await
    }

    async fn run_batch<'a, F, Fut>(&self, paths: &'a [String], op: F) -> TransferStats
    where
        F: Fn(&'a str) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<ItemOutcome>>,
    {
        let mut stats = TransferStats::default();

        let mut results = stream::iter(paths.iter().map(|path| {
            let fut = op(path);
            async move { (path.as_str(), fut.await) }
        }))
        .buffer_unordered(self.concurrency.max(1));

        while let Some((path, result)) = results.next().await {
            match result {
                Ok(ItemOutcome::Done) => stats.completed += 1,
                Ok(ItemOutcome::Skipped) => stats.skipped += 1,
                Err(err) => {
                    warn!(path = %path, error = %format!("{err:#}"), "Transfer failed, will retry next cycle");
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// Uploads one file: resolve its remote parent, update an existing
    /// same-named object or create a new one, then record both sides'
    /// freshly observed timestamps.
    async fn upload_one(
        &self,
        resolver: &FolderResolver,
        rel: &str,
    ) -> anyhow::Result<ItemOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(ItemOutcome::Skipped);
        }

        let abs = local_path(&self.local_root, rel);
        let local_mtime = file_mtime(&abs)?;
        let content = tokio::fs::read(&abs)
            .await
            .with_context(|| format!("reading {}", abs.display()))?;

        let store = self.pool.checkout().await;
        let parent = resolver.resolve(&*store, &parent_segments(rel)).await?;
        let name = file_name(rel);

        let meta = match find_file_child(&*store, &parent, name).await? {
            Some(existing) => {
                debug!(path = %rel, id = %existing, "Updating existing remote file");
                store.update_file(&existing, content).await?
            }
            None => {
                debug!(path = %rel, "Creating remote file");
                store.create_file(&parent, name, content).await?
            }
        };

        info!(path = %rel, id = %meta.id, "Uploaded");
        self.ledger
            .put(rel, FileRecord::new(local_mtime, meta.id, meta.modified));
        Ok(ItemOutcome::Done)
    }

    /// Downloads one file: stream to a temp location, rename into place
    /// so the file is never observably half-written, then record the
    /// read-back local mtime together with the remote one.
    async fn download_one(
        &self,
        rel: &str,
        remote: &RemoteFileSet,
    ) -> anyhow::Result<ItemOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(ItemOutcome::Skipped);
        }

        let remote_file = remote
            .get(rel)
            .with_context(|| format!("remote scan has no entry for {rel}"))?;

        let store = self.pool.checkout().await;
        let content = store.download_file(&remote_file.id).await?;
        drop(store);

        let abs = local_path(&self.local_root, rel);
        if let Some(parent) = abs.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let partial = {
            let mut p = abs.as_os_str().to_owned();
            p.push(PARTIAL_SUFFIX);
            PathBuf::from(p)
        };
        tokio::fs::write(&partial, &content)
            .await
            .with_context(|| format!("writing {}", partial.display()))?;
        tokio::fs::rename(&partial, &abs)
            .await
            .with_context(|| format!("renaming into {}", abs.display()))?;

        let local_mtime = file_mtime(&abs)?;
        info!(path = %rel, bytes = content.len(), "Downloaded");
        self.ledger.put(
            rel,
            FileRecord::new(
                local_mtime,
                remote_file.id.clone(),
                remote_file.mtime.clone(),
            ),
        );
        Ok(ItemOutcome::Done)
    }
}

/// First non-folder child of `parent` with exactly the given name.
///
/// Same first-match tolerance as folder resolution: duplicate names from
/// earlier partial failures are not disambiguated.
async fn find_file_child(
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
            if !entry.is_folder && entry.name == name {
                return Ok(Some(entry.id));
            }
        }

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(None),
        }
    }
}
