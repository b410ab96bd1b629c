//! Sync orchestrator - sequences cycles and the interval loop
//!
//! One cycle is `Idle → Uploading → Downloading → Persisting → Idle`.
//! Phase transitions are strictly sequential; each phase fans out
//! internally through the [`TransferScheduler`]. The ordering between
//! phases is load-bearing: download-side conflict detection compares
//! against ledger records that the just-finished upload phase may have
//! rewritten, so uploads fully drain before the remote tree is scanned.
//!
//! A failure inside a phase aborts that cycle only; the loop swallows it,
//! reports it in the cycle summary, and schedules the next cycle.
//! Cancellation is honored between cycles and persists the in-memory
//! ledger before exit, so no completed transfer's metadata is lost.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use drivemirror_core::config::SyncConfig;
use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::remote_store::IRemoteStore;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::detector::{detect_downloads, detect_uploads};
use crate::ledger::Ledger;
use crate::resolver::{find_or_create_folder, FolderResolver};
use crate::scanner::{scan_local, scan_remote};
use crate::scheduler::{AdapterPool, TransferScheduler};

/// Orchestrator phase within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Uploading,
    Downloading,
    Persisting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Downloading => "downloading",
            Phase::Persisting => "persisting",
        };
        write!(f, "{name}")
    }
}

/// Aggregate outcome of one sync cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleSummary {
    /// Files uploaded to the remote side.
    pub uploaded: u32,
    /// Files downloaded from the remote side.
    pub downloaded: u32,
    /// Paths modified on both sides; local content kept.
    pub conflicts: u32,
    /// Per-item transfer failures, retried next cycle.
    pub failed: u32,
    /// Items not dequeued because cancellation arrived mid-phase.
    pub skipped: u32,
    /// Cycle-level errors (scan failures, persist failures).
    pub errors: Vec<String>,
    /// Wall-clock duration of the cycle in milliseconds.
    pub duration_ms: u64,
}

/// Sequences sync cycles against one local root and one remote tree.
///
/// Owns the [`Ledger`]; all mutation flows through the transfer
/// scheduler's per-completion updates.
pub struct SyncOrchestrator {
    config: SyncConfig,
    pool: Arc<AdapterPool>,
    ledger: Arc<Ledger>,
    cancel: CancellationToken,
    remote_root: OnceCell<RemoteId>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator over a pool of remote store handles.
    ///
    /// The ledger is loaded once, here; a malformed document degrades to
    /// an empty ledger rather than failing startup.
    pub fn new(
        handles: Vec<Arc<dyn IRemoteStore>>,
        config: SyncConfig,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!handles.is_empty(), "at least one remote store handle is required");

        let ledger = Arc::new(Ledger::load(&config.ledger_path));
        Ok(Self {
            pool: Arc::new(AdapterPool::new(handles)),
            ledger,
            config,
            cancel,
            remote_root: OnceCell::new(),
        })
    }

    /// The ledger owned by this orchestrator.
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Performs one full cycle and reports it in aggregate.
    ///
    /// Never returns an error: phase failures abort the cycle and land in
    /// [`CycleSummary::errors`].
    pub async fn run_once(&self) -> CycleSummary {
        let start = Instant::now();
        let mut summary = CycleSummary::default();

        if let Err(err) = self.cycle(&mut summary).await {
            error!(error = %format!("{err:#}"), "Sync cycle aborted");
            summary.errors.push(format!("{err:#}"));
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            uploaded = summary.uploaded,
            downloaded = summary.downloaded,
            conflicts = summary.conflicts,
            failed = summary.failed,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            duration_ms = summary.duration_ms,
            "Sync cycle finished"
        );
        summary
    }

    /// Loops [`run_once`](Self::run_once) on the configured interval
    /// until cancelled, persisting the ledger before exit.
    pub async fn run(&self) {
        let interval = Duration::from_secs(self.config.interval_secs);
        info!(
            interval_secs = self.config.interval_secs,
            local_root = %self.config.local_root.display(),
            remote_root = %self.config.remote_root_name,
            "Sync loop starting"
        );

        loop {
            self.run_once().await;

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Cancellation requested, stopping sync loop");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        // The last cycle already persisted, but a cancellation that
        // arrived mid-phase may have left completed transfers unflushed.
        if let Err(err) = self.ledger.persist() {
            warn!(error = %format!("{err:#}"), "Final ledger persist failed");
        }
    }

    async fn cycle(&self, summary: &mut CycleSummary) -> anyhow::Result<()> {
        let scheduler = TransferScheduler::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.ledger),
            self.config.local_root.clone(),
            self.config.max_concurrent_transfers,
            self.cancel.clone(),
        );

        // -- Uploading --
        debug!(phase = %Phase::Uploading, "Entering phase");
        let local = scan_local(&self.config.local_root)
            .await
            .context("scanning local tree")?;
        let uploads = detect_uploads(&local, &self.ledger.snapshot());
        info!(candidates = uploads.len(), "Upload detection complete");

        let root_id = self.remote_root().await?;
        let resolver = FolderResolver::new(root_id.clone());
        let up = scheduler.run_uploads(&resolver, &uploads).await;
        summary.uploaded += up.completed;
        summary.failed += up.failed;
        summary.skipped += up.skipped;

        // -- Downloading --
        debug!(phase = %Phase::Downloading, "Entering phase");
        let remote = {
            let store = self.pool.checkout().await;
            scan_remote(&*store, &root_id)
                .await
                .context("scanning remote tree")?
        };
        let plan = detect_downloads(&remote, &local, &self.ledger.snapshot());
        info!(
            candidates = plan.downloads.len(),
            conflicts = plan.conflicts.len(),
            "Download detection complete"
        );
        for path in &plan.conflicts {
            warn!(path = %path, "Conflict: both sides modified, keeping local version");
        }
        summary.conflicts += plan.conflicts.len() as u32;

        let down = scheduler.run_downloads(&plan.downloads, &remote).await;
        summary.downloaded += down.completed;
        summary.failed += down.failed;
        summary.skipped += down.skipped;

        // -- Persisting --
        debug!(phase = %Phase::Persisting, "Entering phase");
        if let Err(err) = self.ledger.persist() {
            // The in-memory state survives; the next cycle's persist
            // retries the whole snapshot.
            warn!(error = %format!("{err:#}"), "Ledger persist failed");
            summary.errors.push(format!("ledger persist failed: {err:#}"));
        }

        debug!(phase = %Phase::Idle, "Cycle complete");
        Ok(())
    }

    /// Finds or creates the remote sync root folder, once per process.
    async fn remote_root(&self) -> anyhow::Result<RemoteId> {
        let id = self
            .remote_root
            .get_or_try_init(|| async {
                let store = self.pool.checkout().await;
                let namespace_root = store.namespace_root();
                let id = find_or_create_folder(
                    &*store,
                    &namespace_root,
                    &self.config.remote_root_name,
                )
                .await
                .context("resolving remote sync root")?;
                info!(name = %self.config.remote_root_name, id = %id, "Remote sync root resolved");
                Ok::<_, anyhow::Error>(id)
            })
            .await?;
        Ok(id.clone())
    }
}
