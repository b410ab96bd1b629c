//! CLI command implementations

pub mod config;
pub mod run;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use drivemirror_core::config::Config;
use drivemirror_core::ports::remote_store::IRemoteStore;
use drivemirror_drive::{DriveClient, DriveStore, FileTokenProvider, TokenProvider};
use drivemirror_sync::SyncOrchestrator;

/// Wires a full engine from the configuration: token, one Drive store
/// handle per transfer worker, and the orchestrator on top.
///
/// A missing or unreadable token file is fatal here; without credentials
/// there is nothing useful the engine could do.
pub fn build_orchestrator(config: &Config, cancel: CancellationToken) -> Result<SyncOrchestrator> {
    let errors = config.validate();
    if !errors.is_empty() {
        let summary: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("invalid configuration: {}", summary.join("; "));
    }

    let token_path = config
        .auth
        .token_file
        .as_ref()
        .context("auth.token_file is not configured")?;
    let token: Arc<dyn TokenProvider> = Arc::new(
        FileTokenProvider::load(token_path).context("loading the Drive access token")?,
    );

    // One store per worker slot; transports are never shared between
    // concurrent transfers.
    let workers = config.sync.max_concurrent_transfers.max(1);
    let handles: Vec<Arc<dyn IRemoteStore>> = (0..workers)
        .map(|_| {
            Arc::new(DriveStore::new(DriveClient::new(Arc::clone(&token))))
                as Arc<dyn IRemoteStore>
        })
        .collect();

    info!(
        workers,
        local_root = %config.sync.local_root.display(),
        "Engine assembled"
    );
    SyncOrchestrator::new(handles, config.sync.clone(), cancel)
}
