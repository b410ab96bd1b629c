//! Run command - continuous interval-based synchronization
//!
//! Runs cycles on the configured interval until SIGINT or SIGTERM
//! arrives, then persists the ledger and exits. A failed cycle is
//! logged and the loop keeps going; only a broken configuration stops
//! the process.

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::info;

use drivemirror_core::config::Config;

use crate::commands::build_orchestrator;
use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Seconds between cycles (overrides the configured interval)
    #[arg(long)]
    pub interval: Option<u64>,
}

impl RunCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        let mut config = config.clone();
        if let Some(interval) = self.interval {
            config.sync.interval_secs = interval;
        }

        let cancel = CancellationToken::new();
        let engine = build_orchestrator(&config, cancel.clone())?;

        tokio::spawn(shutdown_signal(cancel));

        reporter.status(&format!(
            "Mirroring {} every {}s (Ctrl+C to stop)",
            config.sync.local_root.display(),
            config.sync.interval_secs
        ));
        engine.run().await;

        reporter.status("Stopped");
        Ok(())
    }
}

/// Waits for SIGINT or SIGTERM and triggers the cancellation token.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
