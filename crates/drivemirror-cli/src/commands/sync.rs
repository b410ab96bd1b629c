//! Sync command - run one synchronization cycle and exit
//!
//! Builds the engine from configuration, performs a single cycle, and
//! reports the aggregate counts. Per-item transfer failures are reported
//! but do not fail the process; a cycle-level failure (scan or persist)
//! does.

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use drivemirror_core::config::Config;

use crate::commands::build_orchestrator;
use crate::output::{OutputFormat, Reporter};

#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);

        let engine = build_orchestrator(config, CancellationToken::new())?;
        let summary = engine.run_once().await;

        reporter.cycle_summary(&summary);

        if !summary.errors.is_empty() {
            for error in &summary.errors {
                reporter.error(error);
            }
            anyhow::bail!("sync cycle did not complete cleanly");
        }
        Ok(())
    }
}
