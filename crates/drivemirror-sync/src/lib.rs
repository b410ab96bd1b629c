//! DriveMirror synchronization engine
//!
//! Implements one full mirror cycle between a local directory tree and a
//! remote object store reached through the
//! [`IRemoteStore`](drivemirror_core::ports::remote_store::IRemoteStore)
//! port:
//!
//! 1. **Upload phase**: scan the local tree, compare against the
//!    [`Ledger`](ledger::Ledger), push new and locally-modified files.
//! 2. **Download phase**: walk the remote tree, pull new and
//!    remotely-modified files, preferring local content on conflict.
//! 3. **Persist**: rewrite the ledger document atomically.
//!
//! The [`SyncOrchestrator`](orchestrator::SyncOrchestrator) sequences the
//! phases and repeats them on a timer until cancelled.

pub mod detector;
pub mod ledger;
pub mod orchestrator;
pub mod resolver;
pub mod scanner;
pub mod scheduler;

pub use detector::{detect_downloads, detect_uploads, DownloadPlan};
pub use ledger::Ledger;
pub use orchestrator::{CycleSummary, SyncOrchestrator};
pub use scanner::{LocalFileSet, RemoteFile, RemoteFileSet};
