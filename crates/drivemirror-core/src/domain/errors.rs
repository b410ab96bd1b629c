//! Remote store error taxonomy
//!
//! Adapters classify every failure as transient (a future cycle may
//! succeed without intervention) or permanent (an operator has to act).
//! The engine treats both the same way: the affected path simply does
//! not sync this cycle and is retried naturally on the next one because
//! its ledger entry is left untouched. The split is preserved for
//! logging and for future policy.

use thiserror::Error;

/// Errors returned by [`IRemoteStore`](crate::ports::remote_store::IRemoteStore)
/// implementations.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// Network hiccups, rate limiting, backend 5xx; retryable by a
    /// future cycle.
    #[error("transient remote error: {0}")]
    Transient(String),

    /// Permission denials, malformed requests, missing nodes; not
    /// expected to succeed on retry without operator intervention.
    #[error("permanent remote error: {0}")]
    Permanent(String),
}

impl RemoteStoreError {
    /// Whether a future cycle may succeed without operator intervention.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
