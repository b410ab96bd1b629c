//! Ledger record for a single synchronized file
//!
//! A [`FileRecord`] captures the last-known state of one relative path on
//! both replicas, as observed at the moment of its last successful
//! transfer. Change detection compares fresh scans against these records
//! instead of comparing content.

use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// Last-known synchronized state of one file.
///
/// ## Invariant
///
/// `local_mtime` and `remote_mtime` always describe the *same* transfer
/// event. A completed transfer in either direction re-observes both sides
/// and writes a whole new record; the two fields are never updated
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Local modification time in seconds since the epoch (fractional),
    /// as observed by this engine at the last successful transfer.
    pub local_mtime: f64,
    /// Remote node identifier of the corresponding object.
    pub remote_id: RemoteId,
    /// Remote-reported modification timestamp. Vendor-opaque: compared
    /// only for equality, never parsed.
    pub remote_mtime: String,
}

impl FileRecord {
    /// Builds a record from the two sides of a completed transfer.
    pub fn new(local_mtime: f64, remote_id: RemoteId, remote_mtime: impl Into<String>) -> Self {
        Self {
            local_mtime,
            remote_id,
            remote_mtime: remote_mtime.into(),
        }
    }
}
