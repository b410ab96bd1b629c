//! Metadata ledger - the persistent record of last-synced state
//!
//! The [`Ledger`] maps each relative path to the [`FileRecord`] observed
//! at its last successful transfer. It is the single source of truth for
//! "has this file changed since last sync", making change detection
//! possible without content comparison.
//!
//! ## Durability model
//!
//! The ledger is one JSON document: loaded once at startup, rewritten
//! wholesale at the end of each cycle. A corrupt document is not fatal;
//! the engine starts from an empty ledger and performs a full
//! re-reconciliation, which is safe because nothing is ever deleted based
//! on absence from the ledger; files are only ever compared by timestamp.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use drivemirror_core::domain::FileRecord;
use tracing::{debug, info, warn};

/// In-memory ledger with a JSON document backing it on disk.
///
/// All mutation goes through [`Ledger::put`], guarded by a single mutex
/// with a one-insert critical section; records are independent, so no
/// multi-key transactions are needed.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: Mutex<HashMap<String, FileRecord>>,
}

impl Ledger {
    /// Loads the ledger from `path`.
    ///
    /// A missing file yields an empty ledger. A malformed document is
    /// logged as a warning and also yields an empty ledger; startup
    /// never aborts over ledger state.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, FileRecord>>(&content) {
                Ok(map) => {
                    info!(path = %path.display(), entries = map.len(), "Loaded ledger");
                    map
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Ledger document is malformed, starting from an empty ledger"
                    );
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No ledger document yet, starting empty");
                HashMap::new()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "Could not read ledger document, starting from an empty ledger"
                );
                HashMap::new()
            }
        };

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    /// Creates an empty ledger that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the record for `path`, if any.
    pub fn get(&self, path: &str) -> Option<FileRecord> {
        self.records
            .lock()
            .expect("ledger mutex poisoned")
            .get(path)
            .cloned()
    }

    /// Inserts or replaces the record for `path`.
    pub fn put(&self, path: impl Into<String>, record: FileRecord) {
        let path = path.into();
        debug!(path = %path, "Ledger updated");
        self.records
            .lock()
            .expect("ledger mutex poisoned")
            .insert(path, record);
    }

    /// Read-only copy of the current records, for change detection.
    ///
    /// Detection works against a stable snapshot while transfer
    /// completions keep mutating the live map.
    pub fn snapshot(&self) -> HashMap<String, FileRecord> {
        self.records
            .lock()
            .expect("ledger mutex poisoned")
            .clone()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.lock().expect("ledger mutex poisoned").len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically rewrites the backing document with the full in-memory
    /// state.
    ///
    /// Writes to a sibling temp file and renames it into place, so the
    /// document on disk is always a complete, self-consistent snapshot.
    /// On failure the in-memory state is untouched and the next call
    /// retries the whole write.
    pub fn persist(&self) -> anyhow::Result<()> {
        let serialized = {
            let records = self.records.lock().expect("ledger mutex poisoned");
            serde_json::to_string_pretty(&*records).context("serializing ledger")?
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating ledger directory {}", parent.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serialized.as_bytes())
            .with_context(|| format!("writing {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("renaming into {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Ledger persisted");
        Ok(())
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use drivemirror_core::domain::RemoteId;

    use super::*;

    fn record(local: f64, id: &str, remote: &str) -> FileRecord {
        FileRecord::new(local, RemoteId::new(id), remote)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(dir.path().join("ledger.json"));
        assert!(ledger.is_empty());
    }

    #[test]
    fn corrupt_document_loads_empty_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, b"{ not json at all").unwrap();

        let ledger = Ledger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn put_then_get_round_trips_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::empty(dir.path().join("ledger.json"));

        ledger.put("notes/a.md", record(100.0, "X", "T1"));
        let rec = ledger.get("notes/a.md").unwrap();
        assert_eq!(rec.local_mtime, 100.0);
        assert_eq!(rec.remote_id, RemoteId::new("X"));
        assert_eq!(rec.remote_mtime, "T1");

        ledger.put("notes/a.md", record(200.0, "X", "T2"));
        assert_eq!(ledger.get("notes/a.md").unwrap().local_mtime, 200.0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = Ledger::empty(&path);
        ledger.put("a.txt", record(1.5, "id-a", "TA"));
        ledger.put("dir/b.txt", record(2.25, "id-b", "TB"));
        ledger.persist().unwrap();

        let reloaded = Ledger::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("a.txt"), ledger.get("a.txt"));
        assert_eq!(reloaded.get("dir/b.txt"), ledger.get("dir/b.txt"));
    }

    #[test]
    fn persist_load_persist_is_semantically_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = Ledger::empty(&path);
        ledger.put("x", record(100.0, "n1", "T1"));
        ledger.persist().unwrap();

        let first: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        Ledger::load(&path).persist().unwrap();
        let second: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn persist_replaces_previous_document_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = Ledger::empty(&path);
        ledger.put("old.txt", record(1.0, "old", "T0"));
        ledger.persist().unwrap();

        let fresh = Ledger::empty(&path);
        fresh.put("new.txt", record(2.0, "new", "T1"));
        fresh.persist().unwrap();

        let reloaded = Ledger::load(&path);
        assert!(reloaded.get("old.txt").is_none());
        assert!(reloaded.get("new.txt").is_some());
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::empty(dir.path().join("ledger.json"));
        ledger.put("a", record(1.0, "a", "T"));

        let snap = ledger.snapshot();
        ledger.put("b", record(2.0, "b", "T"));

        assert_eq!(snap.len(), 1);
        assert_eq!(ledger.len(), 2);
    }
}
