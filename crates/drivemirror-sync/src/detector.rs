//! Change detection
//!
//! Pure decision logic: given fresh scans of both replicas and a ledger
//! snapshot, decide which paths to upload, which to download, and which
//! are in conflict. No I/O happens here.
//!
//! Timestamps are compared exactly, never within a tolerance. Mixed
//! precision between local and remote clocks can therefore cause
//! spurious re-transfers; that is an accepted property of the design,
//! not a bug to paper over with fuzzy comparison.

use std::collections::HashMap;

use drivemirror_core::domain::FileRecord;
use tracing::debug;

use crate::scanner::{LocalFileSet, RemoteFileSet};

/// Result of the download-direction pass.
#[derive(Debug, Clone, Default)]
pub struct DownloadPlan {
    /// Paths to fetch from the remote side.
    pub downloads: Vec<String>,
    /// Paths modified on both sides since the last sync. Local content
    /// wins: these are reported, not transferred, and their ledger
    /// records stay untouched so they are re-evaluated next cycle.
    pub conflicts: Vec<String>,
}

/// Upload-direction rule, applied to every locally present path.
///
/// - absent from the ledger → upload (first-ever sync of this file)
/// - local mtime strictly greater than the recorded one → upload
/// - otherwise → no action
pub fn detect_uploads(local: &LocalFileSet, ledger: &HashMap<String, FileRecord>) -> Vec<String> {
    let mut uploads = Vec::new();

    for (path, &mtime) in local {
        match ledger.get(path) {
            None => {
                debug!(path = %path, "New local file");
                uploads.push(path.clone());
            }
            Some(record) if mtime > record.local_mtime => {
                debug!(path = %path, "Local file modified since last sync");
                uploads.push(path.clone());
            }
            Some(_) => {}
        }
    }

    uploads
}

/// Download-direction rule, applied to every remotely present path.
///
/// - absent locally → download. A remote file missing locally is always
///   treated as new, never as a local deletion to propagate; this
///   delete-blindness is documented behavior.
/// - present locally and in the ledger, remote mtime differing from the
///   recorded one → candidate, resolved against the *current* local
///   mtime: unchanged since last sync → download and overwrite; changed
///   → conflict, keep local.
/// - present locally but absent from the ledger → no action; the file is
///   a local-only one the upload pass owns.
pub fn detect_downloads(
    remote: &RemoteFileSet,
    local: &LocalFileSet,
    ledger: &HashMap<String, FileRecord>,
) -> DownloadPlan {
    let mut plan = DownloadPlan::default();

    for (path, remote_file) in remote {
        let Some(&local_mtime) = local.get(path) else {
            debug!(path = %path, "New remote file");
            plan.downloads.push(path.clone());
            continue;
        };

        let Some(record) = ledger.get(path) else {
            continue;
        };

        if remote_file.mtime == record.remote_mtime {
            continue;
        }

        if local_mtime == record.local_mtime {
            debug!(path = %path, "Remote file modified since last sync");
            plan.downloads.push(path.clone());
        } else {
            debug!(path = %path, "Both sides modified, keeping local");
            plan.conflicts.push(path.clone());
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use drivemirror_core::domain::RemoteId;

    use super::*;
    use crate::scanner::RemoteFile;

    fn ledger_with(entries: &[(&str, f64, &str, &str)]) -> HashMap<String, FileRecord> {
        entries
            .iter()
            .map(|(path, local, id, remote)| {
                (
                    path.to_string(),
                    FileRecord::new(*local, RemoteId::new(*id), *remote),
                )
            })
            .collect()
    }

    fn local_with(entries: &[(&str, f64)]) -> LocalFileSet {
        entries
            .iter()
            .map(|(path, mtime)| (path.to_string(), *mtime))
            .collect()
    }

    fn remote_with(entries: &[(&str, &str, &str)]) -> RemoteFileSet {
        entries
            .iter()
            .map(|(path, id, mtime)| {
                (
                    path.to_string(),
                    RemoteFile {
                        id: RemoteId::new(*id),
                        mtime: mtime.to_string(),
                    },
                )
            })
            .collect()
    }

    // -- uploads --

    #[test]
    fn new_local_file_is_uploaded() {
        let local = local_with(&[("notes/a.md", 100.0)]);
        let uploads = detect_uploads(&local, &HashMap::new());
        assert_eq!(uploads, vec!["notes/a.md"]);
    }

    #[test]
    fn locally_modified_file_is_uploaded() {
        let local = local_with(&[("a.txt", 200.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);
        assert_eq!(detect_uploads(&local, &ledger), vec!["a.txt"]);
    }

    #[test]
    fn unchanged_file_is_not_uploaded() {
        let local = local_with(&[("a.txt", 100.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);
        assert!(detect_uploads(&local, &ledger).is_empty());
    }

    #[test]
    fn older_local_mtime_is_not_uploaded() {
        // Strictly-greater comparison: equal or older never re-uploads.
        let local = local_with(&[("a.txt", 50.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);
        assert!(detect_uploads(&local, &ledger).is_empty());
    }

    // -- downloads --

    #[test]
    fn remote_only_file_is_downloaded() {
        let remote = remote_with(&[("notes/b.md", "Y", "T2")]);
        let plan = detect_downloads(&remote, &LocalFileSet::new(), &HashMap::new());
        assert_eq!(plan.downloads, vec!["notes/b.md"]);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn remotely_modified_file_with_unchanged_local_is_downloaded() {
        let remote = remote_with(&[("a.txt", "X", "T2")]);
        let local = local_with(&[("a.txt", 100.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);

        let plan = detect_downloads(&remote, &local, &ledger);
        assert_eq!(plan.downloads, vec!["a.txt"]);
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn both_sides_modified_is_a_conflict_not_a_download() {
        let remote = remote_with(&[("a.txt", "X", "T2")]);
        let local = local_with(&[("a.txt", 150.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);

        let plan = detect_downloads(&remote, &local, &ledger);
        assert!(plan.downloads.is_empty());
        assert_eq!(plan.conflicts, vec!["a.txt"]);
    }

    #[test]
    fn unchanged_remote_mtime_schedules_nothing() {
        let remote = remote_with(&[("a.txt", "X", "T1")]);
        let local = local_with(&[("a.txt", 100.0)]);
        let ledger = ledger_with(&[("a.txt", 100.0, "X", "T1")]);

        let plan = detect_downloads(&remote, &local, &ledger);
        assert!(plan.downloads.is_empty());
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn local_file_absent_from_ledger_is_left_to_the_upload_pass() {
        // Present on both sides but never synced: the local copy takes
        // priority and will be uploaded; no download happens.
        let remote = remote_with(&[("a.txt", "X", "T1")]);
        let local = local_with(&[("a.txt", 100.0)]);

        let plan = detect_downloads(&remote, &local, &HashMap::new());
        assert!(plan.downloads.is_empty());
        assert!(plan.conflicts.is_empty());
    }

    #[test]
    fn quiescent_replicas_schedule_no_work_at_all() {
        let local = local_with(&[("a.txt", 100.0), ("d/b.txt", 50.0)]);
        let remote = remote_with(&[("a.txt", "X", "T1"), ("d/b.txt", "Y", "T2")]);
        let ledger = ledger_with(&[
            ("a.txt", 100.0, "X", "T1"),
            ("d/b.txt", 50.0, "Y", "T2"),
        ]);

        assert!(detect_uploads(&local, &ledger).is_empty());
        let plan = detect_downloads(&remote, &local, &ledger);
        assert!(plan.downloads.is_empty());
        assert!(plan.conflicts.is_empty());
    }
}
