//! Local and remote tree scanners
//!
//! Each sync cycle works from two fresh scans: a walk of the local mirror
//! directory and a walk of the remote folder hierarchy. Neither result is
//! ever persisted; the ledger alone carries state between cycles.
//!
//! Paths are relative to the respective root and always use `/` as the
//! separator, so the same key addresses a file on both sides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Context;
use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::remote_store::IRemoteStore;
use tracing::{debug, warn};

use crate::scheduler::PARTIAL_SUFFIX;

/// Relative path → local mtime (seconds since epoch, fractional).
pub type LocalFileSet = BTreeMap<String, f64>;

/// A leaf (non-folder) object found during the remote walk.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Remote node identifier.
    pub id: RemoteId,
    /// Remote-reported modification timestamp, vendor-opaque.
    pub mtime: String,
}

/// Relative path → remote file metadata.
pub type RemoteFileSet = BTreeMap<String, RemoteFile>;

/// Walks the local mirror directory and returns every regular file with
/// its current mtime.
///
/// Runs the blocking directory walk on the blocking thread pool. A
/// missing root is created rather than treated as an error, matching the
/// first-run experience.
pub async fn scan_local(root: &Path) -> anyhow::Result<LocalFileSet> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating local root {}", root.display()))?;
        let mut files = LocalFileSet::new();
        walk_dir(&root, &root, &mut files)?;
        debug!(files = files.len(), "Local scan complete");
        Ok(files)
    })
    .await
    .context("local scan task panicked")?
}

fn walk_dir(root: &Path, dir: &Path, out: &mut LocalFileSet) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing local directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_dir(root, &path, out)?;
        } else if file_type.is_file() {
            let Some(rel) = relative_key(root, &path) else {
                warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };
            // Skip in-flight download temp files from an earlier crash.
            if rel.ends_with(PARTIAL_SUFFIX) {
                continue;
            }
            let mtime = file_mtime(&path)?;
            out.insert(rel, mtime);
        }
        // Symlinks and other special files are ignored.
    }

    Ok(())
}

/// Root-relative POSIX-style key for an absolute path, `None` when any
/// component is not valid UTF-8.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        parts.push(component.as_os_str().to_str()?.to_string());
    }
    Some(parts.join("/"))
}

/// Current mtime of a local file as fractional seconds since the epoch.
pub fn file_mtime(path: &Path) -> anyhow::Result<f64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("statting {}", path.display()))?;
    let modified = metadata
        .modified()
        .with_context(|| format!("reading mtime of {}", path.display()))?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .context("mtime predates the epoch")?;
    Ok(since_epoch.as_secs_f64())
}

/// Absolute local path for a relative key under `root`.
pub fn local_path(root: &Path, rel: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in rel.split('/') {
        path.push(segment);
    }
    path
}

/// Walks the remote folder hierarchy below `root_id` and returns every
/// leaf object keyed by its relative path.
///
/// Folders are traversed but not recorded. Each folder is listed with the
/// paginated [`IRemoteStore::list_children`] call, looping until the
/// store returns no cursor.
///
/// Remote stores permit names a local filesystem must not materialize
/// (`..`, or names containing `/` or NUL, which would escape the mirror
/// root once joined by [`local_path`]). Such entries are skipped with a
/// warning and their subtrees are not descended into.
pub async fn scan_remote(
    store: &dyn IRemoteStore,
    root_id: &RemoteId,
) -> anyhow::Result<RemoteFileSet> {
    let mut files = RemoteFileSet::new();
    // Iterative walk: async recursion would need boxing for no benefit.
    let mut pending: Vec<(RemoteId, String)> = vec![(root_id.clone(), String::new())];

    while let Some((folder_id, prefix)) = pending.pop() {
        let mut cursor: Option<String> = None;
        loop {
            let page = store
                .list_children(&folder_id, cursor.as_deref())
                .await
                .with_context(|| format!("listing remote folder {folder_id}"))?;

            for entry in page.entries {
                if !is_safe_name(&entry.name) {
                    warn!(name = %entry.name, parent = %folder_id, "Skipping remote entry with unusable name");
                    continue;
                }
                let rel = if prefix.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{prefix}/{}", entry.name)
                };
                if entry.is_folder {
                    pending.push((entry.id, rel));
                } else {
                    files.insert(
                        rel,
                        RemoteFile {
                            id: entry.id,
                            mtime: entry.modified.unwrap_or_default(),
                        },
                    );
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }

    debug!(files = files.len(), "Remote scan complete");
    Ok(files)
}

/// Whether a remote name is usable as a single local path component.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}
