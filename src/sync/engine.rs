//! Sync engine for one-way mirroring.
//!
//! A pass snapshots both directories, plans the copy and delete sets from
//! those snapshots, then applies them: every copy first, then every delete.
//! Per-file failures are logged and skipped; nothing escapes `sync_once`.

use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::activity::Sink;
use crate::fs::{FileStore, LocalStore};
use crate::sync::compare::store_content_equals;
use crate::sync::hash::HashType;
use crate::sync::snapshot::{SkipReason, Snapshot};

/// Why a file is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyReason {
    /// No file of that name in the replica.
    Missing,
    /// Content differs.
    Changed,
    /// The two files could not be compared; holds the cause.
    Unverified(String),
    /// A symlink or special file of that name sits in the replica. The copy
    /// replaces the entry itself.
    Obstructed(SkipReason),
}

/// Action to take for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Overwrite the replica file with the source file.
    Copy { name: String, reason: CopyReason },
    /// Delete the replica file.
    Delete { name: String },
    /// The replica has a subdirectory where the file belongs. Reported as an
    /// error on every pass and left in place.
    Blocked { name: String, reason: SkipReason },
}

impl SyncAction {
    /// Get the file name associated with this action.
    pub fn name(&self) -> &str {
        match self {
            Self::Copy { name, .. } => name,
            Self::Delete { name } => name,
            Self::Blocked { name, .. } => name,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// Sync statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Regular files in the source snapshot.
    pub files_scanned: usize,
    /// Files copied.
    pub files_copied: usize,
    /// Files deleted.
    pub files_deleted: usize,
    /// Files already identical.
    pub files_unchanged: usize,
    /// Non-regular entries ignored on either side.
    pub entries_skipped: usize,
    /// Error lines recorded, at most one per file, plus listing failures.
    pub errors: usize,
    /// Bytes copied.
    pub bytes_copied: u64,
    /// Total duration.
    pub duration_ms: u64,
}

/// An action and how it went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedAction {
    pub action: SyncAction,
    /// The error recorded for this action, if any. A copy whose comparison
    /// failed has one even when the copy itself went through.
    pub error: Option<String>,
}

impl ExecutedAction {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Actions in execution order.
    pub actions: Vec<ExecutedAction>,
    pub stats: SyncStats,
    /// True when the pass could not list one of the directories.
    pub aborted: bool,
}

impl SyncReport {
    /// Whether the pass changed nothing and hit no errors.
    pub fn is_noop(&self) -> bool {
        !self.aborted && self.actions.is_empty()
    }
}

/// Compute the actions that make `replica` mirror `source`.
///
/// `same_content` is asked once per file name present as a regular file on
/// both sides. It returns `Ok(true)` only when the two files are known to be
/// identical, and `Err(cause)` when they could not be compared. It may be
/// called from several threads.
///
/// A source file whose name is taken by a non-regular replica entry is
/// copied over a symlink or special file, and blocked by a subdirectory.
/// Copies and blocked names come first in source listing order, then
/// deletes in replica listing order.
pub fn plan<F>(source: &Snapshot, replica: &Snapshot, same_content: F) -> Vec<SyncAction>
where
    F: Fn(&str) -> Result<bool, String> + Sync,
{
    let copies: Vec<Option<SyncAction>> = source
        .files()
        .par_iter()
        .map(|name| {
            let copy = |reason| {
                Some(SyncAction::Copy {
                    name: name.clone(),
                    reason,
                })
            };

            if replica.contains(name) {
                return match same_content(name) {
                    Ok(true) => None,
                    Ok(false) => copy(CopyReason::Changed),
                    Err(cause) => copy(CopyReason::Unverified(cause)),
                };
            }

            match replica.skipped_as(name) {
                None => copy(CopyReason::Missing),
                Some(SkipReason::Directory) => Some(SyncAction::Blocked {
                    name: name.clone(),
                    reason: SkipReason::Directory,
                }),
                Some(other) => copy(CopyReason::Obstructed(other)),
            }
        })
        .collect();

    let deletes = replica
        .files()
        .iter()
        .filter(|name| !source.contains(name))
        .map(|name| SyncAction::Delete { name: name.clone() });

    copies.into_iter().flatten().chain(deletes).collect()
}

/// Reconciles a replica directory against a source directory.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn FileStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Reconciler over the local filesystem.
    pub fn local(algorithm: HashType) -> Self {
        Self::new(Arc::new(LocalStore::new(algorithm)))
    }

    /// Run one pass, reporting every action and failure to `sink`.
    pub fn sync_once(&self, source_dir: &Path, replica_dir: &Path, sink: &dyn Sink) -> SyncReport {
        let started = Instant::now();
        let mut report = SyncReport::default();

        let (source, replica) = match self.take_snapshots(source_dir, replica_dir) {
            Ok(pair) => pair,
            Err(message) => {
                sink.record(&format!("Error: {}", message));
                report.aborted = true;
                report.stats.errors = 1;
                report.stats.duration_ms = started.elapsed().as_millis() as u64;
                return report;
            }
        };

        for entry in source.skipped().iter().chain(replica.skipped()) {
            debug!("Skipping {} ({})", entry.name, entry.reason.description());
        }
        report.stats.files_scanned = source.len();
        report.stats.entries_skipped = source.skipped().len() + replica.skipped().len();

        let actions = plan(&source, &replica, |name| {
            let src = source.path_of(name);
            let dst = replica.path_of(name);
            store_content_equals(self.store.as_ref(), &src, &dst).map_err(|e| e.to_string())
        });

        let copies = actions.iter().filter(|a| a.is_copy()).count();
        let deletes = actions.iter().filter(|a| a.is_delete()).count();
        let blocked = actions.len() - copies - deletes;
        debug!("Planned {} copies, {} deletes, {} blocked", copies, deletes, blocked);
        report.stats.files_unchanged = source.len() - copies - blocked;

        for action in actions {
            let error = self.apply(&action, &source, &replica, sink, &mut report.stats);
            report.actions.push(ExecutedAction { action, error });
        }

        report.stats.duration_ms = started.elapsed().as_millis() as u64;
        debug!(
            "Pass finished: {} copied, {} deleted, {} unchanged, {} errors in {} ms",
            report.stats.files_copied,
            report.stats.files_deleted,
            report.stats.files_unchanged,
            report.stats.errors,
            report.stats.duration_ms
        );

        report
    }

    fn take_snapshots(
        &self,
        source_dir: &Path,
        replica_dir: &Path,
    ) -> Result<(Snapshot, Snapshot), String> {
        let source = self
            .store
            .snapshot(source_dir)
            .map_err(|e| format!("cannot list source: {}", e))?;
        let replica = self
            .store
            .snapshot(replica_dir)
            .map_err(|e| format!("cannot list replica: {}", e))?;
        Ok((source, replica))
    }

    /// Execute one action, recording at most one error line for it.
    fn apply(
        &self,
        action: &SyncAction,
        source: &Snapshot,
        replica: &Snapshot,
        sink: &dyn Sink,
        stats: &mut SyncStats,
    ) -> Option<String> {
        match action {
            SyncAction::Copy { name, reason } => {
                let copied = self.store.copy(&source.path_of(name), &replica.path_of(name));
                let error = match (reason, &copied) {
                    (CopyReason::Unverified(cause), Ok(_)) => {
                        Some(format!("cannot compare {}: {}", name, cause))
                    }
                    (CopyReason::Unverified(cause), Err(e)) => Some(format!(
                        "cannot compare {}: {}; copying it failed too: {}",
                        name, cause, e
                    )),
                    (_, Err(e)) => Some(format!("failed to copy {}: {}", name, e)),
                    (_, Ok(_)) => None,
                };
                if let Some(message) = &error {
                    record_error(sink, stats, message);
                }
                if let Ok(bytes) = copied {
                    if let CopyReason::Obstructed(what) = reason {
                        debug!("Replaced {} {} in replica", what.description(), name);
                    }
                    stats.files_copied += 1;
                    stats.bytes_copied += bytes;
                    sink.record(&format!("Copied {} from source to replica.", name));
                }
                error
            }
            SyncAction::Delete { name } => match self.store.remove(&replica.path_of(name)) {
                Ok(()) => {
                    stats.files_deleted += 1;
                    sink.record(&format!("Removed {} from replica.", name));
                    None
                }
                Err(e) => {
                    let message = format!("failed to remove {}: {}", name, e);
                    record_error(sink, stats, &message);
                    Some(message)
                }
            },
            SyncAction::Blocked { name, reason } => {
                let message = format!(
                    "cannot copy {}: the replica has a {} of that name",
                    name,
                    reason.description()
                );
                record_error(sink, stats, &message);
                Some(message)
            }
        }
    }
}

fn record_error(sink: &dyn Sink, stats: &mut SyncStats, message: &str) {
    sink.record(&format!("Error: {}", message));
    stats.errors += 1;
}
