// Per-file failures stay contained to that file

use dirmirror::activity::MemorySink;
use dirmirror::fs::{FileStore, LocalStore};
use dirmirror::sync::{Fingerprint, HashType, Reconciler, Snapshot};
use dirmirror::MirrorError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::{contents, Pair, UnreadableStore, VanishingStore};

fn errors(sink: &MemorySink) -> Vec<String> {
    sink.records().into_iter().filter(|r| r.starts_with("Error")).collect()
}

#[test]
fn test_unreadable_changed_file_logs_one_error() {
    let pair = Pair::new(
        &[("a.txt", "new"), ("bad.txt", "source"), ("c.txt", "same")],
        &[("bad.txt", "replica"), ("c.txt", "same"), ("old.txt", "x")],
    );
    let sink = MemorySink::new();

    let report = Reconciler::new(Arc::new(UnreadableStore::new("bad.txt")))
        .sync_once(&pair.source, &pair.replica, &sink);

    // The failed comparison and the failed copy share one line
    let errors = errors(&sink);
    assert_eq!(errors.len(), 1, "{:?}", sink.records());
    assert!(errors[0].starts_with("Error: cannot compare bad.txt:"));
    assert!(errors[0].contains("copying it failed too"));
    assert_eq!(report.stats.errors, 1);

    // Everything else still completed
    let replica = contents(&pair.replica);
    assert_eq!(replica["a.txt"], b"new");
    assert_eq!(replica["c.txt"], b"same");
    assert_eq!(replica["bad.txt"], b"replica");
    assert!(!replica.contains_key("old.txt"));
    assert_eq!(sink.count_containing("Copied a.txt"), 1);
    assert_eq!(sink.count_containing("Removed old.txt"), 1);
}

#[test]
fn test_unreadable_new_file_logs_one_error() {
    let pair = Pair::new(&[("bad.txt", "source"), ("ok.txt", "fine")], &[]);
    let sink = MemorySink::new();

    Reconciler::new(Arc::new(UnreadableStore::new("bad.txt")))
        .sync_once(&pair.source, &pair.replica, &sink);

    let errors = errors(&sink);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: failed to copy bad.txt:"));
    let replica = contents(&pair.replica);
    assert_eq!(replica.len(), 1);
    assert_eq!(replica["ok.txt"], b"fine");
}

#[test]
fn test_unreadable_replica_side_is_reported_and_overwritten() {
    // Comparison fails, so the file is copied; the copy reads only the source
    let pair = Pair::new(&[("x.txt", "source")], &[("x.txt", "replica")]);
    let sink = MemorySink::new();

    struct ReplicaUnreadable {
        inner: LocalStore,
        replica: PathBuf,
    }

    impl FileStore for ReplicaUnreadable {
        fn snapshot(&self, dir: &Path) -> Result<Snapshot, MirrorError> {
            self.inner.snapshot(dir)
        }

        fn fingerprint(&self, path: &Path) -> Result<Fingerprint, MirrorError> {
            if path.starts_with(&self.replica) {
                return Err(MirrorError::PermissionDenied {
                    path: path.to_path_buf(),
                    operation: "reading".to_string(),
                });
            }
            self.inner.fingerprint(path)
        }

        fn copy(&self, from: &Path, to: &Path) -> Result<u64, MirrorError> {
            self.inner.copy(from, to)
        }

        fn remove(&self, path: &Path) -> Result<(), MirrorError> {
            self.inner.remove(path)
        }
    }

    let store = ReplicaUnreadable {
        inner: LocalStore::default(),
        replica: pair.replica.clone(),
    };
    let report = Reconciler::new(Arc::new(store)).sync_once(&pair.source, &pair.replica, &sink);

    let records = sink.records();
    assert_eq!(records.len(), 2, "{:?}", records);
    assert!(records[0].starts_with("Error: cannot compare x.txt: Permission denied"));
    assert_eq!(records[1], "Copied x.txt from source to replica.");
    assert_eq!(report.stats.errors, 1);
    assert_eq!(report.stats.files_copied, 1);
    assert!(!report.actions[0].succeeded());
    assert_eq!(fs::read_to_string(pair.replica.join("x.txt")).unwrap(), "source");
}

#[test]
fn test_file_removed_after_listing() {
    let pair = Pair::new(&[("gone.txt", "soon"), ("stay.txt", "here")], &[]);
    let victim = pair.source.join("gone.txt");
    let sink = MemorySink::new();

    let report = Reconciler::new(Arc::new(VanishingStore::new(victim)))
        .sync_once(&pair.source, &pair.replica, &sink);

    let errors = errors(&sink);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("gone.txt"));
    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(contents(&pair.replica).keys().collect::<Vec<_>>(), vec!["stay.txt"]);
}

#[test]
fn test_replica_file_removed_before_delete() {
    let pair = Pair::new(&[], &[("extra.txt", "x"), ("other.txt", "y")]);
    let victim = pair.replica.join("extra.txt");
    let sink = MemorySink::new();

    Reconciler::new(Arc::new(VanishingStore::new(victim)))
        .sync_once(&pair.source, &pair.replica, &sink);

    let errors = errors(&sink);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error: failed to remove extra.txt:"));
    assert!(contents(&pair.replica).is_empty());
}

#[test]
fn test_missing_source_aborts_pass_without_touching_replica() {
    let pair = Pair::new(&[], &[("keep.txt", "data")]);
    fs::remove_dir(&pair.source).unwrap();
    let sink = MemorySink::new();

    let report = Reconciler::local(HashType::Blake3).sync_once(&pair.source, &pair.replica, &sink);

    assert!(report.aborted);
    assert_eq!(errors(&sink).len(), 1);
    assert!(errors(&sink)[0].starts_with("Error: cannot list source"));
    // An unlistable source must not look like an empty one
    assert_eq!(contents(&pair.replica).len(), 1);
}
