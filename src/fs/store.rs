//! Storage seam for sync passes.
//!
//! The reconciler only touches files through a `FileStore`, which keeps the
//! pass logic independent of where the bytes live and lets tests inject
//! faults or count writes.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MirrorError;
use crate::sync::hash::{self, Fingerprint, HashType};
use crate::sync::snapshot::Snapshot;

/// File operations a sync pass needs.
pub trait FileStore: Send + Sync {
    /// Take a flat snapshot of `dir`.
    fn snapshot(&self, dir: &Path) -> Result<Snapshot, MirrorError>;

    /// Fingerprint the full content of `path`.
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, MirrorError>;

    /// Replace the entry at `to` with a regular file holding a copy of
    /// `from`. A symlink or special file at `to` is replaced, never written
    /// through. Returns the number of bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64, MirrorError>;

    /// Delete the file at `path`.
    fn remove(&self, path: &Path) -> Result<(), MirrorError>;
}

/// Local filesystem store
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore {
    algorithm: HashType,
}

impl LocalStore {
    pub fn new(algorithm: HashType) -> Self {
        Self { algorithm }
    }
}

impl FileStore for LocalStore {
    fn snapshot(&self, dir: &Path) -> Result<Snapshot, MirrorError> {
        Snapshot::read(dir)
    }

    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, MirrorError> {
        hash::fingerprint(path, self.algorithm)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64, MirrorError> {
        let mut source = File::open(from)
            .map_err(|e| MirrorError::from_io_error(e, "copying", Some(from.to_path_buf())))?;
        let staging = staging_path(to);

        let result = write_fresh(&mut source, &staging).and_then(|bytes| {
            // Replaces a link at `to`, not its target
            fs::rename(&staging, to)?;
            Ok(bytes)
        });

        result.map_err(|e| {
            let _ = fs::remove_file(&staging);
            MirrorError::from_io_error(e, "copying", Some(to.to_path_buf()))
        })
    }

    fn remove(&self, path: &Path) -> Result<(), MirrorError> {
        fs::remove_file(path)
            .map_err(|e| MirrorError::from_io_error(e, "removing", Some(path.to_path_buf())))
    }
}

/// Scratch name next to `to` that a copy is written under before it takes
/// `to`'s place. A leftover from an interrupted copy is a regular file
/// missing from the source, so the next pass deletes it.
fn staging_path(to: &Path) -> PathBuf {
    let name = to.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    to.with_file_name(format!(".{}.dirmirror-part", name))
}

/// Stream `source` into a newly created file at `path`, with the source's
/// permissions.
fn write_fresh(source: &mut File, path: &Path) -> io::Result<u64> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    // create_new refuses to open through an existing link
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let bytes = io::copy(source, &mut file)?;
    file.set_permissions(source.metadata()?.permissions())?;
    Ok(bytes)
}
