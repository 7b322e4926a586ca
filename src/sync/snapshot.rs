//! Flat directory snapshots.
//!
//! A snapshot is the set of regular-file names directly inside a directory,
//! taken with a single `read_dir` call. Anything else found in the listing is
//! kept aside as a skipped entry so callers can report it.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MirrorError;

/// Why a directory entry was left out of the file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Directory,
    Symlink,
    /// Sockets, FIFOs, device nodes.
    Special,
    /// Name is not valid UTF-8.
    NonUtf8Name,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Directory => "subdirectory",
            Self::Symlink => "symbolic link",
            Self::Special => "special file",
            Self::NonUtf8Name => "non UTF-8 name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Lossy display form of the entry name.
    pub name: String,
    pub reason: SkipReason,
}

/// Regular files present directly inside one directory at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    dir: PathBuf,
    /// Listing order, as returned by the filesystem.
    files: Vec<String>,
    index: HashSet<String>,
    skipped: Vec<SkippedEntry>,
}

impl Snapshot {
    /// List `dir` once.
    ///
    /// A missing directory is an error, never an empty snapshot.
    pub fn read(dir: &Path) -> Result<Self, MirrorError> {
        let read_dir =
            fs::read_dir(dir).map_err(|e| MirrorError::from_dir_io_error(e, "listing", dir))?;

        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for entry in read_dir {
            let entry = entry.map_err(|e| MirrorError::from_dir_io_error(e, "listing", dir))?;
            // Does not follow symlinks
            let file_type = entry
                .file_type()
                .map_err(|e| MirrorError::from_io_error(e, "inspecting", Some(entry.path())))?;

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    skipped.push(SkippedEntry {
                        name: raw.to_string_lossy().into_owned(),
                        reason: SkipReason::NonUtf8Name,
                    });
                    continue;
                }
            };

            if file_type.is_file() {
                files.push(name);
            } else {
                let reason = if file_type.is_dir() {
                    SkipReason::Directory
                } else if file_type.is_symlink() {
                    SkipReason::Symlink
                } else {
                    SkipReason::Special
                };
                skipped.push(SkippedEntry { name, reason });
            }
        }

        Ok(Self::build(dir.to_path_buf(), files, skipped))
    }

    /// Build a snapshot from known file names without touching the filesystem.
    pub fn from_names<I, S>(dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(dir.into(), names.into_iter().map(Into::into).collect(), Vec::new())
    }

    fn build(dir: PathBuf, files: Vec<String>, skipped: Vec<SkippedEntry>) -> Self {
        let index = files.iter().cloned().collect();
        Self {
            dir,
            files,
            index,
            skipped,
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Why `name` was skipped, if a non-regular entry of exactly that name
    /// was listed.
    pub fn skipped_as(&self, name: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|entry| entry.reason != SkipReason::NonUtf8Name && entry.name == name)
            .map(|entry| entry.reason)
    }

    /// Full path of `name` inside the snapshot's directory.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
