// Centralized error handling module
// Error types with path and operation context for sync passes and startup checks

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Main error type for mirroring operations
#[derive(Debug)]
pub enum MirrorError {
    /// Startup errors: the directory pair cannot be used at all
    DirectoryNotFound { path: PathBuf },
    NotADirectory { path: PathBuf },

    /// Per-file errors raised during a pass
    FileNotFound { path: PathBuf },
    PermissionDenied { path: PathBuf, operation: String },
    Io { path: Option<PathBuf>, operation: String, source: io::Error },
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MirrorError::DirectoryNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            MirrorError::NotADirectory { path } => {
                write!(f, "Not a directory: {}", path.display())
            }
            MirrorError::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            MirrorError::PermissionDenied { path, operation } => {
                write!(f, "Permission denied while {} {}", operation, path.display())
            }
            MirrorError::Io { path, operation, source } => {
                if let Some(p) = path {
                    write!(f, "I/O error while {} {}: {}", operation, p.display(), source)
                } else {
                    write!(f, "I/O error while {}: {}", operation, source)
                }
            }
        }
    }
}

impl std::error::Error for MirrorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MirrorError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl MirrorError {
    /// Create an error from an io::Error raised on a file, picking the
    /// specific variant from its kind.
    ///
    /// `operation` is a present-participle phrase such as "reading"; it only
    /// ends up in the message.
    pub fn from_io_error(err: io::Error, operation: &str, path: Option<PathBuf>) -> Self {
        Self::classify(err, operation, path, |path| MirrorError::FileNotFound { path })
    }

    /// Same as `from_io_error` for an error raised on a directory: NotFound
    /// becomes `DirectoryNotFound`.
    pub fn from_dir_io_error(err: io::Error, operation: &str, path: &Path) -> Self {
        Self::classify(err, operation, Some(path.to_path_buf()), |path| {
            MirrorError::DirectoryNotFound { path }
        })
    }

    fn classify(
        err: io::Error,
        operation: &str,
        path: Option<PathBuf>,
        not_found: fn(PathBuf) -> Self,
    ) -> Self {
        match (err.kind(), path) {
            (io::ErrorKind::NotFound, Some(p)) => not_found(p),
            (io::ErrorKind::PermissionDenied, Some(p)) => MirrorError::PermissionDenied {
                path: p,
                operation: operation.to_string(),
            },
            (_, path) => MirrorError::Io {
                path,
                operation: operation.to_string(),
                source: err,
            },
        }
    }

    /// Whether this error concerns a whole directory rather than a single file.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            MirrorError::DirectoryNotFound { .. } | MirrorError::NotADirectory { .. }
        )
    }
}

impl From<io::Error> for MirrorError {
    fn from(err: io::Error) -> Self {
        MirrorError::from_io_error(err, "unknown operation", None)
    }
}
