//! One-time startup checks for the source and replica directories.
//!
//! Sync passes assume both directories exist. This module is where a missing
//! directory is either rejected or, on request, created and seeded.

use std::fs;
use std::path::Path;

use crate::activity::Sink;
use crate::error::MirrorError;

/// Number of sample files written into a freshly created directory.
pub const SAMPLE_FILE_COUNT: usize = 3;

/// What to do when a directory does not exist at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingDirPolicy {
    /// Refuse to start.
    #[default]
    Fail,
    /// Create the directory and seed it with sample files.
    CreateWithSamples,
}

/// Make sure `path` is a listable directory, applying `policy` if it is missing.
pub fn prepare_directory(
    path: &Path,
    policy: MissingDirPolicy,
    sink: &dyn Sink,
) -> Result<(), MirrorError> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            fs::read_dir(path).map_err(|e| MirrorError::from_dir_io_error(e, "listing", path))?;
            Ok(())
        }
        Ok(_) => Err(MirrorError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => match policy {
            MissingDirPolicy::Fail => Err(MirrorError::DirectoryNotFound {
                path: path.to_path_buf(),
            }),
            MissingDirPolicy::CreateWithSamples => create_with_samples(path, sink),
        },
        Err(e) => Err(MirrorError::from_dir_io_error(e, "accessing", path)),
    }
}

fn create_with_samples(path: &Path, sink: &dyn Sink) -> Result<(), MirrorError> {
    fs::create_dir_all(path).map_err(|e| MirrorError::from_dir_io_error(e, "creating", path))?;
    sink.record(&format!("Created folder: {}", path.display()));

    for i in 1..=SAMPLE_FILE_COUNT {
        let sample = path.join(format!("SampleFile{}.txt", i));
        fs::write(&sample, format!("This is sample file {}.", i))
            .map_err(|e| MirrorError::from_io_error(e, "writing", Some(sample.clone())))?;
        sink.record(&format!("Created sample file: {}", sample.display()));
    }

    Ok(())
}
