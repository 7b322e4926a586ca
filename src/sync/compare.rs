//! Content equality by fingerprint.
//!
//! No size or timestamp shortcut is taken: two files are equal exactly when
//! their fingerprints are.

use std::path::Path;

use crate::error::MirrorError;
use crate::fs::FileStore;
use crate::sync::hash::{fingerprint, HashType};

/// Compare two files on the local filesystem.
pub fn content_equals(a: &Path, b: &Path, algorithm: HashType) -> Result<bool, MirrorError> {
    let left = fingerprint(a, algorithm)?;
    let right = fingerprint(b, algorithm)?;
    Ok(left == right)
}

/// Compare two files through a store.
pub fn store_content_equals(
    store: &dyn FileStore,
    a: &Path,
    b: &Path,
) -> Result<bool, MirrorError> {
    let left = store.fingerprint(a)?;
    let right = store.fingerprint(b)?;
    Ok(left == right)
}
