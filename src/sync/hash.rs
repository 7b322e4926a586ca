//! Content fingerprints for sync decisions.
//!
//! Files are streamed through the digest in fixed-size blocks, so memory use
//! does not grow with file size. BLAKE3 is the default; MD5 is kept for
//! compatibility with existing mirror logs that recorded MD5 checksums.

use md5::{Digest as Md5Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::error::MirrorError;

/// Read block size for streaming digests.
const BUFFER_SIZE: usize = 64 * 1024;

/// Buffers above this size are hashed with BLAKE3's multithreaded path.
const PARALLEL_THRESHOLD: usize = 128 * 1024;

/// Hash algorithm type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashType {
    /// BLAKE3 - fast and secure (default).
    #[default]
    Blake3,
    /// MD5 - weaker, but plenty for detecting accidental changes.
    Md5,
}

impl HashType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Md5 => "md5",
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(Self::Blake3),
            "md5" => Ok(Self::Md5),
            other => Err(format!(
                "unsupported hash algorithm '{}' (expected blake3 or md5)",
                other
            )),
        }
    }
}

/// A computed content fingerprint.
///
/// Equality compares the algorithm as well as the digest bytes, so
/// fingerprints produced by different algorithms never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: HashType,
    digest: Vec<u8>,
}

impl Fingerprint {
    pub fn algorithm(&self) -> HashType {
        self.algorithm
    }

    /// Lowercase hex form, used for comparison output and logs.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.digest)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Running digest state for either algorithm.
enum DigestState {
    Blake3(Box<blake3::Hasher>),
    Md5(Md5),
}

impl DigestState {
    fn new(algorithm: HashType) -> Self {
        match algorithm {
            HashType::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
            HashType::Md5 => Self::Md5(Md5::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Blake3(hasher) => {
                if data.len() > PARALLEL_THRESHOLD {
                    hasher.update_rayon(data);
                } else {
                    hasher.update(data);
                }
            }
            Self::Md5(hasher) => Md5Digest::update(hasher, data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Blake3(hasher) => hasher.finalize().as_bytes().to_vec(),
            Self::Md5(hasher) => Md5Digest::finalize(hasher).to_vec(),
        }
    }
}

/// Fingerprint an in-memory buffer.
pub fn fingerprint_bytes(data: &[u8], algorithm: HashType) -> Fingerprint {
    let mut state = DigestState::new(algorithm);
    state.update(data);
    Fingerprint {
        algorithm,
        digest: state.finalize(),
    }
}

/// Fingerprint everything a reader yields, one block at a time.
pub fn fingerprint_reader<R: Read>(mut reader: R, algorithm: HashType) -> io::Result<Fingerprint> {
    let mut state = DigestState::new(algorithm);
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        state.update(&buffer[..bytes_read]);
    }

    Ok(Fingerprint {
        algorithm,
        digest: state.finalize(),
    })
}

/// Fingerprint a file's full content.
///
/// Fails when the file cannot be opened or read, e.g. it was removed after
/// the directory was listed.
pub fn fingerprint(path: &Path, algorithm: HashType) -> Result<Fingerprint, MirrorError> {
    let file = File::open(path)
        .map_err(|e| MirrorError::from_io_error(e, "opening", Some(path.to_path_buf())))?;

    fingerprint_reader(file, algorithm)
        .map_err(|e| MirrorError::from_io_error(e, "reading", Some(path.to_path_buf())))
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
