//! Command-line configuration.

use clap::Parser;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::bootstrap::MissingDirPolicy;
use crate::sync::hash::HashType;

/// Mirror a directory into a replica on a fixed interval.
#[derive(Debug, Parser)]
#[command(name = "dirmirror", version)]
pub struct Cli {
    /// Directory to mirror from
    pub source: PathBuf,

    /// Directory kept identical to SOURCE
    pub replica: PathBuf,

    /// Seconds to wait between sync passes
    pub interval: NonZeroU64,

    /// Append-only activity log, created with its parent directory if missing
    pub log_file: PathBuf,

    /// Content fingerprint algorithm: blake3 or md5
    #[arg(long, default_value = "blake3")]
    pub algorithm: HashType,

    /// Create missing SOURCE/REPLICA directories and seed them with sample files
    #[arg(long)]
    pub create_missing: bool,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval: Duration,
    pub log_file: PathBuf,
    pub algorithm: HashType,
    pub missing_dirs: MissingDirPolicy,
    pub once: bool,
}

impl From<Cli> for MirrorConfig {
    fn from(cli: Cli) -> Self {
        Self {
            source: cli.source,
            replica: cli.replica,
            interval: Duration::from_secs(cli.interval.get()),
            log_file: cli.log_file,
            algorithm: cli.algorithm,
            missing_dirs: if cli.create_missing {
                MissingDirPolicy::CreateWithSamples
            } else {
                MissingDirPolicy::Fail
            },
            once: cli.once,
        }
    }
}
