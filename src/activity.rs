//! Activity log.
//!
//! Every notable sync event (pass start/end, copy, delete, per-file error) is
//! handed to a [`Sink`] as one plain message. Production wires a console
//! target and an append-only file target behind a [`TeeSink`]; tests use
//! [`MemorySink`].
//!
//! Internal diagnostics go through `tracing` instead, see [`init_diagnostics`].

use chrono::Local;
use colored::Colorize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::MirrorError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default diagnostics filter when `RUST_LOG` is unset.
const DEFAULT_DIAGNOSTICS_FILTER: &str = "warn";

/// Destination for activity records.
pub trait Sink: Send + Sync {
    fn record(&self, message: &str);
}

fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Prints records to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for ConsoleSink {
    fn record(&self, message: &str) {
        let line = if message.starts_with("Error") {
            message.red().to_string()
        } else {
            message.to_string()
        };
        println!("{} {}", timestamp().as_str().dimmed(), line);
    }
}

/// Appends `<timestamp> - <message>` lines to a log file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open `path` for appending.
    ///
    /// Missing parent directories are created. A new file starts with a
    /// `Log started at` header line.
    pub fn open(path: &Path) -> Result<Self, MirrorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| MirrorError::from_dir_io_error(e, "creating log directory", parent))?;
        }

        let is_new = !path.exists();
        let log_error = |e: std::io::Error, operation: &str| {
            MirrorError::from_io_error(e, operation, Some(path.to_path_buf()))
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| log_error(e, "opening log file"))?;

        if is_new {
            writeln!(file, "Log started at {}", timestamp())
                .map_err(|e| log_error(e, "writing log file"))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }
}

impl Sink for FileSink {
    fn record(&self, message: &str) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(file, "{} - {}", timestamp(), message) {
            tracing::warn!("Failed to append to {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far, oldest first.
    pub fn records(&self) -> Vec<String> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of records containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.contains(needle))
            .count()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Sink for MemorySink {
    fn record(&self, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

/// Forwards each record to every registered target, in registration order.
#[derive(Default)]
pub struct TeeSink {
    targets: Vec<Box<dyn Sink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Sink + 'static) -> Self {
        self.targets.push(Box::new(target));
        self
    }
}

impl Sink for TeeSink {
    fn record(&self, message: &str) {
        for target in &self.targets {
            target.record(message);
        }
    }
}

impl<S: Sink + ?Sized> Sink for std::sync::Arc<S> {
    fn record(&self, message: &str) {
        (**self).record(message);
    }
}

/// Install the stderr diagnostics subscriber.
///
/// Filtered by `RUST_LOG`, defaulting to warnings only so the console stays
/// reserved for activity records.
pub fn init_diagnostics() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_DIAGNOSTICS_FILTER))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
