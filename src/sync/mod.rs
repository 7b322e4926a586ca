//! Sync module
//!
//! One-way, flat mirroring: fingerprinting, content comparison, directory
//! snapshots, the reconciler and the pass scheduler.

pub mod compare;
pub mod engine;
pub mod hash;
pub mod scheduler;
pub mod snapshot;

pub use compare::{content_equals, store_content_equals};
pub use engine::{plan, CopyReason, ExecutedAction, Reconciler, SyncAction, SyncReport, SyncStats};
pub use hash::{fingerprint, fingerprint_bytes, Fingerprint, HashType};
pub use scheduler::Scheduler;
pub use snapshot::{SkipReason, SkippedEntry, Snapshot};
