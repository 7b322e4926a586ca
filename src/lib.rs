// Library module for dirmirror
// Re-exports modules for use in integration tests and the binary

pub mod activity;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod fs;
pub mod sync;

pub use error::MirrorError;
