use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use dirmirror::activity::{self, ConsoleSink, FileSink, Sink, TeeSink};
use dirmirror::bootstrap::prepare_directory;
use dirmirror::config::{Cli, MirrorConfig};
use dirmirror::sync::{Reconciler, Scheduler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = MirrorConfig::from(Cli::parse());

    if let Err(e) = activity::init_diagnostics() {
        eprintln!("Warning: diagnostics disabled: {}", e);
    }

    println!("Logging to {}", config.log_file.display());
    let file_sink = FileSink::open(&config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
    let sink: Arc<dyn Sink> = Arc::new(
        TeeSink::new()
            .with_target(ConsoleSink::new())
            .with_target(file_sink),
    );

    // Both directories must be usable before the first pass
    prepare_directory(&config.source, config.missing_dirs, sink.as_ref())
        .context("Source directory is not usable")?;
    prepare_directory(&config.replica, config.missing_dirs, sink.as_ref())
        .context("Replica directory is not usable")?;

    let scheduler = Scheduler::new(
        Reconciler::local(config.algorithm),
        config.source.clone(),
        config.replica.clone(),
        config.interval,
        sink,
    );

    if config.once {
        scheduler.run_once().await;
    } else {
        scheduler.run().await;
    }

    Ok(())
}
