//! Periodic sync passes.
//!
//! Runs a pass, waits the interval, repeats. Passes never overlap: the next
//! wait starts only after the previous pass has finished, so the effective
//! period is interval plus pass duration.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::activity::Sink;
use crate::sync::engine::{Reconciler, SyncReport};

pub struct Scheduler {
    reconciler: Reconciler,
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    sink: Arc<dyn Sink>,
}

impl Scheduler {
    pub fn new(
        reconciler: Reconciler,
        source: PathBuf,
        replica: PathBuf,
        interval: Duration,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            reconciler,
            source,
            replica,
            interval,
            sink,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one logged pass on the blocking pool.
    ///
    /// A panic inside the pass is logged and yields `None`.
    pub async fn run_once(&self) -> Option<SyncReport> {
        self.sink.record(&format!(
            "Starting synchronization of {} and {}.",
            self.source.display(),
            self.replica.display()
        ));

        let reconciler = self.reconciler.clone();
        let source = self.source.clone();
        let replica = self.replica.clone();
        let sink = Arc::clone(&self.sink);

        let report = match tokio::task::spawn_blocking(move || {
            reconciler.sync_once(&source, &replica, sink.as_ref())
        })
        .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                self.sink.record(&format!("Error: sync pass aborted: {}", e));
                None
            }
        };

        self.sink.record("Synchronization complete.");
        report
    }

    /// Run passes forever. Only process termination stops it.
    pub async fn run(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Run passes until `stop` completes. Returns the number of passes run.
    ///
    /// `stop` is only observed between passes; a running pass always finishes.
    pub async fn run_until<F: Future>(&self, stop: F) -> usize {
        tokio::pin!(stop);
        let mut passes = 0;

        loop {
            if let Some(report) = self.run_once().await {
                debug!("Pass {} stats: {:?}", passes + 1, report.stats);
            }
            passes += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut stop => break,
            }
        }

        passes
    }
}
