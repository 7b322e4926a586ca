// Scheduler loop behavior

use dirmirror::activity::MemorySink;
use dirmirror::sync::{HashType, Reconciler, Scheduler};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{contents, Pair, PanickingStore};

fn scheduler(
    pair: &Pair,
    reconciler: Reconciler,
    sink: Arc<MemorySink>,
    interval_ms: u64,
) -> Scheduler {
    Scheduler::new(
        reconciler,
        pair.source.clone(),
        pair.replica.clone(),
        Duration::from_millis(interval_ms),
        sink,
    )
}

#[tokio::test]
async fn test_ready_stop_runs_exactly_one_pass() {
    let pair = Pair::new(&[("a.txt", "hello")], &[]);
    let sink = Arc::new(MemorySink::new());
    let scheduler = scheduler(&pair, Reconciler::local(HashType::Blake3), sink.clone(), 10_000);

    let passes = scheduler.run_until(async {}).await;

    assert_eq!(passes, 1);
    assert_eq!(sink.count_containing("Starting synchronization of "), 1);
    assert_eq!(sink.count_containing("Synchronization complete."), 1);
    assert_eq!(contents(&pair.replica), contents(&pair.source));
}

#[tokio::test]
async fn test_repeated_passes_settle_to_silence() {
    let pair = Pair::new(&[("a.txt", "hello"), ("b.txt", "world")], &[("c.txt", "stale")]);
    let sink = Arc::new(MemorySink::new());
    let scheduler = scheduler(&pair, Reconciler::local(HashType::Blake3), sink.clone(), 10);

    let passes = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(passes >= 2, "only {} passes ran", passes);
    assert_eq!(sink.count_containing("Starting synchronization of "), passes);
    assert_eq!(sink.count_containing("Synchronization complete."), passes);
    // Only the first pass had work to do
    assert_eq!(sink.count_containing("Copied "), 2);
    assert_eq!(sink.count_containing("Removed "), 1);
    assert_eq!(sink.records().len(), passes * 2 + 3);
}

#[tokio::test]
async fn test_panicking_pass_does_not_stop_the_loop() {
    let pair = Pair::new(&[("a.txt", "hello")], &[]);
    let sink = Arc::new(MemorySink::new());
    let store = Arc::new(PanickingStore::new(1));
    let scheduler = scheduler(&pair, Reconciler::new(store.clone()), sink.clone(), 10);

    let passes = scheduler
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(store.panicked.load(Ordering::SeqCst));
    assert!(passes >= 2);
    assert_eq!(sink.count_containing("Error: sync pass aborted"), 1);
    assert_eq!(sink.count_containing("Synchronization complete."), passes);
    assert_eq!(contents(&pair.replica), contents(&pair.source));
}

#[tokio::test]
async fn test_changes_between_passes_are_picked_up() {
    let pair = Pair::new(&[("a.txt", "v1")], &[]);
    let sink = Arc::new(MemorySink::new());
    let scheduler = scheduler(&pair, Reconciler::local(HashType::Md5), sink.clone(), 60_000);

    scheduler.run_once().await.unwrap();
    std::fs::write(pair.source.join("a.txt"), "v2").unwrap();
    std::fs::write(pair.source.join("b.txt"), "new").unwrap();
    let report = scheduler.run_once().await.unwrap();

    assert_eq!(report.stats.files_copied, 2);
    assert_eq!(contents(&pair.replica), contents(&pair.source));
    assert_eq!(scheduler.interval(), Duration::from_secs(60));
}
