// Activity records reach the persisted log file

use dirmirror::activity::{FileSink, MemorySink, Sink, TeeSink};
use dirmirror::sync::{HashType, Reconciler};
use std::fs;
use std::sync::Arc;

use crate::common::Pair;

#[test]
fn test_pass_records_are_appended_with_timestamps() {
    let pair = Pair::new(&[("a.txt", "hello")], &[("b.txt", "x")]);
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("logs").join("sync.log");

    let file_sink = FileSink::open(&log_path).unwrap();
    Reconciler::local(HashType::Blake3).sync_once(&pair.source, &pair.replica, &file_sink);

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Log started at "));
    assert_eq!(log.matches(" - Copied a.txt from source to replica.").count(), 1);
    assert_eq!(log.matches(" - Removed b.txt from replica.").count(), 1);

    // "YYYY-MM-DD HH:MM:SS - message"
    for line in &lines[1..] {
        let (stamp, _) = line.split_once(" - ").unwrap();
        assert_eq!(stamp.len(), 19, "bad timestamp in {:?}", line);
    }
}

#[test]
fn test_tee_writes_file_and_memory() {
    let pair = Pair::new(&[("a.txt", "hello")], &[]);
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("sync.log");

    let memory = Arc::new(MemorySink::new());
    let tee = TeeSink::new()
        .with_target(Arc::clone(&memory))
        .with_target(FileSink::open(&log_path).unwrap());
    let sink: Arc<dyn Sink> = Arc::new(tee);

    Reconciler::local(HashType::Md5).sync_once(&pair.source, &pair.replica, sink.as_ref());

    assert_eq!(memory.records(), vec!["Copied a.txt from source to replica.".to_string()]);
    assert!(fs::read_to_string(&log_path).unwrap().contains("Copied a.txt"));
}
