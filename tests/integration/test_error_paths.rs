//! Failure-mode coverage: unreadable input, unwritable output with data
//! retention, and cooperative cancellation.

use crate::helpers::write_input;
use linesort_lib::sort::{MergeStrategyKind, SortConfig, SortPipeline};
use linesort_lib::SortError;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

#[test]
fn test_missing_input_is_input_not_readable() {
    let dir = TempDir::new().unwrap();
    let err = SortPipeline::new(SortConfig::default())
        .sort(Path::new("/nonexistent/input.txt"), &dir.path().join("out.txt"))
        .err()
        .expect("sort should fail");
    assert!(matches!(err, SortError::InputNotReadable { .. }), "got {err}");
}

#[test]
fn test_unwritable_output_retains_sorted_data() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    write_input(&input, &["2. b", "1. a", "3. c"]);
    // Publishing into a directory that does not exist must fail.
    let output = dir.path().join("no-such-dir").join("out.txt");

    let err = SortPipeline::new(SortConfig::default())
        .sort(&input, &output)
        .err()
        .expect("publish should fail");

    match err {
        SortError::OutputNotWritable { retained, output: reported, .. } => {
            assert_eq!(reported, output);
            assert!(retained.exists(), "retained sorted file must survive");
            let content = fs::read_to_string(&retained).unwrap();
            assert_eq!(content.lines().collect::<Vec<_>>(), vec!["1. a", "2. b", "3. c"]);
            fs::remove_dir_all(retained.parent().unwrap()).unwrap();
        }
        other => panic!("expected OutputNotWritable, got {other}"),
    }
}

#[test]
fn test_cancellation_before_start() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    write_input(&input, &["1. a", "2. b"]);

    let cancel = AtomicBool::new(true);
    let err = SortPipeline::new(SortConfig::default())
        .sort_with_cancel(&input, &dir.path().join("out.txt"), &cancel)
        .err()
        .expect("sort should observe cancellation");
    assert!(matches!(err, SortError::Cancelled), "got {err}");
}

#[test]
fn test_cancelled_sort_cleans_temp_dir_by_default() {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    write_input(&input, &["1. a", "2. b"]);

    let cancel = AtomicBool::new(true);
    let config = SortConfig::default()
        .with_temp_dir(temp.path().to_path_buf())
        .with_strategy(MergeStrategyKind::Kway);
    let _ = SortPipeline::new(config)
        .sort_with_cancel(&input, &dir.path().join("out.txt"), &cancel)
        .err()
        .expect("cancelled");

    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_cancelled_sort_keeps_temp_dir_when_configured() {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    write_input(&input, &["1. a", "2. b"]);

    let cancel = AtomicBool::new(true);
    let config = SortConfig::default()
        .with_temp_dir(temp.path().to_path_buf())
        .with_keep_temp_on_error(true);
    let _ = SortPipeline::new(config)
        .sort_with_cancel(&input, &dir.path().join("out.txt"), &cancel)
        .err()
        .expect("cancelled");

    assert_eq!(
        fs::read_dir(temp.path()).unwrap().count(),
        1,
        "session directory should be retained"
    );
}
