//! Generation-to-sort roundtrips.

use crate::helpers::{assert_sorted, read_lines};
use linesort_lib::generate::{generate_file, GenerateOptions};
use linesort_lib::sort::{SortConfig, SortPipeline};
use tempfile::TempDir;

#[test]
fn test_generated_file_sorts_cleanly() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("generated.txt");
    let output = dir.path().join("sorted.txt");

    let options = GenerateOptions {
        target_bytes: 64 * 1024,
        seed: Some(2024),
        duplicate_percent: 40,
        ..GenerateOptions::default()
    };
    let generated = generate_file(&input, &options).unwrap();
    assert!(generated.lines > 100);

    let config = SortConfig::default().with_chunk_bytes(4 * 1024).with_merge_fanout(4);
    let stats = SortPipeline::new(config).sort(&input, &output).unwrap();

    assert_eq!(stats.lines_read, generated.lines);
    let lines = read_lines(&output);
    assert_eq!(lines.len() as u64, generated.lines);
    assert_sorted(&lines);
}

#[test]
fn test_generated_size_close_to_target() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.txt");
    let target = 100 * 1024;

    let options = GenerateOptions {
        target_bytes: target,
        seed: Some(6),
        ..GenerateOptions::default()
    };
    let stats = generate_file(&path, &options).unwrap();

    assert!(stats.bytes >= target);
    // Overshoot is at most one line, which is far below 1 KiB here.
    assert!(stats.bytes < target + 1024, "overshoot too large: {}", stats.bytes);
}
