//! Text-file helpers and assertions for integration tests.

#![allow(dead_code)]

use linesort_lib::sort::keys::{compare, Line};
use linesort_lib::sort::{MergeStrategyKind, SortConfig, SortPipeline, SortStats};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `lines` to `path`, LF-terminated.
pub fn write_input(path: &Path, lines: &[&str]) {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

/// Read `path` back as a vector of lines.
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
}

/// A small configuration that forces multiple runs and multi-level merges
/// even on tiny inputs.
pub fn tiny_config(strategy: MergeStrategyKind) -> SortConfig {
    SortConfig::default()
        .with_chunk_bytes(32)
        .with_merge_fanout(3)
        .with_max_concurrency(2)
        .with_strategy(strategy)
}

/// Sort `input_lines` through the full pipeline and return the output lines.
pub fn run_sort(input_lines: &[&str], config: SortConfig) -> (Vec<String>, SortStats) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    write_input(&input, input_lines);

    let stats = SortPipeline::new(config).sort(&input, &output).unwrap();
    (read_lines(&output), stats)
}

/// Asserts the lines are non-decreasing under the sort comparator.
pub fn assert_sorted(lines: &[String]) {
    for pair in lines.windows(2) {
        let a = Line::parse(pair[0].as_bytes().to_vec());
        let b = Line::parse(pair[1].as_bytes().to_vec());
        assert_ne!(
            compare(&a, &b),
            Ordering::Greater,
            "output out of order: {:?} before {:?}",
            pair[0],
            pair[1]
        );
    }
}

/// Asserts `actual` is a permutation of `expected`.
pub fn assert_permutation(actual: &[String], expected: &[&str]) {
    let mut actual_counts: HashMap<&str, usize> = HashMap::new();
    for line in actual {
        *actual_counts.entry(line.as_str()).or_default() += 1;
    }
    let mut expected_counts: HashMap<&str, usize> = HashMap::new();
    for line in expected {
        *expected_counts.entry(line).or_default() += 1;
    }
    assert_eq!(actual_counts, expected_counts, "output is not a permutation of the input");
}
