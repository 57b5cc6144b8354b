//! Property-style checks on generated data: permutation, monotonicity,
//! idempotence, and temp cleanup, across both merge strategies and enough
//! lines to force several merge levels.

use crate::helpers::{assert_permutation, assert_sorted, read_lines};
use linesort_lib::generate::{generate_file, GenerateOptions};
use linesort_lib::sort::{MergeStrategyKind, SortConfig, SortPipeline};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

fn scale_config(strategy: MergeStrategyKind, temp_dir: &TempDir) -> SortConfig {
    SortConfig::default()
        .with_chunk_bytes(8 * 1024)
        .with_merge_fanout(4)
        .with_max_concurrency(4)
        .with_strategy(strategy)
        .with_temp_dir(temp_dir.path().to_path_buf())
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_generated_data_permutation_and_order(#[case] strategy: MergeStrategyKind) {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");

    // ~500 KiB over 8 KiB chunks with fanout 4 forces multi-level merging.
    let options = GenerateOptions {
        target_bytes: 512 * 1024,
        seed: Some(1234),
        ..GenerateOptions::default()
    };
    let generated = generate_file(&input, &options).unwrap();

    let stats = SortPipeline::new(scale_config(strategy, &temp))
        .sort(&input, &output)
        .unwrap();

    assert_eq!(stats.lines_read, generated.lines);
    assert!(stats.runs_split > 16, "expected many runs, got {}", stats.runs_split);
    assert!(stats.merge_passes > 4, "expected several merge passes");

    let input_lines = read_lines(&input);
    let output_lines = read_lines(&output);
    assert_eq!(output_lines.len(), input_lines.len());
    let input_refs: Vec<&str> = input_lines.iter().map(String::as_str).collect();
    assert_permutation(&output_lines, &input_refs);
    assert_sorted(&output_lines);
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_idempotence(#[case] strategy: MergeStrategyKind) {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let once = dir.path().join("once.txt");
    let twice = dir.path().join("twice.txt");

    let options = GenerateOptions {
        target_bytes: 64 * 1024,
        seed: Some(99),
        ..GenerateOptions::default()
    };
    generate_file(&input, &options).unwrap();

    SortPipeline::new(scale_config(strategy, &temp)).sort(&input, &once).unwrap();
    SortPipeline::new(scale_config(strategy, &temp)).sort(&once, &twice).unwrap();

    assert_eq!(fs::read(&once).unwrap(), fs::read(&twice).unwrap());
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_temp_dir_cleaned_after_success(#[case] strategy: MergeStrategyKind) {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");

    let options = GenerateOptions {
        target_bytes: 32 * 1024,
        seed: Some(5),
        ..GenerateOptions::default()
    };
    generate_file(&input, &options).unwrap();

    SortPipeline::new(scale_config(strategy, &temp)).sort(&input, &output).unwrap();

    let leftover = fs::read_dir(temp.path()).unwrap().count();
    assert_eq!(leftover, 0, "temp dir should be empty after success");
}

#[test]
fn test_strategies_agree() {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let by_polyphase = dir.path().join("polyphase.txt");
    let by_kway = dir.path().join("kway.txt");

    let options = GenerateOptions {
        target_bytes: 128 * 1024,
        seed: Some(77),
        ..GenerateOptions::default()
    };
    generate_file(&input, &options).unwrap();

    SortPipeline::new(scale_config(MergeStrategyKind::Polyphase, &temp))
        .sort(&input, &by_polyphase)
        .unwrap();
    SortPipeline::new(scale_config(MergeStrategyKind::Kway, &temp))
        .sort(&input, &by_kway)
        .unwrap();

    assert_eq!(fs::read(&by_polyphase).unwrap(), fs::read(&by_kway).unwrap());
}

#[test]
fn test_single_worker_matches_parallel() {
    let dir = TempDir::new().unwrap();
    let temp = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let serial = dir.path().join("serial.txt");
    let parallel = dir.path().join("parallel.txt");

    let options = GenerateOptions {
        target_bytes: 96 * 1024,
        seed: Some(8),
        ..GenerateOptions::default()
    };
    generate_file(&input, &options).unwrap();

    SortPipeline::new(
        scale_config(MergeStrategyKind::Polyphase, &temp).with_max_concurrency(1),
    )
    .sort(&input, &serial)
    .unwrap();
    SortPipeline::new(
        scale_config(MergeStrategyKind::Polyphase, &temp).with_max_concurrency(4),
    )
    .sort(&input, &parallel)
    .unwrap();

    assert_eq!(fs::read(&serial).unwrap(), fs::read(&parallel).unwrap());
}
