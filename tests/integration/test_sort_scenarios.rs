//! End-to-end ordering scenarios, run against both merge strategies with a
//! chunk size small enough that every scenario crosses run boundaries.

use crate::helpers::{run_sort, tiny_config};
use linesort_lib::sort::MergeStrategyKind;
use rstest::rstest;

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_basic_mixed(#[case] strategy: MergeStrategyKind) {
    let input = [
        "5. Banana",
        "3. Cat",
        "2. Apple",
        "123. Pineapple",
        "32. Cherry is the best",
        "1. Apple",
        "5. Banana",
        "4. Dog",
        "15. Mango Juice",
        "6. Elephant",
    ];
    let (output, stats) = run_sort(&input, tiny_config(strategy));
    assert_eq!(
        output,
        vec![
            "1. Apple",
            "2. Apple",
            "5. Banana",
            "5. Banana",
            "3. Cat",
            "32. Cherry is the best",
            "4. Dog",
            "6. Elephant",
            "15. Mango Juice",
            "123. Pineapple",
        ]
    );
    assert_eq!(stats.lines_read, 10);
    assert!(stats.runs_split > 1, "scenario should span multiple runs");
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_case_rule(#[case] strategy: MergeStrategyKind) {
    let (output, _) = run_sort(&["10. APPLE", "5. apple", "10. Apple"], tiny_config(strategy));
    assert_eq!(output, vec!["5. apple", "10. Apple", "10. APPLE"]);
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_number_tiebreak_when_text_equal(#[case] strategy: MergeStrategyKind) {
    let (output, _) = run_sort(&["3. apple", "2. apple", "1. banana"], tiny_config(strategy));
    assert_eq!(output, vec!["2. apple", "3. apple", "1. banana"]);
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_negative_and_large_numbers(#[case] strategy: MergeStrategyKind) {
    let input = [
        "-5. Banana is yellow",
        "-1. Apple",
        "3147483647. Cherry is the best",
        "2. Cherry is the best",
    ];
    let (output, _) = run_sort(&input, tiny_config(strategy));
    assert_eq!(
        output,
        vec![
            "-1. Apple",
            "-5. Banana is yellow",
            "2. Cherry is the best",
            "3147483647. Cherry is the best",
        ]
    );
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_no_dot_prefix(#[case] strategy: MergeStrategyKind) {
    let (output, _) = run_sort(&["hello", "1. abc", "zzz"], tiny_config(strategy));
    assert_eq!(output, vec!["1. abc", "hello", "zzz"]);
}

#[rstest]
#[case::polyphase(MergeStrategyKind::Polyphase)]
#[case::kway(MergeStrategyKind::Kway)]
fn test_blank_lines_dropped(#[case] strategy: MergeStrategyKind) {
    let (output, _) = run_sort(&["2. b", "", "1. a", ""], tiny_config(strategy));
    assert_eq!(output, vec!["1. a", "2. b"]);
}

/// CRLF terminators and a BOM are accepted on input; output lines use the
/// platform terminator.
#[test]
fn test_crlf_and_bom_input() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    std::fs::write(&input, b"\xEF\xBB\xBF2. b\r\n1. a\r\n3. c\r\n").unwrap();

    linesort_lib::SortPipeline::new(tiny_config(MergeStrategyKind::Polyphase))
        .sort(&input, &output)
        .unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let mut expected = Vec::new();
    for line in ["1. a", "2. b", "3. c"] {
        expected.extend_from_slice(line.as_bytes());
        expected.extend_from_slice(linesort_lib::text_io::LINE_TERMINATOR);
    }
    assert_eq!(bytes, expected);
}

/// An unterminated final input line is sorted like any other and comes out
/// terminated.
#[test]
fn test_unterminated_last_line() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    std::fs::write(&input, b"2. b\n1. a").unwrap();

    linesort_lib::SortPipeline::new(tiny_config(MergeStrategyKind::Kway))
        .sort(&input, &output)
        .unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.ends_with('\n') || content.ends_with("\r\n"));
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["1. a", "2. b"]);
}

/// Non-UTF-8 bytes pass through untouched and compare by raw value.
#[test]
fn test_non_utf8_bytes_survive() {
    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    let output = dir.path().join("output.txt");
    std::fs::write(&input, b"2. b\xFF\n1. a\n").unwrap();

    linesort_lib::SortPipeline::new(tiny_config(MergeStrategyKind::Polyphase))
        .sort(&input, &output)
        .unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let mut expected = Vec::new();
    expected.extend_from_slice(b"1. a");
    expected.extend_from_slice(linesort_lib::text_io::LINE_TERMINATOR);
    expected.extend_from_slice(b"2. b\xFF");
    expected.extend_from_slice(linesort_lib::text_io::LINE_TERMINATOR);
    assert_eq!(bytes, expected);
}
