//! Integration tests for the linesort library.
//!
//! These tests validate end-to-end workflows that span multiple modules:
//! splitting, parallel run sorting, both merge strategies, error paths, and
//! test-data generation.

mod helpers;
mod test_error_paths;
mod test_generate;
mod test_sort_properties;
mod test_sort_scenarios;
