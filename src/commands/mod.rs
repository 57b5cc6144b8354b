//! CLI command implementations for linesort.
//!
//! Each submodule implements one subcommand:
//!
//! - [`sort`] - external merge-sort of a text file
//! - [`generate`] - random test-data generation

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod command;
pub mod common;
pub mod generate;
pub mod sort;
