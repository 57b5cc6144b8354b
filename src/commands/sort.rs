//! Sort a text file of numbered lines.
//!
//! Runs the external merge-sort pipeline: split the input into bounded
//! runs, sort runs on parallel workers, merge with the selected strategy,
//! and atomically publish the result.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use linesort_lib::logging::OperationTimer;
use linesort_lib::sort::{MergeStrategyKind, SortConfig, SortPipeline};
use linesort_lib::validation::{validate_at_least, validate_file_exists, validate_positive};
use log::info;
use std::path::PathBuf;

use crate::commands::command::Command;
use crate::commands::common::parse_size;

/// Merge strategy selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Three-tape polyphase merge (two readers active at a time)
    Polyphase,
    /// Heap-driven k-way merge (opens the whole batch at once)
    Kway,
}

impl From<StrategyArg> for MergeStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Polyphase => MergeStrategyKind::Polyphase,
            StrategyArg::Kway => MergeStrategyKind::Kway,
        }
    }
}

/// Sort a text file.
///
/// Lines of the form `<integer>. <text>` are ordered text-first
/// (case-insensitive, lowercase winning ties) with the number as the final
/// tiebreak; files larger than memory spill to sorted runs on disk.
#[derive(Debug, Parser)]
#[command(
    name = "sort",
    about = "Sort a text file of '<number>. <text>' lines",
    long_about = r#"
Sort a text file using external merge-sort.

Each line has the form '<integer>. <text>'; the prefix and the '. '
separator are optional (a line without them sorts with number 0 and the
whole line as text). The order is text-first and case-insensitive, with
lowercase winning exact-case ties and the number deciding equal texts.

The input never needs to fit in memory: it is cut into chunk-sized runs,
runs are sorted on parallel workers, and sorted runs are merged in
batches until one file remains.

EXAMPLES:

  # Sort with defaults (64M chunks, polyphase merge)
  linesort sort -i input.txt -o sorted.txt

  # Bounded memory on a small machine
  linesort sort -i input.txt -o sorted.txt --chunk-size 8M --threads 2

  # K-way merge with a wide fanout on a fast SSD
  linesort sort -i input.txt -o sorted.txt --strategy kway --merge-fanout 128
"#
)]
pub struct Sort {
    /// Input text file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file; overwritten if present.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Target size of one in-memory run.
    ///
    /// Accepts values like "512K", "64M", "1G". Larger runs use more RAM
    /// per worker but need fewer merge passes.
    #[arg(short = 'c', long = "chunk-size", default_value = "64M", value_parser = parse_size)]
    pub chunk_size: u64,

    /// Maximum sorted runs merged in one pass.
    #[arg(short = 'f', long = "merge-fanout", default_value = "64")]
    pub merge_fanout: usize,

    /// Worker threads for run sorting and merging.
    ///
    /// Defaults to min(cores, 4); the sort is I/O-bound beyond that.
    #[arg(short = '@', short_alias = 't', long = "threads")]
    pub threads: Option<usize>,

    /// Temporary directory for intermediate runs.
    ///
    /// If not specified, uses the system default temp directory. For best
    /// performance, use a fast disk on the same filesystem as the output.
    #[arg(short = 'T', long = "tmp-dir")]
    pub tmp_dir: Option<PathBuf>,

    /// Per-reader buffer size.
    #[arg(long = "read-buffer", default_value = "40K", value_parser = parse_size)]
    pub read_buffer: u64,

    /// Per-writer buffer size.
    #[arg(long = "write-buffer", default_value = "64K", value_parser = parse_size)]
    pub write_buffer: u64,

    /// Merge strategy.
    #[arg(long = "strategy", value_enum, default_value = "polyphase")]
    pub strategy: StrategyArg,

    /// Keep the temp directory when the sort fails, for debugging.
    #[arg(long = "keep-temp-on-error", default_value = "false")]
    pub keep_temp_on_error: bool,
}

impl Command for Sort {
    fn execute(&self) -> Result<()> {
        validate_file_exists(&self.input)?;
        validate_positive(self.chunk_size, "chunk-size")?;
        validate_at_least(self.merge_fanout, 2, "merge-fanout")?;
        if let Some(threads) = self.threads {
            validate_positive(threads, "threads")?;
        }

        let mut config = SortConfig::default()
            .with_chunk_bytes(self.chunk_size)
            .with_merge_fanout(self.merge_fanout)
            .with_read_buf_bytes(self.read_buffer as usize)
            .with_write_buf_bytes(self.write_buffer as usize)
            .with_strategy(self.strategy.into())
            .with_keep_temp_on_error(self.keep_temp_on_error);
        if let Some(threads) = self.threads {
            config = config.with_max_concurrency(threads);
        }
        if let Some(ref tmp) = self.tmp_dir {
            config = config.with_temp_dir(tmp.clone());
        }

        let timer = OperationTimer::new("Sorting");
        let stats = SortPipeline::new(config).sort(&self.input, &self.output)?;

        info!("=== Summary ===");
        info!("Lines sorted: {}", stats.lines_read);
        info!("Runs split: {}", stats.runs_split);
        info!("Merge passes: {}", stats.merge_passes);
        info!("Output: {}", self.output.display());
        timer.log_completion(stats.lines_read);
        Ok(())
    }
}
