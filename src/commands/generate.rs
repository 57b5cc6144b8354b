//! Generate a random test file of numbered lines.

use anyhow::Result;
use bytesize::ByteSize;
use clap::Parser;
use linesort_lib::generate::{generate_file, GenerateOptions};
use linesort_lib::logging::OperationTimer;
use linesort_lib::validation::validate_positive;
use log::info;
use std::path::PathBuf;

use crate::commands::command::Command;

/// Generate random test data.
///
/// Writes a file of `<integer>. <text>` lines with Poisson-distributed
/// line lengths and a configurable share of duplicated texts, suitable for
/// exercising `linesort sort` at any scale.
#[derive(Debug, Parser)]
#[command(
    name = "generate",
    about = "Generate a random file of '<number>. <text>' lines",
    long_about = r#"
Generate a random test file for the sorter.

Line texts are drawn from a mixed-case word stock with the number of words
per line following a Poisson distribution; a configurable percentage of
lines reuses an earlier text so equal-text lines (ordered by number) occur
naturally. Passing --seed makes the output reproducible.

EXAMPLES:

  # A 100 MB file in the current directory
  linesort generate --file-name data.txt --file-size 100

  # Reproducible 1 GB file in /data
  linesort generate --file-name big.txt --file-size 1024 --output-dir /data --seed 42
"#
)]
pub struct Generate {
    /// Name of the file to create.
    #[arg(short = 'n', long = "file-name")]
    pub file_name: String,

    /// Target file size in megabytes.
    #[arg(short = 's', long = "file-size")]
    pub file_size: u64,

    /// Directory to create the file in.
    #[arg(short = 'd', long = "output-dir", default_value = ".")]
    pub output_dir: PathBuf,

    /// Seed for reproducible output.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Mean words per line (Poisson).
    #[arg(long = "mean-words", default_value = "4.0")]
    pub mean_words: f64,

    /// Numbers are drawn from -max-number..=max-number.
    #[arg(long = "max-number", default_value = "100000")]
    pub max_number: i64,

    /// Percentage of lines that repeat an earlier text.
    #[arg(long = "duplicate-percent", default_value = "20")]
    pub duplicate_percent: u8,
}

impl Command for Generate {
    fn execute(&self) -> Result<()> {
        validate_positive(self.file_size, "file-size")?;
        validate_positive(self.max_number, "max-number")?;
        if self.duplicate_percent > 100 {
            anyhow::bail!("--duplicate-percent must be at most 100");
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(&self.file_name);
        let target_bytes = self.file_size * 1024 * 1024;

        info!("generating {} of random lines into {}", ByteSize::b(target_bytes), path.display());
        if let Some(seed) = self.seed {
            info!("seed: {seed}");
        }

        let options = GenerateOptions {
            target_bytes,
            seed: self.seed,
            mean_words: self.mean_words,
            max_number: self.max_number,
            duplicate_percent: self.duplicate_percent,
            ..GenerateOptions::default()
        };

        let timer = OperationTimer::new("Generating");
        let stats = generate_file(&path, &options)?;

        info!("=== Summary ===");
        info!("Lines written: {}", stats.lines);
        info!("Bytes written: {}", ByteSize::b(stats.bytes));
        info!("Output: {}", path.display());
        timer.log_completion(stats.lines);
        Ok(())
    }
}
