//! Random test-file generation.
//!
//! Produces files of `<number>. <text>` lines for benchmarking and testing
//! the sort. The words-per-line count follows a Poisson distribution, and a
//! configurable fraction of lines reuses an earlier text so the numeric
//! tiebreak gets exercised. Generation is deterministic under a fixed seed.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use std::io::Write;
use std::path::Path;

use crate::text_io::{open_for_write, LINE_TERMINATOR};

/// Texts eligible for duplication are pooled up to this many entries.
const TEXT_POOL_SIZE: usize = 1024;

/// Word stock for generated texts. Mixed case on purpose: the sort's
/// case-insensitive primary phase and inverted case tiebreak both need
/// collisions to be visible in generated data.
const WORDS: &[&str] = &[
    "apple", "Apple", "banana", "Banana", "cherry", "Cherry", "dog", "Dog", "elephant",
    "mango", "Mango", "juice", "pineapple", "Pineapple", "grape", "kiwi", "lemon", "Lemon",
    "orange", "peach", "pear", "plum", "berry", "Berry", "melon", "fig", "date", "lime",
    "coconut", "papaya", "quince", "raisin", "walnut", "almond", "cashew", "pecan",
];

/// Generation parameters.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Stop once at least this many bytes are written.
    pub target_bytes: u64,
    /// Seed for deterministic output; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Mean of the Poisson words-per-line distribution.
    pub mean_words: f64,
    /// Numbers are drawn uniformly from `-max_number..=max_number`.
    pub max_number: i64,
    /// Percentage of lines (0-100) that reuse an earlier text.
    pub duplicate_percent: u8,
    /// Writer buffer size in bytes.
    pub write_buf_bytes: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            target_bytes: 1024 * 1024,
            seed: None,
            mean_words: 4.0,
            max_number: 100_000,
            duplicate_percent: 20,
            write_buf_bytes: crate::sort::pipeline::DEFAULT_WRITE_BUF_BYTES,
        }
    }
}

/// Statistics from one generation run.
#[derive(Debug, Default)]
pub struct GenerateStats {
    /// Lines written.
    pub lines: u64,
    /// Bytes written, terminators included.
    pub bytes: u64,
}

/// Create a seeded or OS-seeded random generator.
#[must_use]
pub fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Generate a random line file at `path`.
pub fn generate_file(path: &Path, options: &GenerateOptions) -> Result<GenerateStats> {
    let mut rng = create_rng(options.seed);
    let poisson =
        Poisson::new(options.mean_words.max(0.1)).context("invalid words-per-line mean")?;
    let mut writer = open_for_write(path, options.write_buf_bytes)
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut pool: Vec<String> = Vec::new();
    let mut stats = GenerateStats::default();

    while stats.bytes < options.target_bytes {
        let reuse = !pool.is_empty()
            && rng.random_range(0..100u32) < u32::from(options.duplicate_percent);
        let text = if reuse {
            pool[rng.random_range(0..pool.len())].clone()
        } else {
            let words = (poisson.sample(&mut rng) as usize).max(1);
            let text: String = (0..words)
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect::<Vec<_>>()
                .join(" ");
            if pool.len() < TEXT_POOL_SIZE {
                pool.push(text.clone());
            }
            text
        };

        let number = rng.random_range(-options.max_number..=options.max_number);
        let line = format!("{number}. {text}");
        writer.write_all(line.as_bytes())?;
        writer.write_all(LINE_TERMINATOR)?;
        stats.bytes += (line.len() + LINE_TERMINATOR.len()) as u64;
        stats.lines += 1;
    }

    writer.flush().context("failed to flush generated file")?;
    Ok(stats)
}
