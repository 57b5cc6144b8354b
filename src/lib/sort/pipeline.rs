//! Pipelined external sort with parallel workers.
//!
//! This module ties the splitter, run sorters, and mergers together:
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌─────────────┐
//! │ Splitter │───>│ RunSorters   │───>│ Mergers     │───> output
//! │ (1 thread)│   │ (P threads)  │    │ (C threads) │
//! └──────────┘    └──────────────┘    └─────────────┘
//!      │                 │                  │
//!      ▼                 ▼                  ▼
//!   cut runs        sort in memory     fold batches
//! ```
//!
//! The two hops are bounded channels of run-file paths, so the splitter
//! blocks when sorters fall behind and sorters block when mergers fall
//! behind. Peak memory stays near `chunk_bytes * max_concurrency` no matter
//! how large the input is.
//!
//! Workers observe a shared cancellation flag at every channel interaction
//! and every outer merge iteration; the first error wins and cancels the
//! rest. In-flight file writes always complete, so temp files are never
//! left corrupt.

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use bytesize::ByteSize;
use crossbeam_channel::{bounded, unbounded};
use log::info;

use crate::errors::{Result, SortError};
use crate::progress::ProgressTracker;
use crate::sort::merge::MergeStrategyKind;
use crate::sort::run::sort_run;
use crate::sort::splitter::RunSplitter;
use crate::sort::temp::TempStore;

/// Default target size of one unsorted run.
pub const DEFAULT_CHUNK_BYTES: u64 = 64 * 1024 * 1024;
/// Default maximum sorted inputs per merge pass.
pub const DEFAULT_MERGE_FANOUT: usize = 64;
/// Default per-reader buffer size.
pub const DEFAULT_READ_BUF_BYTES: usize = 40 * 1024;
/// Default per-writer buffer size.
pub const DEFAULT_WRITE_BUF_BYTES: usize = 64 * 1024;

/// Sorting configuration.
///
/// Built with chained `with_*` setters:
///
/// ```
/// use linesort_lib::sort::pipeline::SortConfig;
///
/// let config = SortConfig::default()
///     .with_chunk_bytes(8 * 1024 * 1024)
///     .with_merge_fanout(16)
///     .with_max_concurrency(2);
/// assert_eq!(config.merge_fanout, 16);
/// ```
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Target split size in bytes; larger uses more RAM per worker.
    pub chunk_bytes: u64,
    /// Maximum sorted inputs consumed by one merge pass.
    pub merge_fanout: usize,
    /// Number of run-sorter workers and of merger workers.
    pub max_concurrency: usize,
    /// Directory for transient files; `None` means the system temp dir.
    pub temp_dir: Option<PathBuf>,
    /// Per-reader buffer size in bytes.
    pub read_buf_bytes: usize,
    /// Per-writer buffer size in bytes.
    pub write_buf_bytes: usize,
    /// Merge implementation to use.
    pub strategy: MergeStrategyKind,
    /// Retain the temp directory when the sort fails or is cancelled.
    pub keep_temp_on_error: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            merge_fanout: DEFAULT_MERGE_FANOUT,
            max_concurrency: default_concurrency(),
            temp_dir: None,
            read_buf_bytes: DEFAULT_READ_BUF_BYTES,
            write_buf_bytes: DEFAULT_WRITE_BUF_BYTES,
            strategy: MergeStrategyKind::default(),
            keep_temp_on_error: false,
        }
    }
}

impl SortConfig {
    /// Set the target run size in bytes.
    #[must_use]
    pub fn with_chunk_bytes(mut self, chunk_bytes: u64) -> Self {
        self.chunk_bytes = chunk_bytes;
        self
    }

    /// Set the maximum inputs per merge pass.
    #[must_use]
    pub fn with_merge_fanout(mut self, merge_fanout: usize) -> Self {
        self.merge_fanout = merge_fanout;
        self
    }

    /// Set the worker count for run sorting and merging.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the directory for transient files.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Set the per-reader buffer size.
    #[must_use]
    pub fn with_read_buf_bytes(mut self, read_buf_bytes: usize) -> Self {
        self.read_buf_bytes = read_buf_bytes;
        self
    }

    /// Set the per-writer buffer size.
    #[must_use]
    pub fn with_write_buf_bytes(mut self, write_buf_bytes: usize) -> Self {
        self.write_buf_bytes = write_buf_bytes;
        self
    }

    /// Select the merge implementation.
    #[must_use]
    pub fn with_strategy(mut self, strategy: MergeStrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Retain the temp directory on failure for debugging.
    #[must_use]
    pub fn with_keep_temp_on_error(mut self, keep: bool) -> Self {
        self.keep_temp_on_error = keep;
        self
    }
}

/// Worker default: the sort is I/O-bound past a handful of cores.
#[must_use]
pub fn default_concurrency() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get).min(4)
}

/// Statistics from one sort run.
#[derive(Debug, Default)]
pub struct SortStats {
    /// Lines read from the input (equals lines written on success).
    pub lines_read: u64,
    /// Unsorted runs the splitter produced.
    pub runs_split: usize,
    /// Merge passes executed across all workers.
    pub merge_passes: u64,
}

/// The external-sort pipeline driver.
pub struct SortPipeline {
    config: SortConfig,
}

impl SortPipeline {
    /// Create a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: SortConfig) -> Self {
        SortPipeline { config }
    }

    /// Sort `input` into `output`.
    pub fn sort(&self, input: &Path, output: &Path) -> Result<SortStats> {
        self.sort_with_cancel(input, output, &AtomicBool::new(false))
    }

    /// Sort `input` into `output`, observing `cancel` cooperatively.
    ///
    /// Setting the flag makes every worker finish its in-flight file
    /// operation and exit; the call returns [`SortError::Cancelled`] unless
    /// an earlier error was already recorded.
    pub fn sort_with_cancel(
        &self,
        input: &Path,
        output: &Path,
        cancel: &AtomicBool,
    ) -> Result<SortStats> {
        let temp = Arc::new(TempStore::new(self.config.temp_dir.as_deref())?);
        let result = self.run(input, output, cancel, &temp);
        if result.is_err() && self.config.keep_temp_on_error {
            let kept = temp.keep();
            log::warn!("temporary files retained at {}", kept.display());
        }
        result
    }

    #[allow(clippy::too_many_lines)]
    fn run(
        &self,
        input: &Path,
        output: &Path,
        cancel: &AtomicBool,
        temp: &Arc<TempStore>,
    ) -> Result<SortStats> {
        let cfg = &self.config;
        let workers = cfg.max_concurrency.max(1);
        let fanout = cfg.merge_fanout.max(2);
        let parallel_chunks = workers > 1;

        info!("sorting {} into {}", input.display(), output.display());
        info!(
            "chunk size: {}, merge fanout: {}, workers: {}, strategy: {:?}",
            ByteSize::b(cfg.chunk_bytes),
            fanout,
            workers,
            cfg.strategy
        );

        let splitter = RunSplitter::open(
            input,
            Arc::clone(temp),
            cfg.chunk_bytes,
            cfg.read_buf_bytes,
            cfg.write_buf_bytes,
        )?;
        let strategy = cfg.strategy.create(fanout, cfg.read_buf_bytes, cfg.write_buf_bytes);

        let lines_read = AtomicU64::new(0);
        let runs_split = AtomicUsize::new(0);
        let merge_passes = AtomicU64::new(0);
        let progress = ProgressTracker::new("sorted lines").with_interval(1_000_000);

        let (unsorted_tx, unsorted_rx) = bounded::<PathBuf>(workers * 2);
        let (sorted_tx, sorted_rx) = bounded::<PathBuf>(workers * 2);
        let (error_tx, error_rx) = unbounded::<SortError>();

        let mut finals: Vec<PathBuf> = Vec::new();

        thread::scope(|scope| {
            // Splitter: single producer, preserves input order on the channel.
            {
                let error_tx = error_tx.clone();
                let runs_split = &runs_split;
                scope.spawn(move || {
                    for item in splitter {
                        if cancel.load(Ordering::Acquire) {
                            return;
                        }
                        match item {
                            Ok(path) => {
                                runs_split.fetch_add(1, Ordering::Relaxed);
                                if unsorted_tx.send(path).is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                let _ = error_tx.send(err);
                                cancel.store(true, Ordering::Release);
                                return;
                            }
                        }
                    }
                });
            }

            // Run sorters: drain unsorted runs, emit sorted runs in
            // completion order.
            for _ in 0..workers {
                let rx = unsorted_rx.clone();
                let tx = sorted_tx.clone();
                let error_tx = error_tx.clone();
                let lines_read = &lines_read;
                let progress = &progress;
                let (read_buf, write_buf) = (cfg.read_buf_bytes, cfg.write_buf_bytes);
                scope.spawn(move || {
                    while let Ok(path) = rx.recv() {
                        if cancel.load(Ordering::Acquire) {
                            return;
                        }
                        match sort_run(&path, read_buf, write_buf, parallel_chunks) {
                            Ok((sorted, count)) => {
                                lines_read.fetch_add(count, Ordering::Relaxed);
                                progress.log_if_needed(count);
                                if tx.send(sorted).is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                let _ = error_tx.send(err);
                                cancel.store(true, Ordering::Release);
                                return;
                            }
                        }
                    }
                });
            }
            drop(unsorted_rx);
            drop(sorted_tx);

            // Mergers: accumulate a batch, fold it whenever it reaches the
            // fanout, then reduce the remainder once the channel closes.
            let mut merger_handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let rx = sorted_rx.clone();
                let error_tx = error_tx.clone();
                let strategy = &*strategy;
                let temp = &**temp;
                let merge_passes = &merge_passes;
                merger_handles.push(scope.spawn(move || -> Option<PathBuf> {
                    let mut batch: Vec<PathBuf> = Vec::new();
                    while let Ok(path) = rx.recv() {
                        if cancel.load(Ordering::Acquire) {
                            return None;
                        }
                        batch.push(path);
                        if batch.len() >= fanout {
                            match strategy.merge(&batch, temp) {
                                Ok(merged) => {
                                    merge_passes.fetch_add(1, Ordering::Relaxed);
                                    for consumed in &batch {
                                        temp.delete_best_effort(consumed);
                                    }
                                    batch.clear();
                                    batch.push(merged);
                                }
                                Err(err) => {
                                    let _ = error_tx.send(err);
                                    cancel.store(true, Ordering::Release);
                                    return None;
                                }
                            }
                        }
                    }
                    while batch.len() > 1 {
                        if cancel.load(Ordering::Acquire) {
                            return None;
                        }
                        let take = batch.len().min(fanout);
                        let group: Vec<PathBuf> = batch.drain(..take).collect();
                        match strategy.merge(&group, temp) {
                            Ok(merged) => {
                                merge_passes.fetch_add(1, Ordering::Relaxed);
                                for consumed in &group {
                                    temp.delete_best_effort(consumed);
                                }
                                batch.push(merged);
                            }
                            Err(err) => {
                                let _ = error_tx.send(err);
                                cancel.store(true, Ordering::Release);
                                return None;
                            }
                        }
                    }
                    batch.pop()
                }));
            }
            drop(sorted_rx);

            for handle in merger_handles {
                match handle.join() {
                    Ok(Some(path)) => finals.push(path),
                    Ok(None) => {}
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });

        if let Ok(err) = error_rx.try_recv() {
            return Err(err);
        }
        if cancel.load(Ordering::Acquire) {
            return Err(SortError::Cancelled);
        }
        progress.log_final();

        // One last union merge across the per-worker finals.
        let final_path = match finals.len() {
            0 => {
                // Empty input still publishes an (empty) output file.
                let path = temp.new_merge_path();
                File::create(&path).map_err(|e| SortError::temp(&path, e))?;
                path
            }
            1 => finals.remove(0),
            _ => {
                let merged = strategy.merge(&finals, temp.as_ref())?;
                merge_passes.fetch_add(1, Ordering::Relaxed);
                for consumed in &finals {
                    temp.delete_best_effort(consumed);
                }
                merged
            }
        };

        if let Err(err) = temp.move_atomic(&final_path, output, true) {
            let retained = final_path.clone();
            temp.keep();
            return Err(SortError::OutputNotWritable {
                output: output.to_path_buf(),
                retained,
                source: err,
            });
        }

        let stats = SortStats {
            lines_read: lines_read.load(Ordering::Relaxed),
            runs_split: runs_split.load(Ordering::Relaxed),
            merge_passes: merge_passes.load(Ordering::Relaxed),
        };
        info!(
            "sort complete: {} lines across {} runs, {} merge passes",
            stats.lines_read, stats.runs_split, stats.merge_passes
        );
        Ok(stats)
    }
}
