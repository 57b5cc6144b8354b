//! Heap-driven k-way merge.
//!
//! Opens every input as a streaming line reader and keeps the smallest
//! pending line of each on a min-heap. `O(N log K)` comparisons for `N`
//! lines across `K` inputs. Batches larger than the fanout are partitioned
//! into groups, the groups merged in parallel on the rayon pool, and the
//! group outputs merged recursively.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::errors::{Result, SortError};
use crate::sort::keys::Line;
use crate::sort::merge::MergeStrategy;
use crate::sort::temp::TempStore;
use crate::text_io::{LineReader, LineWriter};

/// K-way merge strategy.
pub struct KWayMerge {
    fanout: usize,
    read_buf_bytes: usize,
    write_buf_bytes: usize,
}

/// Entry in the merge heap: the current head line of one input.
struct HeapEntry {
    line: Line,
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Source index tiebreak keeps the merge deterministic.
        self.line.cmp(&other.line).then_with(|| self.source.cmp(&other.source))
    }
}

impl KWayMerge {
    /// Create a k-way strategy merging at most `fanout` inputs per pass.
    #[must_use]
    pub fn new(fanout: usize, read_buf_bytes: usize, write_buf_bytes: usize) -> Self {
        KWayMerge { fanout: fanout.max(2), read_buf_bytes, write_buf_bytes }
    }

    /// Merge one batch of at most `fanout` inputs with a single heap pass.
    ///
    /// On failure the partially written output file is deleted before the
    /// error propagates, so no strategy-created file outlives the call.
    fn merge_batch(&self, inputs: &[PathBuf], temp: &TempStore) -> Result<PathBuf> {
        let output = temp.new_merge_path();
        match self.merge_batch_into(inputs, &output) {
            Ok(()) => Ok(output),
            Err(err) => {
                temp.delete_best_effort(&output);
                Err(err)
            }
        }
    }

    fn merge_batch_into(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut readers: Vec<LineReader<BufReader<File>>> = Vec::with_capacity(inputs.len());
        for path in inputs {
            readers.push(
                LineReader::open(path, self.read_buf_bytes)
                    .map_err(|e| SortError::temp(path, e))?,
            );
        }

        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::with_capacity(inputs.len());
        for (source, reader) in readers.iter_mut().enumerate() {
            if let Some(line) =
                reader.next_line().map_err(|e| SortError::temp(&inputs[source], e))?
            {
                heap.push(Reverse(HeapEntry { line, source }));
            }
        }

        let mut writer = LineWriter::create(output, self.write_buf_bytes)
            .map_err(|e| SortError::temp(output, e))?;

        while let Some(Reverse(entry)) = heap.pop() {
            writer.write_line(&entry.line).map_err(|e| SortError::temp(output, e))?;

            let source = entry.source;
            if let Some(line) =
                readers[source].next_line().map_err(|e| SortError::temp(&inputs[source], e))?
            {
                heap.push(Reverse(HeapEntry { line, source }));
            }
        }

        writer.finish().map_err(|e| SortError::temp(output, e))
    }

    /// Merge groups of inputs in parallel, then recurse on the outputs.
    ///
    /// Group outputs are strategy-owned intermediates and are deleted before
    /// returning, whether the recursion succeeds or not.
    fn merge_grouped(&self, inputs: &[PathBuf], temp: &TempStore) -> Result<PathBuf> {
        let outcomes: Vec<Result<PathBuf>> = inputs
            .par_chunks(self.fanout)
            .map(|group| self.merge_batch(group, temp))
            .collect();

        let mut intermediates = Vec::with_capacity(outcomes.len());
        let mut first_err = None;
        for outcome in outcomes {
            match outcome {
                Ok(path) => intermediates.push(path),
                Err(err) => first_err = first_err.or(Some(err)),
            }
        }

        let result = match first_err {
            Some(err) => Err(err),
            None => self.merge(&intermediates, temp),
        };
        for path in &intermediates {
            temp.delete_best_effort(path);
        }
        result
    }
}

impl MergeStrategy for KWayMerge {
    fn merge(&self, inputs: &[PathBuf], temp: &TempStore) -> Result<PathBuf> {
        debug_assert!(!inputs.is_empty(), "merge requires at least one input");
        if inputs.len() <= self.fanout {
            self.merge_batch(inputs, temp)
        } else {
            self.merge_grouped(inputs, temp)
        }
    }
}
