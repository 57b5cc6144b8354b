//! Three-tape polyphase merge.
//!
//! Distributes the initial runs over two tapes in consecutive-Fibonacci
//! proportions (padding with virtual "dummy" runs), then repeatedly merges
//! pairs from the two non-empty tapes onto the empty one until a single run
//! remains. Only two readers are ever open at once, which keeps
//! file-descriptor pressure flat and reads sequential regardless of fan-in.
//!
//! Tapes are control-plane queues of run paths; a dummy run is pure
//! bookkeeping and never touches the filesystem. Pairing a real run with a
//! dummy forwards the real run without I/O.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::errors::{Result, SortError};
use crate::sort::merge::MergeStrategy;
use crate::sort::temp::TempStore;
use crate::text_io::{LineReader, LineWriter};

/// Polyphase merge strategy.
pub struct PolyphaseMerge {
    read_buf_bytes: usize,
    write_buf_bytes: usize,
}

/// A FIFO queue of run paths plus a count of virtual empty runs.
struct Tape {
    runs: VecDeque<PathBuf>,
    dummy_count: usize,
}

/// One slot popped from a tape: a real run file or a dummy.
enum RunSlot {
    Real(PathBuf),
    Dummy,
}

impl Tape {
    fn new() -> Self {
        Tape { runs: VecDeque::new(), dummy_count: 0 }
    }

    fn count(&self) -> usize {
        self.runs.len() + self.dummy_count
    }

    /// Dummies are consumed before real runs so they vanish in the first
    /// phase they participate in.
    fn pop(&mut self) -> RunSlot {
        if self.dummy_count > 0 {
            self.dummy_count -= 1;
            RunSlot::Dummy
        } else {
            match self.runs.pop_front() {
                Some(path) => RunSlot::Real(path),
                None => RunSlot::Dummy,
            }
        }
    }

    fn push(&mut self, path: PathBuf) {
        self.runs.push_back(path);
    }
}

/// Smallest consecutive Fibonacci pair `(F_{k-1}, F_k)` with `F_k >= n`.
fn fibonacci_pair(n: usize) -> (usize, usize) {
    let (mut prev, mut curr) = (1usize, 1usize);
    while curr < n {
        let next = prev + curr;
        prev = curr;
        curr = next;
    }
    (prev, curr)
}

impl PolyphaseMerge {
    /// Create a polyphase strategy with the given stream buffer sizes.
    #[must_use]
    pub fn new(read_buf_bytes: usize, write_buf_bytes: usize) -> Self {
        PolyphaseMerge { read_buf_bytes, write_buf_bytes }
    }

    /// Distribute `inputs` over the first two tapes in Fibonacci proportion,
    /// padding the second with dummies.
    fn distribute(inputs: &[PathBuf]) -> [Tape; 3] {
        let n = inputs.len();
        let (f_prev, f_curr) = fibonacci_pair(n);

        let mut t0 = Tape::new();
        let mut t1 = Tape::new();
        for path in &inputs[..f_prev.min(n)] {
            t0.push(path.clone());
        }
        for path in &inputs[f_prev.min(n)..] {
            t1.push(path.clone());
        }
        t1.dummy_count = f_curr - n;

        [t0, t1, Tape::new()]
    }

    /// Run merge phases until one run remains; returns its path.
    fn run_phases(
        &self,
        tapes: &mut [Tape; 3],
        initial: &HashSet<PathBuf>,
        temp: &TempStore,
    ) -> Result<PathBuf> {
        while tapes.iter().map(Tape::count).sum::<usize>() > 1 {
            let out = tapes
                .iter()
                .position(|t| t.count() == 0)
                .expect("exactly one tape is empty between phases");
            let (a, b) = match out {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };

            let pairs = tapes[a].count().min(tapes[b].count());
            for _ in 0..pairs {
                let slot_a = tapes[a].pop();
                let slot_b = tapes[b].pop();
                match (slot_a, slot_b) {
                    (RunSlot::Dummy, RunSlot::Dummy) => {
                        tapes[out].dummy_count += 1;
                    }
                    (RunSlot::Real(path), RunSlot::Dummy)
                    | (RunSlot::Dummy, RunSlot::Real(path)) => {
                        // Merging with an empty run moves the real run.
                        tapes[out].push(path);
                    }
                    (RunSlot::Real(first), RunSlot::Real(second)) => {
                        // The popped pair is off the tapes, so the caller's
                        // error scan cannot see it; whether the merge
                        // succeeds or fails, any non-initial member is
                        // deleted right here.
                        let merged = self.merge_pair(&first, &second, temp);
                        for consumed in [first, second] {
                            if !initial.contains(&consumed) {
                                temp.delete_best_effort(&consumed);
                            }
                        }
                        tapes[out].push(merged?);
                    }
                }
            }
        }

        let survivor = tapes
            .iter_mut()
            .find(|t| !t.runs.is_empty())
            .and_then(|t| t.runs.pop_front())
            .expect("a single real run remains after the final phase");
        Ok(survivor)
    }

    /// Two-way streaming merge of a pair of sorted runs.
    ///
    /// On failure the partially written output file is deleted before the
    /// error propagates, so no strategy-created file outlives the call.
    fn merge_pair(&self, a: &PathBuf, b: &PathBuf, temp: &TempStore) -> Result<PathBuf> {
        let output = temp.new_merge_path();
        match self.merge_pair_into(a, b, &output) {
            Ok(()) => Ok(output),
            Err(err) => {
                temp.delete_best_effort(&output);
                Err(err)
            }
        }
    }

    fn merge_pair_into(&self, a: &PathBuf, b: &PathBuf, output: &Path) -> Result<()> {
        let mut reader_a =
            LineReader::open(a, self.read_buf_bytes).map_err(|e| SortError::temp(a, e))?;
        let mut reader_b =
            LineReader::open(b, self.read_buf_bytes).map_err(|e| SortError::temp(b, e))?;
        let mut writer = LineWriter::create(output, self.write_buf_bytes)
            .map_err(|e| SortError::temp(output, e))?;

        let mut head_a = reader_a.next_line().map_err(|e| SortError::temp(a, e))?;
        let mut head_b = reader_b.next_line().map_err(|e| SortError::temp(b, e))?;

        loop {
            match (&head_a, &head_b) {
                (Some(line_a), Some(line_b)) => {
                    if line_a <= line_b {
                        writer.write_line(line_a).map_err(|e| SortError::temp(output, e))?;
                        head_a = reader_a.next_line().map_err(|e| SortError::temp(a, e))?;
                    } else {
                        writer.write_line(line_b).map_err(|e| SortError::temp(output, e))?;
                        head_b = reader_b.next_line().map_err(|e| SortError::temp(b, e))?;
                    }
                }
                (Some(line_a), None) => {
                    writer.write_line(line_a).map_err(|e| SortError::temp(output, e))?;
                    head_a = reader_a.next_line().map_err(|e| SortError::temp(a, e))?;
                }
                (None, Some(line_b)) => {
                    writer.write_line(line_b).map_err(|e| SortError::temp(output, e))?;
                    head_b = reader_b.next_line().map_err(|e| SortError::temp(b, e))?;
                }
                (None, None) => break,
            }
        }

        writer.finish().map_err(|e| SortError::temp(output, e))
    }

    /// Stream-copy a single run to a fresh merge path.
    ///
    /// Used when the surviving run is a caller-owned input, which the
    /// strategy must not hand back or delete. Like the pair merge, a failed
    /// copy deletes its partial output before propagating.
    fn copy_run(&self, source: &PathBuf, temp: &TempStore) -> Result<PathBuf> {
        let output = temp.new_merge_path();
        match self.copy_run_into(source, &output) {
            Ok(()) => Ok(output),
            Err(err) => {
                temp.delete_best_effort(&output);
                Err(err)
            }
        }
    }

    fn copy_run_into(&self, source: &PathBuf, output: &Path) -> Result<()> {
        let mut reader = LineReader::open(source, self.read_buf_bytes)
            .map_err(|e| SortError::temp(source, e))?;
        let mut writer = LineWriter::create(output, self.write_buf_bytes)
            .map_err(|e| SortError::temp(output, e))?;
        while let Some(line) = reader.next_line().map_err(|e| SortError::temp(source, e))? {
            writer.write_line(&line).map_err(|e| SortError::temp(output, e))?;
        }
        writer.finish().map_err(|e| SortError::temp(output, e))
    }
}

impl MergeStrategy for PolyphaseMerge {
    fn merge(&self, inputs: &[PathBuf], temp: &TempStore) -> Result<PathBuf> {
        debug_assert!(!inputs.is_empty(), "merge requires at least one input");
        if inputs.len() == 1 {
            return self.copy_run(&inputs[0], temp);
        }

        let initial: HashSet<PathBuf> = inputs.iter().cloned().collect();
        let mut tapes = Self::distribute(inputs);

        match self.run_phases(&mut tapes, &initial, temp) {
            Ok(survivor) => {
                if initial.contains(&survivor) {
                    self.copy_run(&survivor, temp)
                } else {
                    Ok(survivor)
                }
            }
            Err(err) => {
                // Drop every intermediate this merge created before
                // propagating; inputs stay with the caller.
                for tape in &tapes {
                    for path in &tape.runs {
                        if !initial.contains(path) {
                            temp.delete_best_effort(path);
                        }
                    }
                }
                Err(err)
            }
        }
    }
}
