//! Merge strategy seam.
//!
//! A merge strategy folds a batch of sorted run files into a single sorted
//! run under the temp store. Strategies are plain values selected at
//! pipeline construction; no state is shared between them.
//!
//! Ownership contract: a strategy never deletes its inputs (the caller owns
//! them), and any intermediate files it creates are deleted before it
//! returns, on success and on failure alike.

use std::path::PathBuf;

use crate::errors::Result;
use crate::sort::kway::KWayMerge;
use crate::sort::polyphase::PolyphaseMerge;
use crate::sort::temp::TempStore;

/// Capability of merging sorted run files into one sorted run.
pub trait MergeStrategy: Send + Sync {
    /// Merge `inputs` (each non-decreasing, at least one) into a new sorted
    /// file under `temp` and return its path.
    fn merge(&self, inputs: &[PathBuf], temp: &TempStore) -> Result<PathBuf>;
}

/// Which merge implementation the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategyKind {
    /// Three-tape polyphase merge with Fibonacci run distribution. Two
    /// active readers at a time: friendlier to file-descriptor limits and
    /// sequential read-ahead.
    #[default]
    Polyphase,
    /// Heap-driven k-way merge. Fewer passes; opens every input at once.
    Kway,
}

impl MergeStrategyKind {
    /// Instantiate the strategy with the pipeline's buffer and fanout
    /// configuration.
    #[must_use]
    pub fn create(
        self,
        merge_fanout: usize,
        read_buf_bytes: usize,
        write_buf_bytes: usize,
    ) -> Box<dyn MergeStrategy> {
        match self {
            MergeStrategyKind::Polyphase => {
                Box::new(PolyphaseMerge::new(read_buf_bytes, write_buf_bytes))
            }
            MergeStrategyKind::Kway => {
                Box::new(KWayMerge::new(merge_fanout, read_buf_bytes, write_buf_bytes))
            }
        }
    }
}
