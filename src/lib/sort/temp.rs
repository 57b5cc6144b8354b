//! Temporary run-file naming, atomic publication, and cleanup.
//!
//! All transient files live in one session directory created under the
//! configured temp dir (or the system default). Names come from a
//! process-wide atomic counter plus a kind-tagged extension, so no two
//! pipeline participants can collide. The directory is removed when the
//! store drops; [`TempStore::keep`] detaches it for debugging or to retain
//! sorted data when the output path is unwritable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

use crate::errors::{Result, SortError};

/// Process-wide counter feeding unique temp-file names.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Extension of freshly split, not yet sorted runs.
pub const UNSORTED_EXT: &str = "unsorted";
/// Extension of sorted runs.
pub const SORTED_EXT: &str = "sorted";
/// Extension of merge outputs.
pub const MERGED_EXT: &str = "merged";

/// Owner of the session temp directory and source of unique run paths.
pub struct TempStore {
    root: PathBuf,
    dir: Mutex<Option<TempDir>>,
}

impl TempStore {
    /// Create the session directory under `base` (or the system temp dir).
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let dir = match base {
            Some(base) => {
                fs::create_dir_all(base).map_err(|e| SortError::temp(base, e))?;
                TempDir::with_prefix_in("linesort-", base)
                    .map_err(|e| SortError::temp(base, e))?
            }
            None => TempDir::with_prefix("linesort-")
                .map_err(|e| SortError::temp(&std::env::temp_dir(), e))?,
        };
        log::info!("using {} as the temporary directory", dir.path().display());
        Ok(TempStore { root: dir.path().to_path_buf(), dir: Mutex::new(Some(dir)) })
    }

    /// The session directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn next_path(&self, ext: &str) -> PathBuf {
        let id = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!("run-{id:08}.{ext}"))
    }

    /// A fresh path for an unsorted run.
    #[must_use]
    pub fn new_unsorted_path(&self) -> PathBuf {
        self.next_path(UNSORTED_EXT)
    }

    /// A fresh path for a sorted run.
    #[must_use]
    pub fn new_sorted_path(&self) -> PathBuf {
        self.next_path(SORTED_EXT)
    }

    /// A fresh path for a merge output.
    #[must_use]
    pub fn new_merge_path(&self) -> PathBuf {
        self.next_path(MERGED_EXT)
    }

    /// Atomically move `src` to `dst`, falling back to copy-and-delete when
    /// the rename crosses filesystems. Refuses an existing `dst` unless
    /// `overwrite` is set.
    pub fn move_atomic(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<()> {
        if !overwrite && dst.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' already exists", dst.display()),
            ));
        }
        match fs::rename(src, dst) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(src, dst)?;
                fs::remove_file(src)
            }
        }
    }

    /// Delete a file, ignoring a missing target.
    pub fn delete_best_effort(&self, path: &Path) {
        crate::text_io::delete_best_effort(path);
    }

    /// Detach the session directory so it survives drop; returns its path.
    ///
    /// Used on cancellation (when configured) and when the final move fails,
    /// so sorted data is never silently discarded.
    pub fn keep(&self) -> PathBuf {
        let mut guard = self.dir.lock().expect("temp dir lock poisoned");
        if let Some(dir) = guard.take() {
            return dir.keep();
        }
        self.root.clone()
    }
}
