//! Custom error types for linesort operations.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for linesort operations
pub type Result<T> = std::result::Result<T, SortError>;

/// Error type for linesort operations
#[derive(Error, Debug)]
pub enum SortError {
    /// The input file cannot be opened or read
    #[error("cannot read input '{}': {source}", .path.display())]
    InputNotReadable {
        /// Path to the input file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O failure on a temporary run file
    #[error("temporary file I/O failed on '{}': {source}", .path.display())]
    TempIo {
        /// Path to the temporary file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The final sorted file cannot be moved to the output path. The sorted
    /// data is retained under the temp directory to avoid losing the work.
    #[error(
        "cannot publish output '{}' (sorted data retained at '{}'): {source}",
        .output.display(),
        .retained.display()
    )]
    OutputNotWritable {
        /// Requested output path
        output: PathBuf,
        /// Path of the retained sorted file
        retained: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Cooperative cancellation was observed
    #[error("sort cancelled")]
    Cancelled,

    /// Invalid parameter value provided
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },
}

impl SortError {
    /// Wrap an I/O error as [`SortError::InputNotReadable`] for `path`.
    pub fn input(path: &Path, source: io::Error) -> Self {
        SortError::InputNotReadable { path: path.to_path_buf(), source }
    }

    /// Wrap an I/O error as [`SortError::TempIo`] for `path`.
    pub fn temp(path: &Path, source: io::Error) -> Self {
        SortError::TempIo { path: path.to_path_buf(), source }
    }
}
