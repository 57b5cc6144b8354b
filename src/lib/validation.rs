//! Input validation utilities.
//!
//! Common validation for command-line parameters and file paths with
//! consistent, structured error messages from [`crate::errors`].

use std::fmt::Display;
use std::io;
use std::path::Path;

use crate::errors::{Result, SortError};

/// Validate that a file exists.
///
/// # Example
/// ```
/// use linesort_lib::validation::validate_file_exists;
///
/// assert!(validate_file_exists("/nonexistent/input.txt").is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SortError::input(
            path,
            io::Error::new(io::ErrorKind::NotFound, "file does not exist"),
        ));
    }
    Ok(())
}

/// Validate that a value is positive (> 0).
pub fn validate_positive<T: Ord + Display + Default>(value: T, name: &str) -> Result<()> {
    if value <= T::default() {
        return Err(SortError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("must be positive, got {value}"),
        });
    }
    Ok(())
}

/// Validate that a value is at least `min`.
pub fn validate_at_least<T: Ord + Display>(value: T, min: T, name: &str) -> Result<()> {
    if value < min {
        return Err(SortError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("must be at least {min}, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_file_exists_valid() {
        let file = NamedTempFile::new().unwrap();
        validate_file_exists(file.path()).unwrap();
    }

    #[test]
    fn test_validate_file_exists_missing() {
        let err = validate_file_exists("/nonexistent/input.txt").unwrap_err();
        assert!(matches!(err, SortError::InputNotReadable { .. }));
        assert!(err.to_string().contains("/nonexistent/input.txt"));
    }

    #[test]
    fn test_validate_positive() {
        validate_positive(1u64, "chunk-size").unwrap();
        let err = validate_positive(0u64, "chunk-size").unwrap_err();
        assert!(err.to_string().contains("chunk-size"));
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_validate_at_least() {
        validate_at_least(2usize, 2, "merge-fanout").unwrap();
        let err = validate_at_least(1usize, 2, "merge-fanout").unwrap_err();
        assert!(err.to_string().contains("at least 2"));
    }
}
