//! Run sorting: unsorted run file in, sorted run file out.
//!
//! A pipeline adapter around [`chunk::sort_lines`]: loads every line of one
//! unsorted run, sorts in memory, writes the result next to the original
//! with the `.sorted` extension, and deletes the original. Memory use is
//! bounded by the run size plus per-line overhead, which the splitter's
//! chunk limit guarantees fits.

use std::path::{Path, PathBuf};

use crate::errors::{Result, SortError};
use crate::sort::chunk::sort_lines;
use crate::sort::keys::Line;
use crate::text_io::{delete_best_effort, LineReader, LineWriter};

/// Sort one unsorted run file into a `.sorted` sibling.
///
/// Returns the sorted path and the number of lines it holds. The unsorted
/// original is deleted once the sorted file is durable.
pub fn sort_run(
    unsorted: &Path,
    read_buf_bytes: usize,
    write_buf_bytes: usize,
    parallel: bool,
) -> Result<(PathBuf, u64)> {
    let mut reader = LineReader::open(unsorted, read_buf_bytes)
        .map_err(|e| SortError::temp(unsorted, e))?;

    let mut lines: Vec<Line> = Vec::new();
    while let Some(line) = reader.next_line().map_err(|e| SortError::temp(unsorted, e))? {
        lines.push(line);
    }
    drop(reader);

    sort_lines(&mut lines, parallel);

    let sorted = unsorted.with_extension(crate::sort::temp::SORTED_EXT);
    let mut writer = LineWriter::create(&sorted, write_buf_bytes)
        .map_err(|e| SortError::temp(&sorted, e))?;
    for line in &lines {
        writer.write_line(line).map_err(|e| SortError::temp(&sorted, e))?;
    }
    writer.finish().map_err(|e| SortError::temp(&sorted, e))?;

    delete_best_effort(unsorted);
    Ok((sorted, lines.len() as u64))
}
