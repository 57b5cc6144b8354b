//! Streaming input splitter.
//!
//! Cuts the input file into size-bounded, line-aligned run files without
//! ever holding more than one read buffer in memory. Each run ends on an LF
//! (the last run may not, if the input does not), and concatenating the runs
//! in emission order reproduces the input byte-for-byte, aside from a
//! stripped leading BOM. A run may exceed the target size by at most one
//! line, since a run is never cut mid-line.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{Result, SortError};
use crate::sort::temp::TempStore;
use crate::text_io::{open_for_read, open_for_write, strip_bom};

/// Lazy iterator of unsorted run paths cut from one input stream.
///
/// Non-restartable: once exhausted (or failed) it stays exhausted.
pub struct RunSplitter<R: BufRead> {
    reader: R,
    input: PathBuf,
    temp: Arc<TempStore>,
    chunk_bytes: u64,
    write_buf_bytes: usize,
    line_buf: Vec<u8>,
    done: bool,
}

impl RunSplitter<BufReader<File>> {
    /// Open `input` and prepare to split it into runs of roughly
    /// `chunk_bytes` bytes each.
    pub fn open(
        input: &Path,
        temp: Arc<TempStore>,
        chunk_bytes: u64,
        read_buf_bytes: usize,
        write_buf_bytes: usize,
    ) -> Result<Self> {
        let mut reader =
            open_for_read(input, read_buf_bytes).map_err(|e| SortError::input(input, e))?;
        strip_bom(&mut reader).map_err(|e| SortError::input(input, e))?;
        Ok(RunSplitter::new(reader, input.to_path_buf(), temp, chunk_bytes, write_buf_bytes))
    }
}

impl<R: BufRead> RunSplitter<R> {
    /// Split an already-open stream; `input` only labels errors.
    pub fn new(
        reader: R,
        input: PathBuf,
        temp: Arc<TempStore>,
        chunk_bytes: u64,
        write_buf_bytes: usize,
    ) -> Self {
        RunSplitter {
            reader,
            input,
            temp,
            chunk_bytes: chunk_bytes.max(1),
            write_buf_bytes,
            line_buf: Vec::new(),
            done: false,
        }
    }

    /// Write lines into a fresh run file until the size target is crossed at
    /// a line boundary. Returns the path, or `None` when the input was
    /// already exhausted.
    fn next_run(&mut self) -> Result<Option<PathBuf>> {
        let path = self.temp.new_unsorted_path();
        let mut writer = open_for_write(&path, self.write_buf_bytes)
            .map_err(|e| SortError::temp(&path, e))?;

        let mut written = 0u64;
        loop {
            self.line_buf.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.line_buf)
                .map_err(|e| SortError::input(&self.input, e))?;
            if n == 0 {
                self.done = true;
                break;
            }
            writer.write_all(&self.line_buf).map_err(|e| SortError::temp(&path, e))?;
            written += n as u64;
            if written >= self.chunk_bytes {
                break;
            }
        }
        writer.flush().map_err(|e| SortError::temp(&path, e))?;

        if written == 0 {
            self.temp.delete_best_effort(&path);
            return Ok(None);
        }
        Ok(Some(path))
    }
}

impl<R: BufRead> Iterator for RunSplitter<R> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_run() {
            Ok(Some(path)) => Some(Ok(path)),
            Ok(None) => None,
            Err(err) => {
                // Leave any partial run for TempStore teardown to collect.
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
