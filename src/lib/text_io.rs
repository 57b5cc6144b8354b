//! Buffered line-oriented file I/O.
//!
//! This module is the single place the sort engine touches the filesystem
//! for line data: buffered sequential readers with BOM handling, buffered
//! truncating writers, and the [`LineReader`]/[`LineWriter`] pair used by the
//! run sorter and both merge strategies.
//!
//! Lines are byte sequences terminated by LF; a trailing CR before the LF is
//! stripped on read and every written line gets the platform terminator.
//! Lines that are empty after terminator stripping are dropped by
//! [`LineReader`] so they never reach a sorted run.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::sort::keys::Line;

/// Line terminator written to output and run files.
#[cfg(windows)]
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
/// Line terminator written to output and run files.
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// UTF-8 byte-order mark, tolerated and stripped at the start of input.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Open `path` for buffered sequential reading.
pub fn open_for_read(path: &Path, buf_bytes: usize) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(buf_bytes.max(1), file))
}

/// Open `path` for buffered truncating writing.
pub fn open_for_write(path: &Path, buf_bytes: usize) -> io::Result<BufWriter<File>> {
    let file = File::create(path)?;
    Ok(BufWriter::with_capacity(buf_bytes.max(1), file))
}

/// Consume a leading UTF-8 BOM if present.
pub fn strip_bom<R: BufRead>(reader: &mut R) -> io::Result<()> {
    let buf = reader.fill_buf()?;
    if buf.starts_with(&UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }
    Ok(())
}

/// Delete a file, ignoring a missing target.
pub fn delete_best_effort(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            log::debug!("could not delete '{}': {err}", path.display());
        }
    }
}

/// Pull-based reader of parsed [`Line`]s from a buffered byte stream.
///
/// Terminators are stripped (LF, or CRLF as a pair) and empty lines are
/// skipped. The final line may be unterminated.
pub struct LineReader<R: BufRead> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        LineReader { inner }
    }

    /// Read the next non-empty line, or `None` at end of stream.
    pub fn next_line(&mut self) -> io::Result<Option<Line>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = self.inner.read_until(b'\n', &mut buf)?;
            if n == 0 {
                return Ok(None);
            }
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            if buf.is_empty() {
                continue;
            }
            return Ok(Some(Line::parse(std::mem::take(&mut buf))));
        }
    }
}

impl LineReader<BufReader<File>> {
    /// Open a file as a line reader.
    pub fn open(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        Ok(LineReader::new(open_for_read(path, buf_bytes)?))
    }
}

/// Writer of [`Line`]s with the platform terminator.
pub struct LineWriter<W: Write> {
    inner: W,
}

impl<W: Write> LineWriter<W> {
    /// Wrap a buffered writer.
    pub fn new(inner: W) -> Self {
        LineWriter { inner }
    }

    /// Write one line followed by the platform terminator.
    pub fn write_line(&mut self, line: &Line) -> io::Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(LINE_TERMINATOR)
    }

    /// Flush buffered data.
    pub fn finish(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl LineWriter<BufWriter<File>> {
    /// Create a file and wrap it as a line writer.
    pub fn create(path: &Path, buf_bytes: usize) -> io::Result<Self> {
        Ok(LineWriter::new(open_for_write(path, buf_bytes)?))
    }
}
