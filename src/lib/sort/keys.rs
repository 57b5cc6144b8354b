//! Line parsing and the sort comparator.
//!
//! Every input line has the shape `<integer>. <text>`, where the integer
//! prefix and the `". "` separator are optional. A [`Line`] owns the raw
//! bytes of one line (terminator already stripped) together with its parsed
//! key, so sorting and merging compare without re-parsing.
//!
//! # Ordering
//!
//! The comparator is a three-phase lexicographic order:
//!
//! 1. text, byte-wise with ASCII case folding (a shorter text that is a
//!    prefix of a longer one sorts first)
//! 2. if the folded texts are identical, the first raw byte difference -
//!    necessarily a case difference - compares inverted, so lowercase sorts
//!    before uppercase
//! 3. the numeric prefix
//!
//! Phase 1 partitions lines into fold-equal classes of equal length, phase 2
//! is an ordinary lexicographic order within such a class, and phase 3 orders
//! the remainder; the composite is therefore a total order. Bytes outside
//! ASCII letters compare by raw value, so non-UTF-8 content is fine.

use bstr::{BString, ByteSlice};
use std::cmp::Ordering;

/// One text line with its parsed sort key.
///
/// `raw` holds the line bytes without any terminator; `text_start` is the
/// byte offset of the text portion (0 when the line has no `.` prefix).
#[derive(Debug, Clone)]
pub struct Line {
    raw: BString,
    number: i64,
    text_start: u32,
}

impl Line {
    /// Parse a line from its raw bytes (terminator already stripped).
    ///
    /// The first ASCII `.` at a position `p > 0` splits the line: `[0, p)`
    /// parses as a signed 64-bit decimal, falling back to an unsigned 32-bit
    /// decimal, falling back to 0. The text starts after the dot and any run
    /// of ASCII spaces. Without such a dot the whole line is text and the
    /// number is 0. Parsing never fails.
    #[must_use]
    pub fn parse(raw: Vec<u8>) -> Self {
        let raw = BString::from(raw);
        match raw.find_byte(b'.') {
            Some(p) if p > 0 => {
                let number = parse_number(&raw[..p]);
                let mut start = p + 1;
                while start < raw.len() && raw[start] == b' ' {
                    start += 1;
                }
                Line { number, text_start: start as u32, raw }
            }
            _ => Line { raw, number: 0, text_start: 0 },
        }
    }

    /// The parsed numeric prefix (0 when absent or malformed).
    #[must_use]
    pub fn number(&self) -> i64 {
        self.number
    }

    /// The text portion of the line.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.raw[self.text_start as usize..]
    }

    /// The full raw line bytes, without terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// Parse the byte range before the dot as a line number.
///
/// Signed 64-bit first, then unsigned 32-bit, then 0.
fn parse_number(prefix: &[u8]) -> i64 {
    let Ok(s) = std::str::from_utf8(prefix) else {
        return 0;
    };
    if let Ok(n) = s.parse::<i64>() {
        return n;
    }
    if let Ok(n) = s.parse::<u32>() {
        return i64::from(n);
    }
    0
}

/// Compare two lines by (folded text, inverted case, number).
///
/// This is the single comparator used by the chunk sorter, the merge heap,
/// and the streaming pair merge.
#[must_use]
pub fn compare(a: &Line, b: &Line) -> Ordering {
    compare_parts(a.text(), a.number, b.text(), b.number)
}

fn compare_parts(a_text: &[u8], a_number: i64, b_text: &[u8], b_number: i64) -> Ordering {
    let common = a_text.len().min(b_text.len());

    // Phase 1: case-insensitive text.
    for i in 0..common {
        let ord = a_text[i].to_ascii_lowercase().cmp(&b_text[i].to_ascii_lowercase());
        if ord != Ordering::Equal {
            return ord;
        }
    }
    let ord = a_text.len().cmp(&b_text.len());
    if ord != Ordering::Equal {
        return ord;
    }

    // Phase 2: fold-equal and equal length, so the first raw difference is a
    // case difference; lowercase (higher ASCII) sorts first.
    for i in 0..common {
        if a_text[i] != b_text[i] {
            return b_text[i].cmp(&a_text[i]);
        }
    }

    // Phase 3: numeric prefix.
    a_number.cmp(&b_number)
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Line {}

impl PartialOrd for Line {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Line {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}
