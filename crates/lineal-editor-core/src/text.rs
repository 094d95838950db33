//! Line-oriented text storage.
//!
//! The document is an ordered sequence of lines, none of which contains a
//! line break. Each line carries a `LineId` that stays with it across edits
//! to its content, so rendered line nodes can be matched to buffer lines by
//! identity rather than by position.
//!
//! All columns are in Unicode scalar values (chars), not bytes or UTF-16.

use std::fmt;
use std::str::FromStr;

/// Stable handle for one buffer line.
///
/// Allocated monotonically per buffer and never reused, even after the line
/// is removed or the whole document is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

impl LineId {
    /// Rebuild an id from its raw value (e.g. read back from a DOM attribute).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LineId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(Clone, Debug)]
struct Line {
    id: LineId,
    text: String,
}

/// Ordered, mutable sequence of lines.
///
/// Mutations do not validate their coordinates. Passing a line index or
/// column outside the document is a caller bug and panics, the same way
/// `Vec` and `String` indexing does.
#[derive(Clone, Debug)]
pub struct LineBuffer {
    lines: Vec<Line>,
    next_id: u64,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl LineBuffer {
    /// Create a buffer holding a single empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer by splitting `text` on `'\n'`.
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self {
            lines: Vec::new(),
            next_id: 0,
        };
        buffer.set_text(text);
        buffer
    }

    /// Replace the whole document. Every line gets a fresh id.
    pub fn set_text(&mut self, text: &str) {
        let mut lines = Vec::new();
        for line in text.split('\n') {
            let id = self.alloc_id();
            lines.push(Line {
                id,
                text: line.to_owned(),
            });
        }
        self.lines = lines;
    }

    /// The document joined with `'\n'`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    pub fn len_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Content of line `index`, if it exists.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|l| l.text.as_str())
    }

    /// Id of line `index`, if it exists.
    pub fn line_id(&self, index: usize) -> Option<LineId> {
        self.lines.get(index).map(|l| l.id)
    }

    /// Iterate lines in document order.
    pub fn lines(&self) -> impl Iterator<Item = (LineId, &str)> {
        self.lines.iter().map(|l| (l.id, l.text.as_str()))
    }

    /// Insert `text` into line `line` at column `col`.
    ///
    /// # Panics
    ///
    /// Panics if `line` does not exist or `col` is past the end of the line.
    pub fn insert_text(&mut self, line: usize, col: usize, text: &str) {
        debug_assert!(
            !text.contains(['\n', '\r']),
            "inserted text must not contain line breaks"
        );
        let target = &mut self.lines[line].text;
        let at = char_to_byte(target, col);
        target.insert_str(at, text);
        tracing::debug!(target: "lineal::buffer", line, col, len = text.len(), "insert_text");
    }

    /// Delete columns `[x1, x2)` of line `y1`.
    ///
    /// Only defined for `y1 == y2`. Cross-line ranges are left untouched;
    /// joining lines is composed from `remove_line` and `insert_text`.
    ///
    /// # Panics
    ///
    /// Panics if the line does not exist or the columns are out of range.
    pub fn remove_text(&mut self, y1: usize, x1: usize, y2: usize, x2: usize) {
        if y1 != y2 {
            tracing::warn!(target: "lineal::buffer", y1, y2, "remove_text across lines ignored");
            return;
        }
        let target = &mut self.lines[y1].text;
        let start = char_to_byte(target, x1);
        let end = char_to_byte(target, x2);
        target.replace_range(start..end, "");
        tracing::debug!(target: "lineal::buffer", line = y1, x1, x2, "remove_text");
    }

    /// Delete line `y`. Following lines shift down by one.
    ///
    /// Removing the only line leaves an empty document with no lines.
    ///
    /// # Panics
    ///
    /// Panics if `y` does not exist.
    pub fn remove_line(&mut self, y: usize) {
        let removed = self.lines.remove(y);
        tracing::debug!(target: "lineal::buffer", line = y, id = %removed.id, "remove_line");
    }

    /// Insert an empty line directly after line `y`.
    ///
    /// This is a pure insertion: the content of line `y` is not split.
    ///
    /// # Panics
    ///
    /// Panics if `y` does not exist.
    pub fn new_line(&mut self, y: usize) {
        assert!(y < self.lines.len(), "line {y} out of range");
        let id = self.alloc_id();
        self.lines.insert(
            y + 1,
            Line {
                id,
                text: String::new(),
            },
        );
        tracing::debug!(target: "lineal::buffer", after = y, id = %id, "new_line");
    }

    fn alloc_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Byte index of char column `col` in `s`.
///
/// # Panics
///
/// Panics if `col` is greater than the char length of `s`.
pub fn char_to_byte(s: &str, col: usize) -> usize {
    match s.char_indices().nth(col) {
        Some((byte, _)) => byte,
        None => {
            let len = s.chars().count();
            assert!(col == len, "column {col} out of range for line of length {len}");
            s.len()
        }
    }
}

/// Convert a UTF-16 code unit offset within `s` into a char offset.
///
/// Offsets inside a surrogate pair round up to the following char. Offsets
/// past the end clamp to the char length.
pub fn utf16_to_char_offset(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (i, c) in s.chars().enumerate() {
        if units >= utf16_offset {
            return i;
        }
        units += c.len_utf16();
    }
    s.chars().count()
}

/// Convert a char offset within `s` into a UTF-16 code unit offset.
pub fn char_to_utf16_offset(s: &str, char_offset: usize) -> usize {
    s.chars().take(char_offset).map(char::len_utf16).sum()
}
