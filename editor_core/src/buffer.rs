//! Text buffer and position types
//!
//! Lines are stored without terminators and never contain tabs. Columns are
//! counted in characters, not bytes.

use core::ops::Range;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::tabs;

/// Cursor position in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Number of characters in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of character column `col`, or `s.len()` past the end
pub fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

/// Characters `start..end` of `s`, clamped to the line
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let from = byte_index(s, start);
    let to = byte_index(s, end.max(start));
    &s[from..to]
}

/// Count of leading spaces
pub fn leading_spaces(s: &str) -> usize {
    s.chars().take_while(|&c| c == ' ').count()
}

/// Count of spaces immediately left of column `col`
pub fn spaces_before(s: &str, col: usize) -> usize {
    char_slice(s, 0, col)
        .chars()
        .rev()
        .take_while(|&c| c == ' ')
        .count()
}

/// Half-open line range covered by the mark and the cursor line.
///
/// Without a mark the range is the cursor line alone. The result does not
/// depend on whether the mark lies above or below the cursor.
pub fn line_range(cursor_line: usize, mark: Option<usize>) -> Range<usize> {
    match mark {
        None => cursor_line..cursor_line + 1,
        Some(mark) if mark < cursor_line => mark..cursor_line + 1,
        Some(mark) => cursor_line..mark + 1,
    }
}

/// Text buffer with line-based storage
///
/// Always holds at least one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Builds a buffer from lines as received from a file, normalizing
    /// trailing whitespace and expanding tabs.
    pub fn from_loaded<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<String> = lines
            .into_iter()
            .map(|line| tabs::normalize_loaded(line.as_ref()))
            .collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `row`, or the empty string past the end
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map_or("", |s| s.as_str())
    }

    /// Length of line `row` in characters
    pub fn line_length(&self, row: usize) -> usize {
        char_len(self.line(row))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Copies the lines in `range`, clamped to the buffer
    pub fn copy_range(&self, range: Range<usize>) -> Vec<String> {
        let (start, end) = self.clamp(range);
        self.lines[start..end].to_vec()
    }

    /// Insert a character at position
    pub fn insert_char(&mut self, pos: Position, ch: char) -> bool {
        let Some(line) = self.lines.get_mut(pos.row) else {
            return false;
        };
        let at = byte_index(line, pos.col);
        line.insert(at, ch);
        true
    }

    /// Insert a string at position
    pub fn insert_str(&mut self, pos: Position, text: &str) -> bool {
        let Some(line) = self.lines.get_mut(pos.row) else {
            return false;
        };
        let at = byte_index(line, pos.col);
        line.insert_str(at, text);
        true
    }

    /// Removes characters `cols` from line `row`
    pub fn remove_chars(&mut self, row: usize, cols: Range<usize>) -> bool {
        let Some(line) = self.lines.get_mut(row) else {
            return false;
        };
        let from = byte_index(line, cols.start);
        let to = byte_index(line, cols.end.max(cols.start));
        if from == to {
            return false;
        }
        line.replace_range(from..to, "");
        true
    }

    /// Splits line `row` at `col`; the new following line receives `indent`
    /// spaces followed by the text right of the split.
    pub fn split_line(&mut self, row: usize, col: usize, indent: usize) -> bool {
        let Some(line) = self.lines.get_mut(row) else {
            return false;
        };
        let at = byte_index(line, col);
        let tail = line.split_off(at);
        let mut next = " ".repeat(indent);
        next.push_str(&tail);
        self.lines.insert(row + 1, next);
        true
    }

    /// Appends line `row + 1` to line `row`
    pub fn join_with_next(&mut self, row: usize) -> bool {
        if row + 1 >= self.lines.len() {
            return false;
        }
        let next = self.lines.remove(row + 1);
        self.lines[row].push_str(&next);
        true
    }

    /// Inserts `new_lines` before line `at` (appends past the end)
    pub fn insert_lines(&mut self, at: usize, new_lines: Vec<String>) {
        let at = at.min(self.lines.len());
        self.lines.splice(at..at, new_lines);
    }

    /// Replaces `span` lines starting at `at` with `new_lines`.
    ///
    /// An `at` at or past the end appends.
    pub fn replace_lines(&mut self, at: usize, span: usize, new_lines: Vec<String>) {
        let (start, end) = self.clamp(at..at.saturating_add(span));
        self.lines.splice(start..end, new_lines);
        self.ensure_line();
    }

    /// Removes the lines in `range` and returns them.
    ///
    /// Removing every line leaves the buffer with one empty line.
    pub fn remove_lines(&mut self, range: Range<usize>) -> Vec<String> {
        let (start, end) = self.clamp(range);
        let removed = self.lines.drain(start..end).collect();
        self.ensure_line();
        removed
    }

    fn clamp(&self, range: Range<usize>) -> (usize, usize) {
        let start = range.start.min(self.lines.len());
        let end = range.end.clamp(start, self.lines.len());
        (start, end)
    }

    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> TextBuffer {
        TextBuffer::from_loaded(lines.iter().copied())
    }

    #[test]
    fn test_new_buffer() {
        let buf = TextBuffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), "");
    }

    #[test]
    fn test_from_loaded_normalizes() {
        let buf = buffer(&["\tx  ", "y\r"]);
        assert_eq!(buf.lines(), &["        x", "y"]);

        let empty = TextBuffer::from_loaded(Vec::<String>::new());
        assert_eq!(empty.lines(), &[""]);
    }

    #[test]
    fn test_char_helpers() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(byte_index("héllo", 2), 3);
        assert_eq!(byte_index("abc", 10), 3);
        assert_eq!(char_slice("héllo", 1, 3), "él");
        assert_eq!(char_slice("abc", 2, 10), "c");
        assert_eq!(char_slice("abc", 5, 10), "");
    }

    #[test]
    fn test_space_counts() {
        assert_eq!(leading_spaces("    x  "), 4);
        assert_eq!(leading_spaces(""), 0);
        assert_eq!(spaces_before("ab   cd", 5), 3);
        assert_eq!(spaces_before("ab   cd", 4), 2);
        assert_eq!(spaces_before("ab", 0), 0);
    }

    #[test]
    fn test_line_range_is_direction_independent() {
        assert_eq!(line_range(7, Some(3)), 3..8);
        assert_eq!(line_range(3, Some(7)), 3..8);
        assert_eq!(line_range(4, Some(4)), 4..5);
        assert_eq!(line_range(4, None), 4..5);
    }

    #[test]
    fn test_insert_and_remove_chars() {
        let mut buf = buffer(&["héllo"]);
        assert!(buf.insert_char(Position::new(0, 2), 'X'));
        assert_eq!(buf.line(0), "héXllo");
        assert!(buf.remove_chars(0, 1..3));
        assert_eq!(buf.line(0), "hllo");
        assert!(!buf.remove_chars(0, 9..10));
        assert!(!buf.insert_char(Position::new(3, 0), 'x'));
    }

    #[test]
    fn test_split_and_join() {
        let mut buf = buffer(&["abcdef"]);
        assert!(buf.split_line(0, 3, 2));
        assert_eq!(buf.lines(), &["abc", "  def"]);
        assert!(buf.join_with_next(0));
        assert_eq!(buf.lines(), &["abc  def"]);
        assert!(!buf.join_with_next(0));
    }

    #[test]
    fn test_replace_lines_appends_past_end() {
        let mut buf = buffer(&["a", "b"]);
        buf.replace_lines(5, 1, vec!["c".into()]);
        assert_eq!(buf.lines(), &["a", "b", "c"]);

        buf.replace_lines(0, 2, vec!["x".into()]);
        assert_eq!(buf.lines(), &["x", "c"]);
    }

    #[test]
    fn test_remove_all_lines_leaves_one() {
        let mut buf = buffer(&["a", "b"]);
        let removed = buf.remove_lines(0..2);
        assert_eq!(removed, vec![String::from("a"), String::from("b")]);
        assert_eq!(buf.lines(), &[""]);
    }

    #[test]
    fn test_copy_range_clamped() {
        let buf = buffer(&["a", "b", "c"]);
        assert_eq!(buf.copy_range(1..9), vec![String::from("b"), String::from("c")]);
    }
}
