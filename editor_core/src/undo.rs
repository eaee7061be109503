//! Bounded undo log
//!
//! Every mutating operation pushes one [`UndoRecord`] describing how to put
//! the touched lines back. Runs of same-kind single-line edits collapse into
//! the record taken before the run started.
//!
//! The stack also owns the document's dirty state: a clean watermark
//! remembers the stack depth at the last save, and the document is clean
//! exactly when the depth is back at that watermark.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use tracing::trace;

use crate::buffer::TextBuffer;

/// Coalescing key of an undo record
///
/// Consecutive records with the same group on the same line merge.
/// [`UndoGroup::None`] never merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoGroup {
    None,
    Backspace,
    Delete,
    Tab,
    BackTab,
    /// Ranged indent or unindent; undo keeps the cursor where it is
    Indent,
    Space,
    Char,
}

/// How to reverse one edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    /// Remove `count` lines the edit inserted
    Delete { count: usize },
    /// Re-insert lines the edit removed
    Insert { lines: Vec<String> },
    /// Replace `span` lines with their content from before the edit
    Replace { span: usize, lines: Vec<String> },
}

/// One reversible edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    /// First document line the action applies to
    pub line: usize,
    /// Cursor column when the edit was made
    pub col: usize,
    pub group: UndoGroup,
    pub action: UndoAction,
}

impl UndoRecord {
    /// Applies the reversing action to `buffer`
    pub fn revert(self, buffer: &mut TextBuffer) {
        match self.action {
            UndoAction::Delete { count } => {
                buffer.remove_lines(self.line..self.line.saturating_add(count));
            }
            UndoAction::Insert { lines } => buffer.insert_lines(self.line, lines),
            UndoAction::Replace { span, lines } => buffer.replace_lines(self.line, span, lines),
        }
    }
}

/// Bounded stack of undo records with a clean watermark
#[derive(Debug, Clone)]
pub struct UndoStack {
    records: VecDeque<UndoRecord>,
    limit: usize,
    /// Depth at the last save; `None` once that state was evicted
    clean_depth: Option<usize>,
    dirty: bool,
}

impl UndoStack {
    /// Creates an empty, clean stack holding at most `limit` records
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
            clean_depth: Some(0),
            dirty: false,
        }
    }

    /// Registers an edit.
    ///
    /// The document becomes dirty even when nothing is pushed. Returns
    /// whether a record was pushed.
    pub fn record(&mut self, record: UndoRecord) -> bool {
        self.dirty = true;
        if self.limit == 0 || self.coalesces(&record) {
            return false;
        }

        if self.records.len() >= self.limit {
            self.records.pop_front();
            self.clean_depth = self.clean_depth.and_then(|depth| depth.checked_sub(1));
            trace!(limit = self.limit, "evicted oldest undo record");
        }
        self.records.push_back(record);
        true
    }

    fn coalesces(&self, record: &UndoRecord) -> bool {
        match self.records.back() {
            Some(last) => {
                record.group != UndoGroup::None
                    && last.group == record.group
                    && last.line == record.line
            }
            None => false,
        }
    }

    /// Pops the most recent record and recomputes the dirty flag
    pub fn pop(&mut self) -> Option<UndoRecord> {
        let record = self.records.pop_back()?;
        self.dirty = self.clean_depth != Some(self.records.len());
        Some(record)
    }

    /// Remembers the current depth as the saved state
    pub fn mark_clean(&mut self) {
        self.clean_depth = Some(self.records.len());
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn depth(&self) -> usize {
        self.records.len()
    }

    /// The most recent record
    pub fn last(&self) -> Option<&UndoRecord> {
        self.records.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn replace(line: usize, group: UndoGroup, text: &str) -> UndoRecord {
        UndoRecord {
            line,
            col: 0,
            group,
            action: UndoAction::Replace {
                span: 1,
                lines: vec![text.into()],
            },
        }
    }

    #[test]
    fn test_record_marks_dirty() {
        let mut stack = UndoStack::new(10);
        assert!(!stack.is_dirty());
        assert!(stack.record(replace(0, UndoGroup::None, "a")));
        assert!(stack.is_dirty());
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_zero_limit_only_marks_dirty() {
        let mut stack = UndoStack::new(0);
        assert!(!stack.record(replace(0, UndoGroup::None, "a")));
        assert!(stack.is_dirty());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_same_group_same_line_coalesces() {
        let mut stack = UndoStack::new(10);
        assert!(stack.record(replace(2, UndoGroup::Char, "ab")));
        assert!(!stack.record(replace(2, UndoGroup::Char, "abc")));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.last(), Some(&replace(2, UndoGroup::Char, "ab")));

        // Different line, group or an ungrouped record starts a new one
        assert!(stack.record(replace(3, UndoGroup::Char, "x")));
        assert!(stack.record(replace(3, UndoGroup::Space, "x")));
        assert!(stack.record(replace(3, UndoGroup::None, "x")));
        assert!(stack.record(replace(3, UndoGroup::None, "x")));
        assert_eq!(stack.depth(), 5);
    }

    #[test]
    fn test_eviction_respects_capacity() {
        let mut stack = UndoStack::new(3);
        for line in 0..5 {
            stack.record(replace(line, UndoGroup::None, "x"));
        }
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.last().map(|r| r.line), Some(4));
    }

    #[test]
    fn test_clean_watermark_follows_eviction() {
        let mut stack = UndoStack::new(3);
        stack.record(replace(0, UndoGroup::None, "a"));
        stack.record(replace(1, UndoGroup::None, "b"));
        stack.mark_clean();
        assert!(!stack.is_dirty());

        // One eviction moves the watermark from depth 2 to depth 1
        stack.record(replace(2, UndoGroup::None, "c"));
        stack.record(replace(3, UndoGroup::None, "d"));
        assert_eq!(stack.depth(), 3);

        stack.pop();
        assert!(stack.is_dirty());
        stack.pop();
        assert!(!stack.is_dirty());
        stack.pop();
        assert!(stack.is_dirty());
    }

    #[test]
    fn test_evicted_clean_state_is_never_reached_again() {
        let mut stack = UndoStack::new(1);
        stack.record(replace(0, UndoGroup::None, "a"));
        stack.record(replace(1, UndoGroup::None, "b"));
        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert!(stack.is_dirty());
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut stack = UndoStack::new(5);
        assert_eq!(stack.pop(), None);
        assert!(!stack.is_dirty());
    }

    #[test]
    fn test_revert_actions() {
        let mut buffer = TextBuffer::from_loaded(["a", "b", "c"]);

        UndoRecord {
            line: 1,
            col: 0,
            group: UndoGroup::None,
            action: UndoAction::Delete { count: 2 },
        }
        .revert(&mut buffer);
        assert_eq!(buffer.lines(), &["a"]);

        UndoRecord {
            line: 1,
            col: 0,
            group: UndoGroup::None,
            action: UndoAction::Insert {
                lines: vec!["b".into(), "c".into()],
            },
        }
        .revert(&mut buffer);
        assert_eq!(buffer.lines(), &["a", "b", "c"]);

        UndoRecord {
            line: 0,
            col: 0,
            group: UndoGroup::None,
            action: UndoAction::Replace {
                span: 2,
                lines: vec!["ab".into()],
            },
        }
        .revert(&mut buffer);
        assert_eq!(buffer.lines(), &["ab", "c"]);
    }
}
