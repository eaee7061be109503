//! EditorCore state machine
//!
//! Owns the document, cursor, viewport, mark, yank buffer and undo log, and
//! applies one decoded key at a time. Operations that need a line of user
//! input or file access are not performed here; they are returned as
//! [`CoreOutcome::RequestPrompt`] and completed by the session through the
//! public helpers below.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{
    buffer::{char_len, leading_spaces, line_range, spaces_before, Position, TextBuffer},
    command::parse_flags,
    command::parse_goto,
    config::EditorConfig,
    key::{Command, Key},
    snapshot::EditorSnapshot,
    tabs,
    undo::{UndoAction, UndoGroup, UndoRecord, UndoStack},
    viewport::{Scroll, Viewport},
};

/// Lines moved by one mouse wheel step
const WHEEL_LINES: usize = 3;

/// Marker starting a comment, ignored by the autoindent `:` check
const COMMENT: char = '#';

/// Outcome from applying a key to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreOutcome {
    /// Nothing changed
    Continue,
    /// Document, cursor or view may have changed
    Changed,
    /// Quit was pressed; the session confirms when the document is dirty
    RequestExit,
    /// The screen size must be queried again and the screen repainted
    RequestRedraw,
    /// The command needs user input or file access
    RequestPrompt(PromptRequest),
}

/// Interactive command waiting for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRequest {
    Find,
    Goto,
    Flags,
    Replace,
    Save,
    InsertFile,
}

/// Editor core state machine
#[derive(Debug, Clone)]
pub struct EditorCore {
    buffer: TextBuffer,
    cursor_line: usize,
    /// Column clamped to the current line
    col: usize,
    /// Requested column; may exceed the line until the next clamp
    tcol: usize,
    view: Viewport,
    mark: Option<usize>,
    /// Former mark line that must be repainted once without highlight
    check_mark: Option<usize>,
    /// The mark was used by a ranged indent and ends with the next other key
    mark_tab: bool,
    undo: UndoStack,
    yank_buffer: Vec<String>,
    config: EditorConfig,
    message: String,
    find_pattern: String,
    replace_pattern: String,
    file_name: Option<String>,
    pointer: Position,
    scroll: Option<Scroll>,
}

impl EditorCore {
    /// Create an editor holding one empty line
    pub fn new(config: EditorConfig) -> Self {
        Self::with_buffer(TextBuffer::new(), config)
    }

    /// Create an editor for lines received from a file or pipe
    pub fn with_lines<I, S>(lines: I, config: EditorConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_buffer(TextBuffer::from_loaded(lines), config)
    }

    fn with_buffer(buffer: TextBuffer, config: EditorConfig) -> Self {
        Self {
            buffer,
            cursor_line: 0,
            col: 0,
            tcol: 0,
            view: Viewport::new(1, 1),
            mark: None,
            check_mark: None,
            mark_tab: false,
            undo: UndoStack::new(config.undo_limit),
            yank_buffer: Vec::new(),
            config,
            message: String::new(),
            find_pattern: String::new(),
            replace_pattern: String::new(),
            file_name: None,
            pointer: Position::zero(),
            scroll: None,
        }
    }

    /// Apply a key event and return the outcome
    ///
    /// Clears the status message first. A mark consumed by a ranged indent
    /// is dropped by any key other than Tab or BackTab.
    pub fn apply_key(&mut self, key: Key) -> CoreOutcome {
        self.message.clear();
        if self.mark_tab && !matches!(key, Key::Command(Command::Tab | Command::BackTab)) {
            self.mark = None;
        }
        self.clamp_cursor();

        match key {
            Key::Char(ch) if key.is_printable() => {
                self.insert_char(ch);
                CoreOutcome::Changed
            }
            Key::Char(_) => CoreOutcome::Continue,
            Key::Command(cmd) => self.apply_command(cmd),
        }
    }

    fn apply_command(&mut self, cmd: Command) -> CoreOutcome {
        match cmd {
            Command::Quit => CoreOutcome::RequestExit,
            Command::Redraw => CoreOutcome::RequestRedraw,

            Command::Find => CoreOutcome::RequestPrompt(PromptRequest::Find),
            Command::Goto => CoreOutcome::RequestPrompt(PromptRequest::Goto),
            Command::Toggle => CoreOutcome::RequestPrompt(PromptRequest::Flags),
            Command::Replace => CoreOutcome::RequestPrompt(PromptRequest::Replace),
            Command::Write => CoreOutcome::RequestPrompt(PromptRequest::Save),
            Command::Get => CoreOutcome::RequestPrompt(PromptRequest::InsertFile),

            Command::FindAgain => {
                self.find_again();
                CoreOutcome::Changed
            }

            Command::Up
            | Command::Down
            | Command::Left
            | Command::Right
            | Command::Home
            | Command::End
            | Command::PageUp
            | Command::PageDown
            | Command::First
            | Command::Last
            | Command::Mouse
            | Command::ScrollUp
            | Command::ScrollDown => {
                self.move_cursor(cmd);
                CoreOutcome::Changed
            }

            Command::Enter
            | Command::Backspace
            | Command::Delete
            | Command::Tab
            | Command::BackTab
            | Command::Mark
            | Command::Yank
            | Command::Duplicate
            | Command::Zap
            | Command::Undo => {
                if self.edit(cmd) {
                    CoreOutcome::Changed
                } else {
                    CoreOutcome::Continue
                }
            }
        }
    }

    // Cursor movement

    fn move_cursor(&mut self, cmd: Command) {
        let last_line = self.buffer.line_count() - 1;
        let height = self.view.height;

        match cmd {
            Command::Up => self.cursor_up(),
            Command::Down => self.cursor_down(),
            Command::Left => {
                if self.col == 0 && self.cursor_line > 0 {
                    self.cursor_up();
                    self.tcol = self.buffer.line_length(self.cursor_line);
                } else {
                    self.tcol = self.col.saturating_sub(1);
                }
            }
            Command::Right => {
                if self.col >= self.current_len() && self.cursor_line < last_line {
                    self.cursor_down();
                    self.tcol = 0;
                } else {
                    self.tcol = self.col + 1;
                }
            }
            Command::Home => {
                self.tcol = if self.col == 0 {
                    leading_spaces(self.current_line())
                } else {
                    0
                };
            }
            Command::End => self.tcol = self.current_len(),
            Command::PageUp => self.cursor_line = self.cursor_line.saturating_sub(height),
            Command::PageDown => self.cursor_line = self.cursor_line.saturating_add(height),
            Command::First => self.cursor_line = 0,
            Command::Last => {
                self.cursor_line = last_line;
                self.view.row = height - 1;
            }
            Command::Mouse => {
                if self.pointer.row < height {
                    self.tcol = self.pointer.col + self.view.margin;
                    self.cursor_line = self.pointer.row + self.view.top_line;
                }
            }
            Command::ScrollUp => {
                if self.view.top_line > 0 {
                    self.view.top_line = self.view.top_line.saturating_sub(WHEEL_LINES);
                    self.cursor_line = self.cursor_line.min(self.view.top_line + height - 1);
                    self.request_scroll(Scroll::Up(WHEEL_LINES));
                }
            }
            Command::ScrollDown => {
                if self.view.top_line + height <= last_line {
                    self.view.top_line = (self.view.top_line + WHEEL_LINES).min(last_line);
                    self.cursor_line = self.cursor_line.max(self.view.top_line);
                    self.request_scroll(Scroll::Down(WHEEL_LINES));
                }
            }
            _ => {}
        }
    }

    fn cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            if self.cursor_line < self.view.top_line {
                self.request_scroll(Scroll::Up(1));
            }
        }
    }

    fn cursor_down(&mut self) {
        if self.cursor_line + 1 < self.buffer.line_count() {
            self.cursor_line += 1;
            if self.cursor_line == self.view.top_line + self.view.height {
                self.request_scroll(Scroll::Down(1));
            }
        }
    }

    fn request_scroll(&mut self, scroll: Scroll) {
        self.scroll = match self.scroll {
            Some(pending) => pending.merge(scroll),
            None => Some(scroll),
        };
    }

    // Editing

    fn edit(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Enter => self.split_line(),
            Command::Backspace => self.backspace(),
            Command::Delete => self.delete(),
            Command::Tab => self.indent(),
            Command::BackTab => self.unindent(),
            Command::Mark => {
                self.toggle_mark();
                true
            }
            Command::Yank => self.yank(),
            Command::Duplicate => {
                self.yank_buffer = self.buffer.copy_range(self.mark_range());
                self.mark = None;
                true
            }
            Command::Zap => self.zap(),
            Command::Undo => self.undo(),
            _ => false,
        }
    }

    fn record(&mut self, line: usize, group: UndoGroup, action: UndoAction) {
        self.undo.record(UndoRecord {
            line,
            col: self.col,
            group,
            action,
        });
    }

    /// Snapshot of the current line for a single-line undo record
    fn save_current(&self) -> UndoAction {
        UndoAction::Replace {
            span: 1,
            lines: vec![self.current_line().into()],
        }
    }

    fn insert_char(&mut self, ch: char) {
        let group = if ch == ' ' {
            UndoGroup::Space
        } else {
            UndoGroup::Char
        };
        let action = self.save_current();
        self.record(self.cursor_line, group, action);
        self.buffer
            .insert_char(Position::new(self.cursor_line, self.col), ch);
        self.tcol = self.col + 1;
    }

    fn split_line(&mut self) -> bool {
        let line = String::from(self.current_line());
        self.record(
            self.cursor_line,
            UndoGroup::None,
            UndoAction::Replace {
                span: 2,
                lines: vec![line.clone()],
            },
        );

        let mut indent = 0;
        if self.config.autoindent {
            indent = leading_spaces(&line).min(self.col);
            let code = line.split(COMMENT).next().unwrap_or_default().trim_end();
            if code.ends_with(':') && self.col >= char_len(code) {
                indent += self.config.tab_size;
            }
        }

        self.buffer.split_line(self.cursor_line, self.col, indent);
        self.cursor_line += 1;
        self.tcol = indent;
        true
    }

    fn backspace(&mut self) -> bool {
        if self.col > 0 {
            let action = self.save_current();
            self.record(self.cursor_line, UndoGroup::Backspace, action);
            self.buffer
                .remove_chars(self.cursor_line, self.col - 1..self.col);
            self.tcol = self.col - 1;
            true
        } else if self.cursor_line > 0 {
            let prev = self.cursor_line - 1;
            let lines = self.buffer.copy_range(prev..self.cursor_line + 1);
            self.record(prev, UndoGroup::None, UndoAction::Replace { span: 1, lines });
            self.tcol = self.buffer.line_length(prev);
            self.buffer.join_with_next(prev);
            self.cursor_line = prev;
            true
        } else {
            false
        }
    }

    fn delete(&mut self) -> bool {
        if self.col < self.current_len() {
            let action = self.save_current();
            self.record(self.cursor_line, UndoGroup::Delete, action);
            self.buffer
                .remove_chars(self.cursor_line, self.col..self.col + 1);
            true
        } else if self.cursor_line + 1 < self.buffer.line_count() {
            let lines = self
                .buffer
                .copy_range(self.cursor_line..self.cursor_line + 2);
            self.record(
                self.cursor_line,
                UndoGroup::None,
                UndoAction::Replace { span: 1, lines },
            );
            self.buffer.join_with_next(self.cursor_line);
            true
        } else {
            false
        }
    }

    fn indent(&mut self) -> bool {
        let tab = self.config.tab_size;
        if self.mark.is_some() {
            self.mark_tab = true;
            let range = self.record_range(UndoGroup::Indent);
            for row in range {
                let line = self.buffer.line(row);
                if !line.is_empty() {
                    let pad = tab - leading_spaces(line) % tab;
                    self.buffer.insert_str(Position::new(row, 0), &" ".repeat(pad));
                }
            }
        } else {
            let action = self.save_current();
            self.record(self.cursor_line, UndoGroup::Tab, action);
            let pad = tab - self.col % tab;
            self.buffer
                .insert_str(Position::new(self.cursor_line, self.col), &" ".repeat(pad));
            self.tcol = self.col + pad;
        }
        true
    }

    fn unindent(&mut self) -> bool {
        let tab = self.config.tab_size;
        if self.mark.is_some() {
            self.mark_tab = true;
            let range = self.record_range(UndoGroup::Indent);
            for row in range {
                let spaces = leading_spaces(self.buffer.line(row));
                if spaces > 0 {
                    self.buffer.remove_chars(row, 0..(spaces - 1) % tab + 1);
                }
            }
            true
        } else {
            if self.col == 0 {
                return false;
            }
            let drop = ((self.col - 1) % tab + 1).min(spaces_before(self.current_line(), self.col));
            if drop == 0 {
                return false;
            }
            let action = self.save_current();
            self.record(self.cursor_line, UndoGroup::BackTab, action);
            self.buffer
                .remove_chars(self.cursor_line, self.col - drop..self.col);
            self.tcol = self.col - drop;
            true
        }
    }

    /// Records the whole mark range as one replace record
    fn record_range(&mut self, group: UndoGroup) -> Range<usize> {
        let range = self.mark_range();
        let lines = self.buffer.copy_range(range.clone());
        self.record(
            range.start,
            group,
            UndoAction::Replace {
                span: range.len(),
                lines,
            },
        );
        range
    }

    fn toggle_mark(&mut self) {
        match self.mark {
            None => {
                self.mark = Some(self.cursor_line);
                self.check_mark = Some(self.cursor_line);
                self.mark_tab = false;
            }
            Some(_) => self.mark = None,
        }
    }

    fn yank(&mut self) -> bool {
        let range = self.mark_range();
        let start = range.start;
        let wipes_all = range.len() >= self.buffer.line_count();
        let lines = self.buffer.copy_range(range.clone());

        // Wiping everything leaves one empty line behind, which undo replaces
        let action = if wipes_all {
            UndoAction::Replace {
                span: 1,
                lines: lines.clone(),
            }
        } else {
            UndoAction::Insert {
                lines: lines.clone(),
            }
        };
        self.record(start, UndoGroup::None, action);

        self.buffer.remove_lines(range);
        self.yank_buffer = lines;
        self.cursor_line = start;
        self.mark = None;
        true
    }

    fn zap(&mut self) -> bool {
        if self.yank_buffer.is_empty() {
            return false;
        }
        self.record(
            self.cursor_line,
            UndoGroup::None,
            UndoAction::Delete {
                count: self.yank_buffer.len(),
            },
        );
        self.buffer
            .insert_lines(self.cursor_line, self.yank_buffer.clone());
        true
    }

    fn undo(&mut self) -> bool {
        let Some(record) = self.undo.pop() else {
            return false;
        };
        if record.group != UndoGroup::Indent {
            self.cursor_line = record.line;
            self.tcol = record.col;
        }
        record.revert(&mut self.buffer);
        true
    }

    // Search

    /// Searches from `from_col` on the cursor line through the line before
    /// `end_line`, without wrapping around.
    ///
    /// On a match the cursor moves to it and the match length is returned.
    /// Otherwise the status message reports the failure, the cursor stays
    /// and 0 is returned. The pattern is remembered for Find-Again.
    pub fn find(&mut self, pattern: &str, from_col: usize, end_line: usize) -> usize {
        self.find_pattern = pattern.into();
        let fold = !self.config.case_sensitive;
        let needle: Vec<char> = fold_chars(pattern.chars(), fold).collect();
        let end_line = end_line.min(self.buffer.line_count());

        if !needle.is_empty() {
            let mut start = from_col;
            for row in self.cursor_line..end_line {
                if let Some((at, len)) = find_in_line(self.buffer.line(row), start, &needle, fold) {
                    self.tcol = at;
                    self.cursor_line = row;
                    return len;
                }
                start = 0;
            }
        }

        let shown: String = needle.iter().collect();
        self.message = format!("No match: {}", shown);
        0
    }

    /// Find from the cursor column to the end of the document
    pub fn search(&mut self, pattern: &str) -> usize {
        let found = self.find(pattern, self.col, self.buffer.line_count());
        self.center_row();
        found
    }

    fn find_again(&mut self) {
        if self.find_pattern.is_empty() {
            return;
        }
        let pattern = self.find_pattern.clone();
        self.find(&pattern, self.col + 1, self.buffer.line_count());
        self.center_row();
    }

    fn center_row(&mut self) {
        self.view.row = self.view.height / 2;
    }

    /// Starts a replace run and returns the line bound for its searches.
    ///
    /// With a mark the run covers the mark range and starts at its first
    /// line; otherwise it runs from the cursor to the end of the document.
    pub fn begin_replace(&mut self, replacement: &str) -> usize {
        self.replace_pattern = replacement.into();
        let end = if self.mark.is_some() {
            let range = self.mark_range();
            self.cursor_line = range.start;
            range.end
        } else {
            self.buffer.line_count()
        };
        self.tcol = self.col;
        end
    }

    /// Replaces `len` characters at the cursor with the replacement text
    /// and moves past the inserted text.
    pub fn replace_match(&mut self, len: usize) {
        let action = self.save_current();
        self.record(self.cursor_line, UndoGroup::None, action);
        self.buffer
            .remove_chars(self.cursor_line, self.tcol..self.tcol + len);
        self.buffer.insert_str(
            Position::new(self.cursor_line, self.tcol),
            &self.replace_pattern,
        );
        self.tcol += char_len(&self.replace_pattern);
    }

    /// Leaves the match at the cursor in place and moves one column on
    pub fn skip_match(&mut self) {
        self.tcol += 1;
    }

    // Prompted commands

    /// Jumps to a 1-based line number; anything unparsable is ignored
    pub fn goto_line(&mut self, answer: &str) {
        if let Some(line) = parse_goto(answer) {
            self.cursor_line = line;
            self.center_row();
        }
    }

    /// Applies an answer to [`EditorConfig::flags_prompt`]
    pub fn apply_flags(&mut self, answer: &str) {
        let update = parse_flags(answer);
        if let Some(flag) = update.case_sensitive {
            self.config.case_sensitive = flag;
        }
        if let Some(flag) = update.autoindent {
            self.config.autoindent = flag;
        }
        if let Some(size) = update.tab_size {
            self.config.tab_size = size;
        }
        if let Some(flag) = update.write_tabs {
            self.config.write_tabs = flag;
        }
    }

    /// Inserts lines read from a file before the cursor line.
    ///
    /// Returns false when there was nothing to insert.
    pub fn insert_lines(&mut self, lines: Vec<String>) -> bool {
        if lines.is_empty() {
            return false;
        }
        let lines: Vec<String> = lines
            .iter()
            .map(|line| tabs::normalize_loaded(line))
            .collect();
        self.record(
            self.cursor_line,
            UndoGroup::None,
            UndoAction::Delete { count: lines.len() },
        );
        self.buffer.insert_lines(self.cursor_line, lines);
        true
    }

    /// Takes the lines a save should write and clears the mark.
    ///
    /// Returns the lines, tab-packed when configured, and whether they are
    /// the whole document.
    pub fn take_save_lines(&mut self) -> (Vec<String>, bool) {
        let (range, whole) = match self.mark.take() {
            Some(mark) => (line_range(self.cursor_line, Some(mark)), false),
            None => (0..self.buffer.line_count(), true),
        };
        let mut lines = self.buffer.copy_range(range);
        if self.config.write_tabs {
            for line in &mut lines {
                *line = tabs::pack(line);
            }
        }
        (lines, whole)
    }

    /// Records a successful save of the whole document under `name`
    pub fn mark_saved(&mut self, name: &str) {
        self.undo.mark_clean();
        self.file_name = Some(name.into());
    }

    // View

    /// Clamps the cursor to the document and scrolls it into view
    pub fn realign(&mut self) {
        self.clamp_cursor();
        self.view.align(self.cursor_line, self.col);
    }

    fn clamp_cursor(&mut self) {
        self.cursor_line = self.cursor_line.min(self.buffer.line_count() - 1);
        self.col = self.tcol.min(self.current_len());
    }

    /// Adopts a new text area size
    pub fn resize(&mut self, height: usize, width: usize) {
        self.view.resize(height, width);
    }

    /// Takes the terminal scroll requested since the last frame
    pub fn take_scroll(&mut self) -> Option<Scroll> {
        self.scroll.take()
    }

    pub fn clear_check_mark(&mut self) {
        self.check_mark = None;
    }

    /// Sets the screen position used by the next mouse click
    pub fn set_pointer(&mut self, pointer: Position) {
        self.pointer = pointer;
    }

    // Accessors

    fn current_line(&self) -> &str {
        self.buffer.line(self.cursor_line)
    }

    fn current_len(&self) -> usize {
        self.buffer.line_length(self.cursor_line)
    }

    /// Mark range, or the cursor line alone without a mark
    pub fn mark_range(&self) -> Range<usize> {
        line_range(self.cursor_line, self.mark)
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.buffer.into_lines()
    }

    /// Cursor line and clamped column
    pub fn cursor(&self) -> Position {
        Position::new(self.cursor_line, self.col)
    }

    /// Requested column, not yet clamped to the line
    pub fn target_col(&self) -> usize {
        self.tcol
    }

    pub fn viewport(&self) -> &Viewport {
        &self.view
    }

    pub fn mark(&self) -> Option<usize> {
        self.mark
    }

    pub fn check_mark(&self) -> Option<usize> {
        self.check_mark
    }

    pub fn dirty(&self) -> bool {
        self.undo.is_dirty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.depth()
    }

    pub fn yank_buffer(&self) -> &[String] {
        &self.yank_buffer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn find_pattern(&self) -> &str {
        &self.find_pattern
    }

    pub fn replace_pattern(&self) -> &str {
        &self.replace_pattern
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    /// Get a complete snapshot of editor state (for parity testing)
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            cursor: self.cursor(),
            lines: self.buffer.lines().to_vec(),
            dirty: self.dirty(),
            mark: self.mark,
            undo_depth: self.undo.depth(),
            top_line: self.view.top_line,
            margin: self.view.margin,
        }
    }
}

/// Lowercases `chars` when `fold` is set
fn fold_chars(chars: impl Iterator<Item = char>, fold: bool) -> impl Iterator<Item = char> {
    chars.flat_map(move |ch| {
        let mut lower = ch.to_lowercase();
        let first = if fold { lower.next() } else { Some(ch) };
        first.into_iter().chain(lower.filter(move |_| fold))
    })
}

/// Finds `needle` in `line` at or after char column `start`.
///
/// Returns the match column and length counted in chars of `line`, even when
/// folding changes how many chars a line char turns into.
fn find_in_line(line: &str, start: usize, needle: &[char], fold: bool) -> Option<(usize, usize)> {
    // Each folded char keeps the column of the line char it came from
    let folded: Vec<(usize, char)> = line
        .chars()
        .enumerate()
        .skip(start)
        .flat_map(|(col, ch)| fold_chars(core::iter::once(ch), fold).map(move |c| (col, c)))
        .collect();

    folded
        .windows(needle.len())
        .enumerate()
        .find(|&(i, window)| {
            let on_boundary = i == 0 || folded[i - 1].0 != window[0].0;
            on_boundary && window.iter().map(|&(_, c)| c).eq(needle.iter().copied())
        })
        .map(|(_, window)| {
            let first = window[0].0;
            let last = window[window.len() - 1].0;
            (first, last + 1 - first)
        })
}
