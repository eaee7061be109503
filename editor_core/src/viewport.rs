//! Visible window onto the document

/// Pending terminal scroll of the text rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    /// Content moves down, exposing rows at the top
    Up(usize),
    /// Content moves up, exposing rows at the bottom
    Down(usize),
}

impl Scroll {
    /// Folds a second scroll request into this one.
    ///
    /// Opposite directions cancel out as far as they can.
    pub fn merge(self, other: Scroll) -> Option<Scroll> {
        let signed = |s: Scroll| match s {
            Scroll::Up(n) => -(n as isize),
            Scroll::Down(n) => n as isize,
        };
        match signed(self) + signed(other) {
            0 => None,
            n if n < 0 => Some(Scroll::Up(n.unsigned_abs())),
            n => Some(Scroll::Down(n.unsigned_abs())),
        }
    }
}

/// Screen geometry and scroll offsets
///
/// `height` counts text rows only; the status line sits below them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible document line
    pub top_line: usize,
    /// First visible column
    pub margin: usize,
    /// Cursor row relative to `top_line`
    pub row: usize,
    pub height: usize,
    pub width: usize,
}

impl Viewport {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            top_line: 0,
            margin: 0,
            row: 0,
            height: height.max(1),
            width: width.max(1),
        }
    }

    /// Adopts a new screen size, keeping the cursor row on screen
    pub fn resize(&mut self, height: usize, width: usize) {
        self.height = height.max(1);
        self.width = width.max(1);
        self.row = self.row.min(self.height - 1);
    }

    /// Whether `line` is inside the visible rows
    pub fn shows_line(&self, line: usize) -> bool {
        self.top_line <= line && line < self.top_line + self.height
    }

    /// Scrolls so that (`line`, `col`) is visible.
    ///
    /// The horizontal margin is settled first, then the top line, and the
    /// cursor row is recomputed last. When the line is off screen the
    /// previous cursor row is kept if possible.
    pub fn align(&mut self, line: usize, col: usize) {
        if col >= self.margin + self.width {
            // Leave a quarter of the width as look-ahead
            self.margin = col - self.width + (self.width / 4).max(1);
        } else if col < self.margin {
            self.margin = col.saturating_sub(self.width / 4);
        }

        if !self.shows_line(line) {
            let row = self.row.min(self.height - 1);
            self.top_line = line.saturating_sub(row);
        }

        self.row = line - self.top_line;
    }

    /// Screen column of document column `col`
    pub fn screen_col(&self, col: usize) -> usize {
        col.saturating_sub(self.margin)
    }
}
