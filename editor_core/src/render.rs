//! Diffing screen renderer
//!
//! Keeps a copy of what each text row currently shows and only rewrites
//! rows whose visible slice changed. Vertical scrolls shift that copy and
//! the terminal together, so scrolled content is not redrawn.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use hal::{TerminalDevice, TerminalError};

use crate::ansi;
use crate::buffer::char_slice;
use crate::core::EditorCore;
use crate::viewport::Scroll;

/// Fixed part of the status line reserved ahead of the message
const STATUS_RESERVED: usize = 25;

/// Screen renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    /// What each text row shows; `None` forces the row to be written
    rows: Vec<Option<String>>,
}

impl Renderer {
    pub fn new(height: usize) -> Self {
        Self {
            rows: vec![None; height],
        }
    }

    /// Forgets the screen contents so the next frame repaints every row
    pub fn invalidate(&mut self, height: usize) {
        self.rows.clear();
        self.rows.resize(height, None);
    }

    /// Cached contents of text row `row`
    #[cfg(test)]
    pub(crate) fn cached_row(&self, row: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.as_deref())
    }

    /// Realigns the view and writes one frame
    pub fn render<T: TerminalDevice + ?Sized>(
        &mut self,
        core: &mut EditorCore,
        term: &mut T,
    ) -> Result<(), TerminalError> {
        let frame = self.frame(core);
        term.write_bytes(frame.as_bytes())
    }

    /// Builds the bytes of one frame and updates the row cache
    pub fn frame(&mut self, core: &mut EditorCore) -> String {
        core.realign();
        let view = *core.viewport();
        if self.rows.len() != view.height {
            self.invalidate(view.height);
        }

        let mut out = String::new();
        if let Some(scroll) = core.take_scroll() {
            self.scroll(&mut out, scroll, view.height);
        }

        out.push_str(ansi::CURSOR_HIDE);
        self.draw_rows(&mut out, core);
        draw_status(&mut out, core);
        ansi::goto(&mut out, view.row, view.screen_col(core.cursor().col));
        out.push_str(ansi::CURSOR_SHOW);
        out
    }

    fn scroll(&mut self, out: &mut String, scroll: Scroll, height: usize) {
        match scroll {
            Scroll::Up(n) => {
                let n = n.min(height);
                self.rows.rotate_right(n);
                self.rows[..n].fill(Some(String::new()));
                ansi::goto(out, 0, 0);
                for _ in 0..n {
                    out.push_str(ansi::REVERSE_INDEX);
                }
            }
            Scroll::Down(n) => {
                let n = n.min(height);
                self.rows.rotate_left(n);
                self.rows[height - n..].fill(Some(String::new()));
                ansi::goto(out, height - 1, 0);
                for _ in 0..n {
                    out.push_str(ansi::INDEX);
                }
            }
        }
    }

    fn draw_rows(&mut self, out: &mut String, core: &mut EditorCore) {
        let view = *core.viewport();
        let total = core.buffer().line_count();
        let mark = core.mark();
        let check_mark = core.check_mark();
        let mut clear_check_mark = false;

        for (screen_row, cached) in self.rows.iter_mut().enumerate() {
            let line = view.top_line + screen_row;
            if line >= total {
                if cached.as_deref() != Some("") {
                    ansi::goto(out, screen_row, 0);
                    out.push_str(ansi::CLEAR_EOL);
                    *cached = Some(String::new());
                }
                continue;
            }

            let visible = char_slice(
                core.buffer().line(line),
                view.margin,
                view.margin + view.width,
            );
            if cached.as_deref() == Some(visible) && check_mark != Some(line) {
                continue;
            }

            ansi::goto(out, screen_row, 0);
            if mark == Some(line) {
                out.push_str(ansi::REVERSE);
                // Keep the highlight visible on empty lines
                out.push_str(if visible.is_empty() { " " } else { visible });
                out.push_str(ansi::RESET);
            } else {
                out.push_str(visible);
                if check_mark == Some(line) {
                    clear_check_mark = true;
                }
            }
            if visible.chars().count() < view.width {
                out.push_str(ansi::CLEAR_EOL);
            }
            *cached = Some(visible.into());
        }

        if clear_check_mark {
            core.clear_check_mark();
        }
    }
}

fn draw_status(out: &mut String, core: &EditorCore) {
    let view = core.viewport();
    let cursor = core.cursor();
    let message: String = core
        .message()
        .chars()
        .take(view.width.saturating_sub(STATUS_RESERVED))
        .collect();

    ansi::goto(out, view.height, 0);
    out.push_str(ansi::BOLD);
    let _ = write!(
        out,
        "[{}] {} Row: {} Col: {}  {}",
        core.buffer().line_count(),
        if core.dirty() { '*' } else { ' ' },
        cursor.row + 1,
        cursor.col + 1,
        message
    );
    out.push_str(ansi::RESET);
    out.push_str(ansi::CLEAR_EOL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::key::{Command, Key};
    use alloc::format;
    use hal::MemoryTerminal;

    fn editor(lines: &[&str], height: usize, width: usize) -> EditorCore {
        let mut core = EditorCore::with_lines(lines.iter().copied(), EditorConfig::default());
        core.resize(height, width);
        core
    }

    #[test]
    fn test_first_frame_writes_every_row() {
        let mut core = editor(&["one", "two"], 3, 20);
        let mut renderer = Renderer::new(3);
        let frame = renderer.frame(&mut core);

        assert!(frame.starts_with(ansi::CURSOR_HIDE));
        assert!(frame.contains("\x1b[1;1Hone\x1b[0K"));
        assert!(frame.contains("\x1b[2;1Htwo\x1b[0K"));
        assert!(frame.contains("\x1b[3;1H\x1b[0K"));
        assert!(frame.contains("\x1b[4;1H\x1b[1m[2]   Row: 1 Col: 1  \x1b[0m\x1b[0K"));
        assert!(frame.ends_with("\x1b[1;1H\x1b[?25h"));
        assert_eq!(renderer.cached_row(0), Some("one"));
        assert_eq!(renderer.cached_row(2), Some(""));
    }

    #[test]
    fn test_unchanged_rows_are_not_rewritten() {
        let mut core = editor(&["one", "two"], 3, 20);
        let mut renderer = Renderer::new(3);
        renderer.frame(&mut core);

        core.apply_key(Key::Command(Command::End));
        let frame = renderer.frame(&mut core);
        assert!(!frame.contains("one"));
        assert!(!frame.contains("two"));
        assert!(frame.contains("Row: 1 Col: 4"));
        assert!(frame.ends_with("\x1b[1;4H\x1b[?25h"));

        core.apply_key(Key::Char('!'));
        let frame = renderer.frame(&mut core);
        assert!(frame.contains("\x1b[1;1Hone!\x1b[0K"));
        assert!(!frame.contains("two"));
        assert!(frame.contains("[2] * Row: 1 Col: 5"));
    }

    #[test]
    fn test_full_width_row_skips_clear() {
        let mut core = editor(&["abcd"], 2, 4);
        let mut renderer = Renderer::new(2);
        let frame = renderer.frame(&mut core);
        assert!(frame.contains("\x1b[1;1Habcd\x1b[2;1H"));
    }

    #[test]
    fn test_horizontal_scroll_shows_slice() {
        let mut core = editor(&["0123456789abcdef"], 2, 8);
        let mut renderer = Renderer::new(2);
        core.apply_key(Key::Command(Command::End));
        let frame = renderer.frame(&mut core);
        // margin = 16 - 8 + 2
        assert_eq!(core.viewport().margin, 10);
        assert!(frame.contains("\x1b[1;1Habcdef\x1b[0K"));
        assert!(frame.ends_with("\x1b[1;7H\x1b[?25h"));
    }

    #[test]
    fn test_mark_line_is_highlighted_and_cleared() {
        let mut core = editor(&["", "b"], 3, 20);
        let mut renderer = Renderer::new(3);
        renderer.frame(&mut core);

        core.apply_key(Key::Command(Command::Mark));
        let frame = renderer.frame(&mut core);
        assert!(frame.contains("\x1b[1;1H\x1b[7m \x1b[0m\x1b[0K"));
        assert_eq!(core.check_mark(), Some(0));

        core.apply_key(Key::Command(Command::Mark));
        let frame = renderer.frame(&mut core);
        assert!(frame.contains("\x1b[1;1H\x1b[0K"));
        assert_eq!(core.check_mark(), None);

        // Nothing left to repaint
        let frame = renderer.frame(&mut core);
        assert!(!frame.contains("\x1b[1;1H\x1b[0K"));
    }

    fn numbered(count: usize, height: usize) -> EditorCore {
        let lines: Vec<String> = (0..count).map(|i| format!("line {}", i)).collect();
        let mut core = EditorCore::with_lines(&lines, EditorConfig::default());
        core.resize(height, 20);
        core
    }

    #[test]
    fn test_scroll_down_shifts_cache() {
        let mut core = numbered(10, 3);
        let mut renderer = Renderer::new(3);
        renderer.frame(&mut core);

        core.apply_key(Key::Command(Command::Down));
        renderer.frame(&mut core);
        core.apply_key(Key::Command(Command::Down));
        renderer.frame(&mut core);
        core.apply_key(Key::Command(Command::Down));
        let frame = renderer.frame(&mut core);

        assert!(frame.starts_with("\x1b[3;1H\x1bD\x1b[?25l"));
        assert_eq!(core.viewport().top_line, 1);
        // Rows already on screen are not repainted
        assert!(!frame.contains("line 1"));
        assert!(!frame.contains("line 2"));
        assert!(frame.contains("\x1b[3;1Hline 3\x1b[0K"));
        assert_eq!(renderer.cached_row(0), Some("line 1"));
    }

    #[test]
    fn test_scroll_up_shifts_cache() {
        let mut core = numbered(10, 3);
        core.goto_line("6");
        let mut renderer = Renderer::new(3);
        renderer.frame(&mut core);
        assert_eq!(core.viewport().top_line, 4);

        core.apply_key(Key::Command(Command::Up));
        renderer.frame(&mut core);
        core.apply_key(Key::Command(Command::Up));
        let frame = renderer.frame(&mut core);

        assert!(frame.starts_with("\x1b[1;1H\x1bM\x1b[?25l"));
        assert_eq!(core.viewport().top_line, 3);
        assert!(frame.contains("\x1b[1;1Hline 3\x1b[0K"));
        assert!(!frame.contains("line 4"));
        assert_eq!(renderer.cached_row(1), Some("line 4"));
    }

    #[test]
    fn test_status_message_truncated() {
        let mut core = editor(&["a"], 2, 30);
        core.set_message("0123456789");
        let frame = Renderer::new(2).frame(&mut core);
        assert!(frame.contains("Col: 1  01234\x1b[0m"));
    }

    #[test]
    fn test_render_writes_to_terminal() {
        let mut core = editor(&["hi"], 2, 10);
        let mut term = MemoryTerminal::new();
        Renderer::new(2).render(&mut core, &mut term).unwrap();
        assert!(term.output().windows(2).any(|w| w == b"hi"));
    }
}
