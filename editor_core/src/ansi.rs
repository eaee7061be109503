//! VT100 control sequences

use core::fmt::Write;

use alloc::string::String;

pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";
pub const CLEAR_EOL: &str = "\x1b[0K";
pub const BOLD: &str = "\x1b[1m";
pub const REVERSE: &str = "\x1b[7m";
pub const RESET: &str = "\x1b[0m";
pub const MOUSE_ON: &str = "\x1b[?9h";
pub const MOUSE_OFF: &str = "\x1b[?9l";
pub const SCROLL_REGION_RESET: &str = "\x1b[r";
/// Reverse index: at the top of the scroll region, scrolls content down
pub const REVERSE_INDEX: &str = "\x1bM";
/// Index: at the bottom of the scroll region, scrolls content up
pub const INDEX: &str = "\x1bD";
/// Parks the cursor in the far corner and asks where it ended up
pub const SIZE_QUERY: &str = "\x1b[999;999H\x1b[6n";

/// Appends a cursor move to 0-based (`row`, `col`)
pub fn goto(out: &mut String, row: usize, col: usize) {
    let _ = write!(out, "\x1b[{};{}H", row + 1, col + 1);
}

/// Appends a scroll region covering rows `1..=rows`
pub fn scroll_region(out: &mut String, rows: usize) {
    let _ = write!(out, "\x1b[1;{}r", rows);
}

/// Parses a cursor position report `ESC [ rows ; cols` (the final `R`
/// already stripped) into (rows, cols).
pub fn parse_size_report(report: &[u8]) -> Option<(usize, usize)> {
    let body = report.strip_prefix(b"\x1b[")?;
    let text = core::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?))
}
