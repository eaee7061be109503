//! Platform-independent key representation

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Logical editor command produced by a control byte or escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Command {
    // Navigation
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    First,
    Last,
    Goto,

    // Search
    Find,
    FindAgain,
    Replace,

    // Editing
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Mark,
    Yank,
    Duplicate,
    Zap,
    Undo,

    // Files
    Write,
    Get,

    // Session
    Quit,
    Redraw,
    Toggle,

    // Mouse reports
    Mouse,
    ScrollUp,
    ScrollDown,
}

/// Platform-independent key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Key {
    /// A mapped control byte or escape sequence
    Command(Command),
    /// Any other single character, including unmapped control bytes
    Char(char),
}

impl Key {
    /// True for characters the editor inserts into the text
    pub fn is_printable(self) -> bool {
        matches!(self, Key::Char(ch) if ch >= ' ' && ch != '\x7f')
    }
}

impl From<Command> for Key {
    fn from(cmd: Command) -> Self {
        Key::Command(cmd)
    }
}

/// Raw byte sequences recognized by the decoder
///
/// Several sequences map to one command to cover the dialects of common
/// terminal emulators (xterm, Linux console, PuTTY, minicom).
pub const KEYMAP: &[(&[u8], Command)] = &[
    (b"\x1b[A", Command::Up),
    (b"\x1b[B", Command::Down),
    (b"\x1b[D", Command::Left),
    (b"\x1b[C", Command::Right),
    (b"\x1b[H", Command::Home),
    (b"\x1bOH", Command::Home),
    (b"\x1b[1~", Command::Home),
    (b"\x1b[F", Command::End),
    (b"\x1bOF", Command::End),
    (b"\x1b[4~", Command::End),
    (b"\x1b[5~", Command::PageUp),
    (b"\x1b[6~", Command::PageDown),
    (b"\x03", Command::Quit), // Ctrl-C
    (b"\r", Command::Enter),
    (b"\x7f", Command::Backspace),
    (b"\x1b[3~", Command::Delete),
    (b"\x1b[Z", Command::BackTab), // Shift-Tab
    (b"\x1b[3;5~", Command::Yank), // Ctrl-Del
    (b"\x11", Command::Quit),      // Ctrl-Q
    (b"\n", Command::Enter),
    (b"\x08", Command::Backspace),
    (b"\x13", Command::Write),     // Ctrl-S
    (b"\x06", Command::Find),      // Ctrl-F
    (b"\x0e", Command::FindAgain), // Ctrl-N
    (b"\x07", Command::Goto),      // Ctrl-G
    (b"\x05", Command::Redraw),    // Ctrl-E
    (b"\x1a", Command::Undo),      // Ctrl-Z
    (b"\x09", Command::Tab),
    (b"\x15", Command::BackTab),   // Ctrl-U
    (b"\x12", Command::Replace),   // Ctrl-R
    (b"\x18", Command::Yank),      // Ctrl-X
    (b"\x16", Command::Zap),       // Ctrl-V
    (b"\x04", Command::Duplicate), // Ctrl-D
    (b"\x0c", Command::Mark),      // Ctrl-L
    (b"\x1b[M", Command::Mouse),
    (b"\x01", Command::Toggle),    // Ctrl-A
    (b"\x14", Command::First),     // Ctrl-T
    (b"\x02", Command::Last),      // Ctrl-B
    (b"\x1b[1;5H", Command::First),
    (b"\x1b[1;5F", Command::Last),
    (b"\x0f", Command::Get),       // Ctrl-O
];

/// Looks up a complete byte sequence in [`KEYMAP`]
pub fn lookup(sequence: &[u8]) -> Option<Command> {
    KEYMAP
        .iter()
        .find(|(bytes, _)| *bytes == sequence)
        .map(|(_, cmd)| *cmd)
}
