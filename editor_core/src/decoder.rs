//! Byte stream to key decoder
//!
//! Turns raw terminal input into [`Key`] events: control bytes, escape
//! sequences, X10 mouse reports and UTF-8 characters.

use alloc::vec::Vec;
use hal::{TerminalDevice, TerminalError};
use tracing::{debug, trace};

use crate::buffer::Position;
use crate::key::{self, Command, Key};

const ESC: u8 = 0x1b;

/// Longest escape sequence accumulated before it is dropped
pub const MAX_SEQUENCE: usize = 32;

/// X10 mouse reports add this to button and coordinates
const MOUSE_OFFSET: u8 = 33;

const WHEEL_UP: u8 = 0x60;
const WHEEL_DOWN: u8 = 0x61;

/// Stateful key decoder
///
/// The position of the most recent mouse click is kept as side state and
/// read back with [`KeyDecoder::mouse`] after a [`Command::Mouse`] key.
#[derive(Debug, Clone, Default)]
pub struct KeyDecoder {
    mouse: Position,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen position (row, column) of the last mouse report
    pub fn mouse(&self) -> Position {
        self.mouse
    }

    /// Blocks until one key is decoded.
    ///
    /// A resize interrupting the read yields [`Command::Redraw`], dropping
    /// any partially read sequence. Unknown escape sequences and invalid
    /// UTF-8 are discarded without producing a key. Other device errors
    /// are returned.
    pub fn next_key<T: TerminalDevice + ?Sized>(
        &mut self,
        term: &mut T,
    ) -> Result<Key, TerminalError> {
        loop {
            match self.decode(term) {
                Ok(Some(key)) => return Ok(key),
                Ok(None) => continue,
                Err(TerminalError::Interrupted) => {
                    debug!("input interrupted by resize");
                    return Ok(Key::Command(Command::Redraw));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn decode<T: TerminalDevice + ?Sized>(
        &mut self,
        term: &mut T,
    ) -> Result<Option<Key>, TerminalError> {
        let first = term.read_byte()?;
        let mut sequence = Vec::with_capacity(8);
        sequence.push(first);

        if first == ESC {
            loop {
                if sequence.len() >= MAX_SEQUENCE {
                    debug!(len = sequence.len(), "dropping overlong escape sequence");
                    return Ok(None);
                }
                let byte = term.read_byte()?;
                sequence.push(byte);
                if is_terminator(byte) {
                    break;
                }
            }
        }

        match key::lookup(&sequence) {
            Some(Command::Mouse) => self.read_mouse(term).map(Some),
            Some(cmd) => Ok(Some(Key::Command(cmd))),
            None if sequence.len() == 1 => read_char(first, term),
            None => {
                debug!(?sequence, "discarding unknown escape sequence");
                Ok(None)
            }
        }
    }

    fn read_mouse<T: TerminalDevice + ?Sized>(
        &mut self,
        term: &mut T,
    ) -> Result<Key, TerminalError> {
        let flags = term.read_byte()?;
        let x = term.read_byte()?;
        let y = term.read_byte()?;
        self.mouse = Position::new(
            usize::from(y.saturating_sub(MOUSE_OFFSET)),
            usize::from(x.saturating_sub(MOUSE_OFFSET)),
        );
        trace!(flags, row = self.mouse.row, col = self.mouse.col, "mouse report");

        Ok(Key::Command(match flags {
            WHEEL_DOWN => Command::ScrollDown,
            WHEEL_UP => Command::ScrollUp,
            _ => Command::Mouse,
        }))
    }
}

/// Escape sequences end in `~` or a letter other than the SS3 `O`
fn is_terminator(byte: u8) -> bool {
    byte == b'~' || (byte.is_ascii_alphabetic() && byte != b'O')
}

/// Decodes an unmapped byte, reading continuation bytes for UTF-8
fn read_char<T: TerminalDevice + ?Sized>(
    first: u8,
    term: &mut T,
) -> Result<Option<Key>, TerminalError> {
    if first < 0x80 {
        return Ok(Some(Key::Char(char::from(first))));
    }

    let width = match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => {
            debug!(byte = first, "discarding stray UTF-8 continuation byte");
            return Ok(None);
        }
    };

    let mut bytes = [first, 0, 0, 0];
    for slot in bytes.iter_mut().take(width).skip(1) {
        *slot = term.read_byte()?;
    }

    match core::str::from_utf8(&bytes[..width]) {
        Ok(text) => Ok(text.chars().next().map(Key::Char)),
        Err(_) => {
            debug!(bytes = ?&bytes[..width], "discarding invalid UTF-8 input");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use hal::MemoryTerminal;

    fn decode_all(input: &[u8]) -> Vec<Key> {
        let mut term = MemoryTerminal::new().with_input(input);
        let mut decoder = KeyDecoder::new();
        let mut keys = Vec::new();
        while let Ok(key) = decoder.next_key(&mut term) {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn test_plain_characters() {
        assert_eq!(decode_all(b"ab "), vec![Key::Char('a'), Key::Char('b'), Key::Char(' ')]);
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(
            decode_all(b"\x11\r\x7f"),
            vec![
                Key::Command(Command::Quit),
                Key::Command(Command::Enter),
                Key::Command(Command::Backspace),
            ]
        );
    }

    #[test]
    fn test_unmapped_control_byte_is_char() {
        assert_eq!(decode_all(b"\x00"), vec![Key::Char('\0')]);
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(
            decode_all(b"\x1b[A\x1bOH\x1b[3~\x1b[1;5F"),
            vec![
                Key::Command(Command::Up),
                Key::Command(Command::Home),
                Key::Command(Command::Delete),
                Key::Command(Command::Last),
            ]
        );
    }

    #[test]
    fn test_unknown_sequence_is_discarded() {
        assert_eq!(
            decode_all(b"\x1b[99~x\x1b[Qy"),
            vec![Key::Char('x'), Key::Char('y')]
        );
    }

    #[test]
    fn test_overlong_sequence_is_dropped() {
        let mut input = vec![ESC];
        input.extend(core::iter::repeat(b'1').take(MAX_SEQUENCE * 2));
        input.push(b'z');
        let keys = decode_all(&input);
        // The tail of the runaway sequence decodes as plain characters
        assert_eq!(keys.last(), Some(&Key::Char('z')));
        assert!(keys.iter().all(|k| matches!(k, Key::Char('1') | Key::Char('z'))));
    }

    #[test]
    fn test_mouse_click_records_position() {
        let mut term = MemoryTerminal::new().with_input(b"\x1b[M\x20\x2a\x25");
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.next_key(&mut term), Ok(Key::Command(Command::Mouse)));
        assert_eq!(decoder.mouse(), Position::new(4, 9));
    }

    #[test]
    fn test_mouse_wheel() {
        assert_eq!(
            decode_all(b"\x1b[M\x61!!\x1b[M\x60!!"),
            vec![
                Key::Command(Command::ScrollDown),
                Key::Command(Command::ScrollUp),
            ]
        );
    }

    #[test]
    fn test_resize_yields_redraw() {
        let mut term = MemoryTerminal::new()
            .with_input(b"\x1b[")
            .with_resize()
            .with_input(b"a");
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.next_key(&mut term), Ok(Key::Command(Command::Redraw)));
        assert_eq!(decoder.next_key(&mut term), Ok(Key::Char('a')));
    }

    #[test]
    fn test_utf8_characters() {
        assert_eq!(
            decode_all("é€😀".as_bytes()),
            vec![Key::Char('é'), Key::Char('€'), Key::Char('😀')]
        );
    }

    #[test]
    fn test_invalid_utf8_is_discarded() {
        assert_eq!(decode_all(b"\x80\xc3\x28z"), vec![Key::Char('z')]);
    }

    #[test]
    fn test_eof_is_an_error() {
        let mut term = MemoryTerminal::new();
        assert_eq!(
            KeyDecoder::new().next_key(&mut term),
            Err(TerminalError::Eof)
        );
    }
}
