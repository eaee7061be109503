//! Terminal device abstraction
//!
//! This module defines the byte-level capability every host environment
//! must provide to run an editor session: a blocking byte source, a byte
//! sink, and raw-mode control.
//!
//! ## Philosophy
//!
//! - **Bytes in, bytes out**: The device knows nothing about keys or screens
//! - **Resize is an event, not an error**: An interrupted read surfaces as
//!   [`TerminalError::Interrupted`] so the editor can redraw
//! - **Testable**: [`MemoryTerminal`] replays scripted input and records output
//!
//! ## Design
//!
//! Each host (POSIX tty, UART, USB serial, in-memory stream) supplies one
//! implementation. The editor core never branches on platform identity.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

/// Errors reported by a terminal device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminalError {
    /// A blocking read was interrupted by a terminal-resize notification
    #[error("read interrupted by terminal resize")]
    Interrupted,

    /// The input side of the device is closed
    #[error("end of input")]
    Eof,

    /// Underlying I/O failure
    #[error("terminal I/O error: {0}")]
    Io(String),

    /// Operation not available on this device
    #[error("operation not supported by this terminal")]
    Unsupported,
}

/// Terminal device trait
///
/// ## Implementation Notes
///
/// - **Blocking**: `read_byte()` waits until a byte is available
/// - **Interruptible**: A resize notification delivered while blocked must
///   make `read_byte()` return `Err(TerminalError::Interrupted)`
/// - **Scoped raw mode**: `leave_raw_mode()` must restore whatever
///   `enter_raw_mode()` changed, and must be safe to call twice
pub trait TerminalDevice {
    /// Reads one byte, blocking until input is available.
    fn read_byte(&mut self) -> Result<u8, TerminalError>;

    /// Writes all of `bytes` to the terminal.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TerminalError>;

    /// Switches the device into raw (unbuffered, no echo) mode.
    fn enter_raw_mode(&mut self) -> Result<(), TerminalError>;

    /// Restores the device mode saved by `enter_raw_mode()`.
    fn leave_raw_mode(&mut self) -> Result<(), TerminalError>;
}

impl<T: TerminalDevice + ?Sized> TerminalDevice for &mut T {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        (**self).write_bytes(bytes)
    }

    fn enter_raw_mode(&mut self) -> Result<(), TerminalError> {
        (**self).enter_raw_mode()
    }

    fn leave_raw_mode(&mut self) -> Result<(), TerminalError> {
        (**self).leave_raw_mode()
    }
}

/// One scripted input item for [`MemoryTerminal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A byte delivered by the device
    Byte(u8),
    /// A resize notification delivered while the reader is blocked
    Resize,
}

/// Cursor-position query written by editors to learn the screen size
const SIZE_QUERY: &[u8] = b"\x1b[6n";

/// In-memory terminal
///
/// Replays a script of input bytes and resize events, and records every
/// byte written. When a screen size is configured, it answers the
/// cursor-position query (`ESC[6n`) the way a real terminal does after the
/// cursor was parked in the bottom-right corner.
#[derive(Debug, Clone, Default)]
pub struct MemoryTerminal {
    input: VecDeque<ScriptedInput>,
    output: Vec<u8>,
    size: Option<(u16, u16)>,
    raw: bool,
    raw_transitions: usize,
}

impl MemoryTerminal {
    /// Creates an empty terminal with no screen size
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the screen size reported for size queries
    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.size = Some((rows, cols));
        self
    }

    /// Appends raw input bytes to the script
    pub fn with_input(mut self, bytes: &[u8]) -> Self {
        self.push_input(bytes);
        self
    }

    /// Appends a resize notification to the script
    pub fn with_resize(mut self) -> Self {
        self.input.push_back(ScriptedInput::Resize);
        self
    }

    /// Appends raw input bytes to the script
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input
            .extend(bytes.iter().copied().map(ScriptedInput::Byte));
    }

    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Whether the device is currently in raw mode
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Number of enter/leave raw-mode calls that changed the mode
    pub fn raw_transitions(&self) -> usize {
        self.raw_transitions
    }

    /// Number of scripted input items not yet consumed
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    fn answer_size_query(&mut self) {
        let Some((rows, cols)) = self.size else {
            return;
        };
        let reply = alloc::format!("\x1b[{};{}R", rows, cols);
        for byte in reply.bytes().rev() {
            self.input.push_front(ScriptedInput::Byte(byte));
        }
    }
}

impl TerminalDevice for MemoryTerminal {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        match self.input.pop_front() {
            Some(ScriptedInput::Byte(byte)) => Ok(byte),
            Some(ScriptedInput::Resize) => Err(TerminalError::Interrupted),
            None => Err(TerminalError::Eof),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        self.output.extend_from_slice(bytes);
        if bytes.windows(SIZE_QUERY.len()).any(|w| w == SIZE_QUERY) {
            self.answer_size_query();
        }
        Ok(())
    }

    fn enter_raw_mode(&mut self) -> Result<(), TerminalError> {
        if !self.raw {
            self.raw = true;
            self.raw_transitions += 1;
        }
        Ok(())
    }

    fn leave_raw_mode(&mut self) -> Result<(), TerminalError> {
        if self.raw {
            self.raw = false;
            self.raw_transitions += 1;
        }
        Ok(())
    }
}
