//! Controlling-terminal device
//!
//! ## Input
//!
//! `/dev/tty` is opened non-blocking and registered with a [`mio::Poll`]
//! together with the `SIGWINCH` pipe of an optional [`ResizeWatcher`]. A read drains everything the tty has
//! buffered, then hands bytes out one at a time. When a resize arrives and no
//! input is buffered, the read returns [`TerminalError::Interrupted`].
//!
//! ## Output
//!
//! Frames are written to stdout and flushed immediately.

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};

use hal::{TerminalDevice, TerminalError};
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use rustix::fs::{self, Mode, OFlags};
use rustix::io::Errno;
use tracing::{debug, warn};

use crate::raw_mode::RawMode;
use crate::resize::ResizeWatcher;

const TTY_PATH: &str = "/dev/tty";
const TTY: Token = Token(0);
const RESIZE: Token = Token(1);
const READ_CHUNK: usize = 256;

fn io_error(err: impl Display) -> TerminalError {
    TerminalError::Io(err.to_string())
}

/// The process's controlling terminal
pub struct PosixTerminal {
    tty: OwnedFd,
    poll: Poll,
    events: Events,
    resize: Option<ResizeWatcher>,
    raw: RawMode,
    pending: VecDeque<u8>,
    resized: bool,
    closed: bool,
}

impl PosixTerminal {
    /// Opens the controlling terminal.
    ///
    /// With a `resize` watcher, a blocked read is interrupted when the
    /// terminal changes size. Without one, reads only ever return input.
    pub fn open(mut resize: Option<ResizeWatcher>) -> Result<Self, TerminalError> {
        let tty = fs::open(
            TTY_PATH,
            OFlags::RDWR | OFlags::NONBLOCK | OFlags::NOCTTY | OFlags::CLOEXEC,
            Mode::empty(),
        )
        .map_err(io_error)?;

        let poll = Poll::new().map_err(io_error)?;
        poll.registry()
            .register(&mut SourceFd(&tty.as_raw_fd()), TTY, Interest::READABLE)
            .map_err(io_error)?;

        if let Some(watcher) = resize.as_mut() {
            watcher.register(poll.registry(), RESIZE).map_err(io_error)?;
        }

        debug!(path = TTY_PATH, resize = resize.is_some(), "terminal opened");
        Ok(Self {
            tty,
            poll,
            events: Events::with_capacity(8),
            resize,
            raw: RawMode::new(),
            pending: VecDeque::new(),
            resized: false,
            closed: false,
        })
    }

    /// Reads everything the tty has buffered without blocking
    fn drain_tty(&mut self) -> Result<(), TerminalError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match rustix::io::read(&self.tty, &mut chunk[..]) {
                Ok(0) => {
                    self.closed = true;
                    return Ok(());
                }
                Ok(n) => self.pending.extend(&chunk[..n]),
                Err(Errno::AGAIN) => return Ok(()),
                Err(Errno::INTR) => continue,
                Err(err) => return Err(io_error(err)),
            }
        }
    }

    /// Blocks until the tty or the resize pipe becomes readable
    fn wait(&mut self) -> Result<(), TerminalError> {
        loop {
            match self.poll.poll(&mut self.events, None) {
                Ok(()) => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(io_error(err)),
            }
        }

        let mut tty_ready = false;
        let mut resize_ready = false;
        for event in self.events.iter() {
            match event.token() {
                TTY => tty_ready = true,
                RESIZE => resize_ready = true,
                _ => {}
            }
        }

        if resize_ready {
            if let Some(watcher) = self.resize.as_mut() {
                self.resized |= watcher.take_resize();
            }
        }
        if tty_ready {
            self.drain_tty()?;
        }
        Ok(())
    }
}

impl TerminalDevice for PosixTerminal {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        if self.pending.is_empty() {
            // Registration only reports edges, so pick up anything already queued
            self.drain_tty()?;
        }
        loop {
            if let Some(byte) = self.pending.pop_front() {
                return Ok(byte);
            }
            if self.resized {
                self.resized = false;
                return Err(TerminalError::Interrupted);
            }
            if self.closed {
                return Err(TerminalError::Eof);
            }
            self.wait()?;
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        let mut out = io::stdout().lock();
        out.write_all(bytes).map_err(io_error)?;
        out.flush().map_err(io_error)
    }

    fn enter_raw_mode(&mut self) -> Result<(), TerminalError> {
        self.raw.enter(&self.tty).map_err(io_error)
    }

    fn leave_raw_mode(&mut self) -> Result<(), TerminalError> {
        self.raw.leave(&self.tty).map_err(io_error)
    }
}

impl Drop for PosixTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.raw.leave(&self.tty) {
            warn!(error = %err, "could not restore terminal mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "needs a controlling terminal"]
    fn test_open_and_toggle_raw_mode() {
        let mut term = PosixTerminal::open(Some(ResizeWatcher::new().unwrap())).unwrap();
        term.enter_raw_mode().unwrap();
        term.enter_raw_mode().unwrap();
        term.leave_raw_mode().unwrap();
        term.leave_raw_mode().unwrap();
    }

    #[test]
    fn test_io_error_keeps_message() {
        assert_eq!(
            io_error(Errno::NOTTY),
            TerminalError::Io(Errno::NOTTY.to_string())
        );
    }
}
