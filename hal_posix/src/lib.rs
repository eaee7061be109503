//! POSIX terminal implementation of the HAL
//!
//! This crate provides [`PosixTerminal`], a [`hal::TerminalDevice`] backed by
//! the controlling tty of the process:
//!
//! - Input is read from `/dev/tty`, so the editor works even when stdin is a pipe
//! - Output goes to stdout
//! - `SIGWINCH` interrupts a blocked read so the editor can re-query the size

pub mod raw_mode;
pub mod resize;
pub mod terminal;

pub use raw_mode::RawMode;
pub use resize::ResizeWatcher;
pub use terminal::PosixTerminal;
