//! Raw mode switching through termios

use rustix::fd::AsFd;
use rustix::io;
use rustix::termios::{self, OptionalActions, Termios};
use tracing::debug;

/// Saved terminal attributes for one raw-mode scope
///
/// `enter` remembers the attributes it replaced and `leave` puts them back.
/// Both are idempotent.
#[derive(Debug, Default)]
pub struct RawMode {
    saved: Option<Termios>,
}

impl RawMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether raw mode is currently in effect
    pub fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Switches `fd` to raw mode: no line buffering, no echo, no signal keys
    pub fn enter<Fd: AsFd>(&mut self, fd: Fd) -> io::Result<()> {
        if self.saved.is_some() {
            return Ok(());
        }
        let original = termios::tcgetattr(&fd)?;
        let mut raw = original.clone();
        raw.make_raw();
        termios::tcsetattr(&fd, OptionalActions::Now, &raw)?;
        self.saved = Some(original);
        debug!("raw mode entered");
        Ok(())
    }

    /// Restores the attributes saved by `enter`
    pub fn leave<Fd: AsFd>(&mut self, fd: Fd) -> io::Result<()> {
        let Some(original) = self.saved.take() else {
            return Ok(());
        };
        termios::tcsetattr(&fd, OptionalActions::Now, &original)?;
        debug!("raw mode left");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_leave_without_enter_is_noop() {
        let null = File::open("/dev/null").unwrap();
        let mut raw = RawMode::new();
        assert!(raw.leave(&null).is_ok());
        assert!(!raw.is_active());
    }

    #[test]
    fn test_enter_fails_on_non_tty() {
        let null = File::open("/dev/null").unwrap();
        let mut raw = RawMode::new();
        assert_eq!(raw.enter(&null), Err(io::Errno::NOTTY));
        assert!(!raw.is_active());
    }
}
