//! Terminal resize notifications

use std::io;

use mio::{Interest, Registry, Token};
use signal_hook::consts::SIGWINCH;
use signal_hook_mio::v1_0::Signals;
use tracing::debug;

/// `SIGWINCH` listener that can be polled alongside the tty
pub struct ResizeWatcher {
    signals: Signals,
}

impl ResizeWatcher {
    /// Installs the `SIGWINCH` handler
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            signals: Signals::new([SIGWINCH])?,
        })
    }

    /// Registers the signal pipe with a mio registry
    pub fn register(&mut self, registry: &Registry, token: Token) -> io::Result<()> {
        registry.register(&mut self.signals, token, Interest::READABLE)
    }

    /// Drains delivered signals. Returns true when a resize arrived since
    /// the last call.
    pub fn take_resize(&mut self) -> bool {
        let count = self
            .signals
            .pending()
            .filter(|&signal| signal == SIGWINCH)
            .count();
        if count > 0 {
            debug!(count, "terminal resized");
        }
        count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raised_sigwinch_is_reported_once() {
        let mut watcher = ResizeWatcher::new().unwrap();
        assert!(!watcher.take_resize());

        signal_hook::low_level::raise(SIGWINCH).unwrap();
        assert!(watcher.take_resize());
        assert!(!watcher.take_resize());
    }
}
