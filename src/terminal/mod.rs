//! Terminal input channel.
//!
//! The session never touches termios directly; it drives an
//! [`InputChannel`]. [`StdinChannel`] is the real implementation, tests use
//! in-memory ones.

mod raw;
pub mod sequences;

pub use raw::{RawModeGuard, enable_utf8, is_raw, is_tty};
pub use sequences::{MOUSE_OFF, MOUSE_ON};

use std::io::{self, Read};

/// Byte source the session reads mouse reports from.
pub trait InputChannel {
    /// Whether the channel is attached to a terminal.
    fn is_terminal(&self) -> bool;

    /// Whether the terminal is currently in raw mode.
    fn is_raw_mode(&self) -> bool;

    /// Enter (`true`) or leave (`false`) raw mode.
    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()>;

    /// Switch the channel to UTF-8 decoding.
    fn enable_utf8(&mut self) -> io::Result<()>;

    /// Start delivering data.
    fn resume(&mut self) -> io::Result<()>;

    /// Stop delivering data.
    fn suspend(&mut self) -> io::Result<()>;

    /// Whether the channel is suspended.
    fn is_suspended(&self) -> bool;

    /// Read available bytes into `buf`. Returns `Ok(0)` when nothing arrived
    /// or the channel is suspended.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Process stdin as an input channel.
#[derive(Debug)]
pub struct StdinChannel {
    stdin: io::Stdin,
    raw_guard: Option<RawModeGuard>,
    suspended: bool,
}

impl Default for StdinChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinChannel {
    /// Wrap the process stdin. The channel starts suspended.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            raw_guard: None,
            suspended: true,
        }
    }
}

impl InputChannel for StdinChannel {
    fn is_terminal(&self) -> bool {
        is_tty(&self.stdin)
    }

    fn is_raw_mode(&self) -> bool {
        self.raw_guard.is_some() || is_raw(&self.stdin)
    }

    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()> {
        if raw {
            if self.raw_guard.is_none() && !is_raw(&self.stdin) {
                self.raw_guard = Some(RawModeGuard::new(&self.stdin)?);
            }
        } else if let Some(guard) = self.raw_guard.take() {
            guard.restore()?;
        }
        Ok(())
    }

    fn enable_utf8(&mut self) -> io::Result<()> {
        enable_utf8(&self.stdin)
    }

    fn resume(&mut self) -> io::Result<()> {
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.suspended = true;
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.suspended {
            return Ok(0);
        }
        match self.stdin.lock().read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_channel_starts_suspended() {
        let mut channel = StdinChannel::new();
        assert!(channel.is_suspended());
        let mut buf = [0u8; 8];
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 0);

        channel.resume().unwrap();
        assert!(!channel.is_suspended());
        channel.suspend().unwrap();
        assert!(channel.is_suspended());
    }

    #[test]
    fn test_leaving_raw_mode_without_guard_is_noop() {
        let mut channel = StdinChannel::new();
        assert!(channel.set_raw_mode(false).is_ok());
    }
}
