//! Mock input channel with observable terminal state.

use opentui_mouse::InputChannel;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// Observable state of the mock channel.
#[derive(Debug, Default)]
pub struct ChannelState {
    pub terminal: bool,
    pub raw: bool,
    pub utf8: bool,
    pub suspended: bool,
    pub fail_raw: bool,
    /// Chunks returned by successive reads.
    pub chunks: VecDeque<Vec<u8>>,
    /// Every call made on the channel, in order.
    pub calls: Vec<&'static str>,
}

/// In-memory input channel. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MockInput {
    state: Arc<Mutex<ChannelState>>,
}

impl MockInput {
    /// A suspended, cooked terminal.
    pub fn tty() -> Self {
        let input = Self::default();
        {
            let mut state = input.state();
            state.terminal = true;
            state.suspended = true;
        }
        input
    }

    /// A channel that is not a terminal (pipe, file).
    pub fn pipe() -> Self {
        Self::default()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap()
    }

    /// Queue a chunk for the next read.
    pub fn push_chunk(&self, bytes: &[u8]) {
        self.state().chunks.push_back(bytes.to_vec());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }
}

impl InputChannel for MockInput {
    fn is_terminal(&self) -> bool {
        self.state().terminal
    }

    fn is_raw_mode(&self) -> bool {
        self.state().raw
    }

    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()> {
        let mut state = self.state();
        state.calls.push(if raw { "raw_on" } else { "raw_off" });
        if state.fail_raw {
            return Err(io::Error::other("tcsetattr failed"));
        }
        state.raw = raw;
        Ok(())
    }

    fn enable_utf8(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.calls.push("utf8");
        state.utf8 = true;
        Ok(())
    }

    fn resume(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.calls.push("resume");
        state.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.calls.push("suspend");
        state.suspended = true;
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.state().suspended
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        let Some(chunk) = state.chunks.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            state.chunks.push_front(chunk[n..].to_vec());
        }
        Ok(n)
    }
}
