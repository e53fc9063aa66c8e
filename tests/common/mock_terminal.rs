//! Mock output writer capturing the control sequences a session writes.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Output writer that records bytes. Clones share the buffer.
#[derive(Clone, Debug, Default)]
pub struct MockTerminal {
    /// Captured output bytes.
    output: Arc<Mutex<Vec<u8>>>,
    /// Whether writes should fail (for error simulation).
    write_disabled: Arc<Mutex<bool>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the captured output as a string (lossy UTF-8 conversion).
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output.lock().unwrap()).into_owned()
    }

    /// Make every following write fail with `BrokenPipe`.
    pub fn disable_writes(&self) {
        *self.write_disabled.lock().unwrap() = true;
    }

    pub fn enable_writes(&self) {
        *self.write_disabled.lock().unwrap() = false;
    }

    /// Count occurrences of a control sequence.
    pub fn count_sequence(&self, seq: &str) -> usize {
        self.output_str().matches(seq).count()
    }

    pub fn clear(&self) {
        self.output.lock().unwrap().clear();
    }
}

impl Write for MockTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if *self.write_disabled.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "writes disabled"));
        }
        self.output.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
