//! Mouse tracking control sequences.

/// Enable any-event tracking (1003) with SGR extended coordinates (1006).
pub const MOUSE_ON: &str = "\x1b[?1003h\x1b[?1006h";

/// Disable mouse tracking.
pub const MOUSE_OFF: &str = "\x1b[?1003l\x1b[?1006l";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_sequences() {
        assert!(MOUSE_ON.contains("1003h"), "Enable all mouse events");
        assert!(MOUSE_ON.contains("1006h"), "Enable SGR mouse format");
        assert!(MOUSE_OFF.contains("1003l"), "Disable all mouse events");
        assert!(MOUSE_OFF.contains("1006l"), "Disable SGR mouse format");
    }
}
