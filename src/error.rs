//! Error types for opentui_mouse.

use std::fmt;
use std::io;

/// Result type alias for mouse session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mouse session operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal operations.
    Io(io::Error),
    /// The input channel is not an interactive terminal.
    NotATerminal,
    /// The session was destroyed and cannot be enabled again.
    Destroyed,
    /// A wait was cancelled through a cancellation token.
    Cancelled,
    /// A wait exceeded its deadline.
    TimedOut,
    /// The event source went away (listener removed by the bus).
    Closed,
}

impl Error {
    /// Whether this error means the caller gave up waiting rather than
    /// something breaking.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::NotATerminal => write!(f, "input is not an interactive terminal"),
            Self::Destroyed => write!(f, "mouse session has been destroyed"),
            Self::Cancelled => write!(f, "wait for mouse event was cancelled"),
            Self::TimedOut => write!(f, "timed out waiting for mouse event"),
            Self::Closed => write!(f, "mouse event source closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
