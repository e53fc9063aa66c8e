//! Mouse input decoding.
//!
//! This module turns raw terminal bytes into [`MouseEvent`]s and derives
//! clicks from press/release pairs. It supports SGR mouse encoding (1006)
//! and the legacy X10/X11 encoding.

mod decoder;
mod event;
mod tracker;

pub use decoder::{ButtonCode, ESC_PREFIX, MAX_PENDING_BYTES, MouseDecoder, SGR_PREFIX, decode};
pub use event::{MouseAction, MouseButton, MouseEvent, Position, Protocol};
pub use tracker::{ClickTracker, DEFAULT_CLICK_DISTANCE, PendingPress, Tracked};
