//! `opentui_mouse` - terminal mouse input for `OpenTUI`
//!
//! Decodes SGR and legacy mouse reports from a raw terminal stream,
//! synthesizes clicks, and dispatches events to the UI elements under the
//! pointer with enter/leave hover tracking.
//!
//! ```no_run
//! use opentui_mouse::{ElementId, EventType, MouseSession, Rect, SessionOptions};
//!
//! let layout = |_: ElementId| Some(Rect::new(1, 1, 20, 3));
//! let mut session = MouseSession::stdio(layout, SessionOptions::default());
//! let button = session.mount();
//! session.on(button, EventType::Click, |e| println!("clicked at {},{}", e.x, e.y));
//! session.enable()?;
//! loop {
//!     session.pump()?;
//! }
//! # Ok::<(), opentui_mouse::Error>(())
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional index casts
#![allow(clippy::module_name_repetitions)] // Allow MouseEvent in input etc
#![allow(clippy::struct_excessive_bools)] // Modifier flags are plain bools
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod bus;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod session;
pub mod stream;
pub mod terminal;

// Re-export core types at crate root
pub use diagnostics::{LogLevel, clear_log_callback, emit_log, set_log_callback};
pub use error::{Error, Result};

// Re-export input types
pub use input::{
    ClickTracker, MouseAction, MouseButton, MouseDecoder, MouseEvent, Position, Protocol, decode,
};

// Re-export dispatch types
pub use dispatch::{
    DispatchStats, Dispatcher, ElementId, EntryId, EventType, Geometry, PropValue, Rect,
    ValidationMode,
};

// Re-export session and consumer types
pub use bus::{EventBus, SubscriptionId};
pub use session::{MouseSession, SessionOptions, SessionState};
pub use stream::{
    CancellationToken, EventStream, Overflow, StreamOptions, wait_for, wait_for_event,
};
pub use terminal::{InputChannel, MOUSE_OFF, MOUSE_ON, StdinChannel};
