//! Handler registration types.

use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::input::{MouseAction, MouseButton, MouseEvent};

/// Environment variable selecting the handler validation mode.
pub const VALIDATION_ENV: &str = "OPENTUI_MOUSE_ENV";

/// A mouse handler.
pub type MouseHandler = Rc<dyn Fn(&MouseEvent)>;

/// The kind of event a handler is registered for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    MouseEnter,
    MouseLeave,
    MousePress,
    MouseRelease,
    MouseMove,
    MouseDrag,
    Wheel,
}

impl EventType {
    /// All event types.
    pub const ALL: [Self; 8] = [
        Self::Click,
        Self::MouseEnter,
        Self::MouseLeave,
        Self::MousePress,
        Self::MouseRelease,
        Self::MouseMove,
        Self::MouseDrag,
        Self::Wheel,
    ];

    /// Prop name of the event type, as UI elements spell it.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseEnter => "mouseEnter",
            Self::MouseLeave => "mouseLeave",
            Self::MousePress => "mousePress",
            Self::MouseRelease => "mouseRelease",
            Self::MouseMove => "mouseMove",
            Self::MouseDrag => "mouseDrag",
            Self::Wheel => "wheel",
        }
    }

    /// Parse a prop name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Point event type fired for a decoded action. Move-class types
    /// (`MouseMove`, `MouseEnter`, `MouseLeave`) are handled separately.
    #[must_use]
    pub fn for_action(action: MouseAction) -> Option<Self> {
        match action {
            MouseAction::Click => Some(Self::Click),
            MouseAction::Wheel => Some(Self::Wheel),
            MouseAction::Press => Some(Self::MousePress),
            MouseAction::Release => Some(Self::MouseRelease),
            MouseAction::Drag => Some(Self::MouseDrag),
            MouseAction::Move => None,
        }
    }

    /// Whether this type is resolved in the hover pass.
    #[must_use]
    pub fn is_move_class(self) -> bool {
        matches!(self, Self::MouseMove | Self::MouseEnter | Self::MouseLeave)
    }

    /// Synthetic event used to probe handlers in development mode.
    #[must_use]
    pub fn probe_event(self) -> MouseEvent {
        match self {
            Self::Click => MouseEvent::new(1, 1, MouseButton::Left, MouseAction::Click),
            Self::MousePress => MouseEvent::press(1, 1, MouseButton::Left),
            Self::MouseRelease => MouseEvent::release(1, 1, MouseButton::Left),
            Self::MouseDrag => MouseEvent::drag(1, 1, MouseButton::Left),
            Self::Wheel => MouseEvent::wheel(1, 1, MouseButton::WheelUp),
            Self::MouseMove | Self::MouseEnter | Self::MouseLeave => MouseEvent::move_to(1, 1),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value found in an element's event prop.
///
/// Element props are loosely typed: a host may hand over whatever was
/// attached under an event name. Only [`PropValue::Handler`] is callable;
/// everything else is reported and skipped at dispatch.
#[derive(Clone)]
pub enum PropValue {
    Handler(MouseHandler),
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl PropValue {
    /// Wrap a closure.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&MouseEvent) + 'static,
    {
        Self::Handler(Rc::new(f))
    }

    /// The callable, if this value is one.
    #[must_use]
    pub fn as_handler(&self) -> Option<&MouseHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Name of the value's kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Handler(_) => "function",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Null => "null",
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Number(n) => write!(f, "Number({n})"),
            Self::Text(s) => write!(f, "Text({s:?})"),
            Self::Null => f.write_str("Null"),
        }
    }
}

impl From<MouseHandler> for PropValue {
    fn from(handler: MouseHandler) -> Self {
        Self::Handler(handler)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Self>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// How strictly handlers are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Check callability at dispatch only.
    #[default]
    Production,
    /// Additionally run each handler once with a synthetic event at
    /// registration; handlers that panic are rejected. A debug aid: the
    /// handler really executes during the probe.
    Development,
}

impl ValidationMode {
    /// Read the mode from [`VALIDATION_ENV`]. Anything other than
    /// `development`/`dev` selects production.
    #[must_use]
    pub fn from_env() -> Self {
        env::var(VALIDATION_ENV)
            .ok()
            .map_or(Self::Production, |v| Self::parse(&v))
    }

    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }
}

/// Run `handler` once with the probe event for `event_type`. Returns `false`
/// if it panicked.
pub(crate) fn probe(handler: &MouseHandler, event_type: EventType) -> bool {
    let event = event_type.probe_event();
    panic::catch_unwind(AssertUnwindSafe(|| handler(&event))).is_ok()
}
