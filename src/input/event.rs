//! Mouse event types.

use std::fmt;

/// Mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Right,
    /// No button (plain motion).
    None,
    /// Wheel scrolled up.
    WheelUp,
    /// Wheel scrolled down.
    WheelDown,
    /// Wheel scrolled left (horizontal).
    WheelLeft,
    /// Wheel scrolled right (horizontal).
    WheelRight,
}

impl MouseButton {
    /// Check if this is one of the wheel directions.
    #[must_use]
    pub fn is_wheel(self) -> bool {
        matches!(
            self,
            Self::WheelUp | Self::WheelDown | Self::WheelLeft | Self::WheelRight
        )
    }

    /// Name used in diagnostics and traces.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
            Self::None => "none",
            Self::WheelUp => "wheel-up",
            Self::WheelDown => "wheel-down",
            Self::WheelLeft => "wheel-left",
            Self::WheelRight => "wheel-right",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// Button pressed.
    Press,
    /// Button released.
    Release,
    /// Press followed by a nearby release of the same button. Never decoded
    /// from the wire.
    Click,
    /// Motion with a button held.
    Drag,
    /// Motion with no button held.
    Move,
    /// Wheel scrolled.
    Wheel,
}

impl MouseAction {
    /// All actions, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Press,
        Self::Release,
        Self::Click,
        Self::Drag,
        Self::Move,
        Self::Wheel,
    ];

    /// Name used in diagnostics and traces.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Click => "click",
            Self::Drag => "drag",
            Self::Move => "move",
            Self::Wheel => "wheel",
        }
    }

    /// Check if the event carries a new pointer position (move or drag).
    #[must_use]
    pub fn is_motion(self) -> bool {
        matches!(self, Self::Move | Self::Drag)
    }
}

impl fmt::Display for MouseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire format an event was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// SGR extended reporting (`ESC [ < Cb ; Cx ; Cy M/m`).
    Sgr,
    /// Legacy X10/X11 reporting (`ESC [ M b0 b1 b2`).
    Esc,
}

/// A cell position, 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Position {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A mouse event.
///
/// Coordinates are 1-indexed terminal cells, exactly as reported on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MouseEvent {
    /// X position (column).
    pub x: u32,
    /// Y position (row).
    pub y: u32,
    /// Button involved.
    pub button: MouseButton,
    /// What happened.
    pub action: MouseAction,
    /// Shift key held.
    pub shift: bool,
    /// Alt (meta) key held.
    pub alt: bool,
    /// Control key held.
    pub ctrl: bool,
    /// Raw button code as reported by the terminal.
    pub raw: u32,
    /// The escape sequence the event was decoded from.
    pub data: String,
    /// Wire format.
    pub protocol: Protocol,
}

impl MouseEvent {
    /// Create a new SGR mouse event without modifiers or raw data.
    #[must_use]
    pub fn new(x: u32, y: u32, button: MouseButton, action: MouseAction) -> Self {
        Self {
            x,
            y,
            button,
            action,
            shift: false,
            alt: false,
            ctrl: false,
            raw: 0,
            data: String::new(),
            protocol: Protocol::Sgr,
        }
    }

    /// Create a press event.
    #[must_use]
    pub fn press(x: u32, y: u32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseAction::Press)
    }

    /// Create a release event.
    #[must_use]
    pub fn release(x: u32, y: u32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseAction::Release)
    }

    /// Create a move event.
    #[must_use]
    pub fn move_to(x: u32, y: u32) -> Self {
        Self::new(x, y, MouseButton::None, MouseAction::Move)
    }

    /// Create a drag event.
    #[must_use]
    pub fn drag(x: u32, y: u32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseAction::Drag)
    }

    /// Create a wheel event.
    #[must_use]
    pub fn wheel(x: u32, y: u32, button: MouseButton) -> Self {
        Self::new(x, y, button, MouseAction::Wheel)
    }

    /// Set modifier keys.
    #[must_use]
    pub fn with_modifiers(mut self, shift: bool, alt: bool, ctrl: bool) -> Self {
        self.shift = shift;
        self.alt = alt;
        self.ctrl = ctrl;
        self
    }

    /// Attach the raw button code and source sequence.
    #[must_use]
    pub fn with_raw(mut self, raw: u32, data: impl Into<String>, protocol: Protocol) -> Self {
        self.raw = raw;
        self.data = data.into();
        self.protocol = protocol;
        self
    }

    /// Derive the synthesized click for this release.
    #[must_use]
    pub(crate) fn to_click(&self, button: MouseButton) -> Self {
        Self {
            button,
            action: MouseAction::Click,
            ..self.clone()
        }
    }

    /// Pointer position of the event.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Check if the button/action pairing is one the decoder can produce
    /// (or the tracker can synthesize).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.x == 0 || self.y == 0 {
            return false;
        }
        match self.action {
            MouseAction::Wheel => self.button.is_wheel(),
            MouseAction::Move => self.button == MouseButton::None,
            _ => !self.button.is_wheel() && self.button != MouseButton::None,
        }
    }
}

impl fmt::Display for MouseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{},{})", self.action, self.x, self.y, self.button)
    }
}
