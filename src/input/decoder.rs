//! Mouse protocol decoder.
//!
//! Turns raw terminal input into [`MouseEvent`]s. Supports:
//! - SGR mouse encoding (1006): `ESC [ < Cb ; Cx ; Cy M` / `m`
//! - Legacy X10/X11 mouse encoding: `ESC [ M b0 b1 b2`
//!
//! Anything else in the stream (keys, unrelated CSI sequences, garbage) is
//! skipped silently. [`MouseDecoder`] keeps an incomplete trailing sequence
//! so a report split across two reads still decodes.

use bitflags::bitflags;

use crate::diagnostics::{LogLevel, emit_log};
use crate::input::event::{MouseAction, MouseButton, MouseEvent, Protocol};

/// Prefix of an SGR mouse report.
pub const SGR_PREFIX: &[u8] = b"\x1b[<";

/// Prefix of a legacy mouse report.
pub const ESC_PREFIX: &[u8] = b"\x1b[M";

/// Longest parameter run accepted between `ESC [ <` and the terminator.
const MAX_SGR_PARAMS: usize = 32;

/// Upper bound for bytes carried over between reads: an SGR prefix plus a
/// full parameter run. Longer runs are framed as malformed.
pub const MAX_PENDING_BYTES: usize = SGR_PREFIX.len() + MAX_SGR_PARAMS;

bitflags! {
    /// Flag bits of a mouse button code. The two low bits are the button
    /// index and are not flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ButtonCode: u32 {
        const SHIFT = 0b0000_0100;
        const ALT = 0b0000_1000;
        const CTRL = 0b0001_0000;
        const MOTION = 0b0010_0000;
        const WHEEL = 0b0100_0000;
        /// Extended buttons 8-11. Not reported as mouse events.
        const EXTENDED = 0b1000_0000;
    }
}

const BUTTON_INDEX_MASK: u32 = 0b0000_0011;

/// Decode the first complete mouse report found in `buffer`.
///
/// Returns `None` when the buffer holds no recognizable report. This is not
/// an error: partial reads and non-mouse input are expected in the stream.
#[must_use]
pub fn decode(buffer: &[u8]) -> Option<MouseEvent> {
    let mut decoder = MouseDecoder::new();
    let mut pos = 0;
    loop {
        match scan(buffer, pos) {
            Frame::Report(report) => {
                pos = report.end;
                if let Some(event) = decoder.interpret(report) {
                    return Some(event);
                }
            }
            Frame::Malformed { resume } => pos = resume,
            Frame::Incomplete { .. } | Frame::Exhausted => return None,
        }
    }
}

/// Stateful decoder for a stream of terminal input chunks.
#[derive(Clone, Debug, Default)]
pub struct MouseDecoder {
    /// Bytes of an incomplete report carried over from the previous chunk.
    pending: Vec<u8>,
    /// Button of the last legacy press; legacy releases do not carry it.
    legacy_held: Option<MouseButton>,
}

impl MouseDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of input and return every report completed by it, in
    /// stream order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<MouseEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut pos = 0;
        let keep_from = loop {
            match scan(&self.pending, pos) {
                Frame::Report(report) => {
                    pos = report.end;
                    if let Some(event) = self.interpret(report) {
                        events.push(event);
                    }
                }
                Frame::Malformed { resume } => pos = resume,
                Frame::Incomplete { start } => break start,
                Frame::Exhausted => break self.pending.len(),
            }
        };
        self.pending.drain(..keep_from);
        debug_assert!(self.pending.len() <= MAX_PENDING_BYTES);

        events
    }

    /// Bytes currently carried over, waiting for the rest of a report.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Clear any buffered state.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.legacy_held = None;
    }

    /// Turn a framed report into an event, or `None` for codes that do not
    /// describe a reportable mouse event.
    fn interpret(&mut self, report: Report) -> Option<MouseEvent> {
        let code = ButtonCode::from_bits_truncate(report.cb);
        let index = report.cb & BUTTON_INDEX_MASK;

        if code.contains(ButtonCode::EXTENDED) {
            emit_log(
                LogLevel::Debug,
                &format!("ignoring extended mouse button code {}", report.cb),
            );
            return None;
        }

        let (button, action) = if code.contains(ButtonCode::WHEEL) {
            (wheel_button(index), MouseAction::Wheel)
        } else if code.contains(ButtonCode::MOTION) {
            match held_button(index) {
                Some(button) => (button, MouseAction::Drag),
                None => (MouseButton::None, MouseAction::Move),
            }
        } else {
            match (report.terminator, held_button(index)) {
                (Terminator::Press, Some(button)) => {
                    if report.protocol == Protocol::Esc {
                        self.legacy_held = Some(button);
                    }
                    (button, MouseAction::Press)
                }
                (Terminator::Release, Some(button)) => (button, MouseAction::Release),
                (Terminator::Press, None) if report.protocol == Protocol::Esc => {
                    // Legacy release: index 3, button taken from the last press.
                    let button = self.legacy_held.take()?;
                    (button, MouseAction::Release)
                }
                _ => return None,
            }
        };

        let event = MouseEvent::new(report.x, report.y, button, action)
            .with_modifiers(
                code.contains(ButtonCode::SHIFT),
                code.contains(ButtonCode::ALT),
                code.contains(ButtonCode::CTRL),
            )
            .with_raw(report.cb, report.data, report.protocol);
        Some(event)
    }
}

/// Map the button index of a non-wheel code. Index 3 means "no button".
fn held_button(index: u32) -> Option<MouseButton> {
    match index {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

fn wheel_button(index: u32) -> MouseButton {
    match index {
        0 => MouseButton::WheelUp,
        1 => MouseButton::WheelDown,
        2 => MouseButton::WheelLeft,
        _ => MouseButton::WheelRight,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Terminator {
    /// SGR `M`, or any legacy report.
    Press,
    /// SGR `m`.
    Release,
}

/// A syntactically complete report, not yet interpreted.
#[derive(Clone, Debug)]
struct Report {
    protocol: Protocol,
    cb: u32,
    x: u32,
    y: u32,
    terminator: Terminator,
    data: String,
    end: usize,
}

#[derive(Clone, Debug)]
enum Frame {
    /// A complete report ending at `report.end`.
    Report(Report),
    /// A prefix was found but the bytes after it are not a valid report.
    /// Scanning continues at `resume`.
    Malformed { resume: usize },
    /// A report (or possible prefix) starts at `start` but is cut off.
    Incomplete { start: usize },
    /// No prefix left in the input.
    Exhausted,
}

/// Find the next mouse report at or after `from`.
fn scan(input: &[u8], from: usize) -> Frame {
    let mut i = from;
    while i < input.len() {
        if input[i] != 0x1b {
            i += 1;
            continue;
        }
        let rest = &input[i..];
        if rest.starts_with(SGR_PREFIX) {
            return scan_sgr(input, i);
        }
        if rest.starts_with(ESC_PREFIX) {
            return scan_legacy(input, i);
        }
        if SGR_PREFIX.starts_with(rest) || ESC_PREFIX.starts_with(rest) {
            // ESC or ESC [ at the very end of the input
            return Frame::Incomplete { start: i };
        }
        i += 1;
    }
    Frame::Exhausted
}

/// Frame an SGR report whose prefix starts at `start`.
fn scan_sgr(input: &[u8], start: usize) -> Frame {
    let params_start = start + SGR_PREFIX.len();
    let mut end = params_start;
    while end < input.len() {
        let b = input[end];
        if b == b'M' || b == b'm' {
            break;
        }
        if !(b.is_ascii_digit() || b == b';') {
            return Frame::Malformed { resume: end };
        }
        if end - params_start >= MAX_SGR_PARAMS {
            return Frame::Malformed { resume: params_start };
        }
        end += 1;
    }

    if end >= input.len() {
        return Frame::Incomplete { start };
    }

    let terminator = if input[end] == b'm' {
        Terminator::Release
    } else {
        Terminator::Press
    };

    let Some([cb, x, y]) = parse_params(&input[params_start..end]) else {
        return Frame::Malformed { resume: end + 1 };
    };
    if x == 0 || y == 0 {
        return Frame::Malformed { resume: end + 1 };
    }

    Frame::Report(Report {
        protocol: Protocol::Sgr,
        cb,
        x,
        y,
        terminator,
        data: String::from_utf8_lossy(&input[start..=end]).into_owned(),
        end: end + 1,
    })
}

/// Parse exactly three `;`-separated unsigned integers.
fn parse_params(params: &[u8]) -> Option<[u32; 3]> {
    // Only ASCII digits and ';' reach here
    let s = std::str::from_utf8(params).ok()?;
    let mut parts = s.split(';');
    let mut values = [0u32; 3];
    for value in &mut values {
        *value = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(values)
}

/// Frame a legacy report whose prefix starts at `start`.
///
/// Each field is a single byte offset by 32, and coordinates are 1-indexed
/// after removing the offset.
fn scan_legacy(input: &[u8], start: usize) -> Frame {
    let fields = start + ESC_PREFIX.len();
    let end = fields + 3;
    if input.len() < end {
        return Frame::Incomplete { start };
    }

    let (b0, b1, b2) = (input[fields], input[fields + 1], input[fields + 2]);
    if b0 < 32 || b1 <= 32 || b2 <= 32 {
        return Frame::Malformed { resume: fields };
    }

    Frame::Report(Report {
        protocol: Protocol::Esc,
        cb: u32::from(b0 - 32),
        x: u32::from(b1 - 32),
        y: u32::from(b2 - 32),
        terminator: Terminator::Press,
        data: String::from_utf8_lossy(&input[start..end]).into_owned(),
        end,
    })
}
