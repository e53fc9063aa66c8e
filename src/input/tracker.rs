//! Click synthesis and pointer position tracking.

use std::time::{Duration, Instant};

use crate::input::event::{MouseAction, MouseButton, MouseEvent, Position};

/// Default distance, in cells per axis, between press and release that still
/// counts as a click.
pub const DEFAULT_CLICK_DISTANCE: u32 = 1;

/// The press waiting for its release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingPress {
    pub x: u32,
    pub y: u32,
    pub button: MouseButton,
    pub pressed_at: Instant,
}

/// Output of [`ClickTracker::on_decoded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked {
    /// The decoded event, unchanged.
    pub primary: MouseEvent,
    /// A click synthesized from a press/release pair. Delivered right after
    /// `primary`.
    pub synthesized: Option<MouseEvent>,
}

impl Tracked {
    /// Iterate the events in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = &MouseEvent> {
        std::iter::once(&self.primary).chain(self.synthesized.as_ref())
    }

    /// Consume into the events in delivery order.
    #[must_use]
    pub fn into_events(self) -> Vec<MouseEvent> {
        let mut events = vec![self.primary];
        events.extend(self.synthesized);
        events
    }
}

/// Tracks the outstanding press and the last pointer position.
///
/// Only one press is tracked: a second press before any release replaces the
/// first.
#[derive(Clone, Debug)]
pub struct ClickTracker {
    threshold: u32,
    timeout: Option<Duration>,
    pending: Option<PendingPress>,
    last_position: Option<Position>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_DISTANCE)
    }
}

impl ClickTracker {
    /// Create a tracker with the given per-axis click distance.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            timeout: None,
            pending: None,
            last_position: None,
        }
    }

    /// Also require the release to follow the press within `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-axis click distance.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The press waiting for a release, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingPress> {
        self.pending.as_ref()
    }

    /// Last position seen on a move or drag.
    #[must_use]
    pub fn last_position(&self) -> Option<Position> {
        self.last_position
    }

    /// Process one decoded event.
    pub fn on_decoded(&mut self, event: MouseEvent, now: Instant) -> Tracked {
        let synthesized = match event.action {
            MouseAction::Press => {
                self.pending = Some(PendingPress {
                    x: event.x,
                    y: event.y,
                    button: event.button,
                    pressed_at: now,
                });
                None
            }
            MouseAction::Release => self
                .pending
                .take()
                .filter(|press| self.is_click(press, &event, now))
                .map(|press| event.to_click(press.button)),
            MouseAction::Move | MouseAction::Drag => {
                self.last_position = Some(event.position());
                None
            }
            MouseAction::Wheel | MouseAction::Click => None,
        };

        Tracked {
            primary: event,
            synthesized,
        }
    }

    fn is_click(&self, press: &PendingPress, release: &MouseEvent, now: Instant) -> bool {
        if press.button != release.button {
            return false;
        }
        if press.x.abs_diff(release.x) > self.threshold
            || press.y.abs_diff(release.y) > self.threshold
        {
            return false;
        }
        self.timeout
            .is_none_or(|limit| now.saturating_duration_since(press.pressed_at) <= limit)
    }

    /// Forget the pending press. The last position is kept.
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Forget the pending press and last position.
    pub fn reset(&mut self) {
        self.pending = None;
        self.last_position = None;
    }
}
