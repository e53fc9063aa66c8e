//! Mouse session: lifecycle, decoding pipeline and delivery.
//!
//! A [`MouseSession`] owns an [`InputChannel`] and an output writer. While
//! enabled it turns input bytes into events, synthesizes clicks, publishes
//! every event on its [`EventBus`] and then runs the hit-testing
//! [`Dispatcher`].

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::bus::EventBus;
use crate::diagnostics::{LogLevel, emit_log};
use crate::dispatch::{
    DEFAULT_BOUNDS_VALIDITY, Dispatcher, ElementId, EntryId, EventType, Geometry, PropValue,
    ValidationMode,
};
use crate::error::{Error, Result};
use crate::input::{ClickTracker, DEFAULT_CLICK_DISTANCE, MouseDecoder, MouseEvent, Position};
use crate::terminal::{InputChannel, MOUSE_OFF, MOUSE_ON, StdinChannel};

/// Bytes requested from the channel per [`MouseSession::pump`].
const READ_CHUNK: usize = 1024;

/// Session configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum per-axis distance between press and release for a click.
    pub click_distance_threshold: u32,
    /// Maximum time between press and release for a click (`None`: no limit).
    pub click_timeout: Option<Duration>,
    /// How long computed element bounds are trusted.
    pub bounds_validity: Duration,
    /// Handler validation mode.
    pub validation: ValidationMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            click_distance_threshold: DEFAULT_CLICK_DISTANCE,
            click_timeout: None,
            bounds_validity: DEFAULT_BOUNDS_VALIDITY,
            validation: ValidationMode::Production,
        }
    }
}

impl SessionOptions {
    /// Defaults, with the validation mode taken from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            validation: ValidationMode::from_env(),
            ..Self::default()
        }
    }
}

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Tracking off; input is not read.
    Disabled,
    /// Tracking on; events are delivered.
    Enabled,
    /// Tracking on; events are dropped.
    Paused,
}

/// A mouse tracking session over an input channel and an output writer.
pub struct MouseSession<I: InputChannel, W: Write> {
    input: I,
    output: W,
    state: SessionState,
    destroyed: bool,
    /// Raw-mode state found by `enable`, restored by `disable`.
    prior_raw: Option<bool>,
    decoder: MouseDecoder,
    tracker: ClickTracker,
    dispatcher: Dispatcher,
    bus: EventBus,
    last_event: Option<MouseEvent>,
}

impl MouseSession<StdinChannel, io::Stdout> {
    /// Session on the process stdin and stdout.
    pub fn stdio(geometry: impl Geometry + 'static, options: SessionOptions) -> Self {
        Self::new(StdinChannel::new(), io::stdout(), geometry, options)
    }
}

impl<I: InputChannel, W: Write> MouseSession<I, W> {
    /// Create a disabled session.
    pub fn new(
        input: I,
        output: W,
        geometry: impl Geometry + 'static,
        options: SessionOptions,
    ) -> Self {
        Self {
            input,
            output,
            state: SessionState::Disabled,
            destroyed: false,
            prior_raw: None,
            decoder: MouseDecoder::new(),
            tracker: ClickTracker::new(options.click_distance_threshold)
                .with_timeout(options.click_timeout),
            dispatcher: Dispatcher::with_options(
                geometry,
                options.bounds_validity,
                options.validation,
            ),
            bus: EventBus::new(),
            last_event: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state == SessionState::Enabled
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Start mouse tracking.
    ///
    /// Records the current raw-mode state, enters raw mode, switches the
    /// channel to UTF-8, resumes it and writes the enable sequence. Every
    /// step is attempted and the session is `Enabled` afterwards even if one
    /// failed; the first failure is returned. Does nothing when already
    /// enabled or paused.
    pub fn enable(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(Error::Destroyed);
        }
        if self.state != SessionState::Disabled {
            return Ok(());
        }
        if !self.input.is_terminal() {
            return Err(Error::NotATerminal);
        }

        let mut first_error = None;
        self.prior_raw = Some(self.input.is_raw_mode());
        keep_first(&mut first_error, "enter raw mode", self.input.set_raw_mode(true));
        keep_first(&mut first_error, "enable UTF-8", self.input.enable_utf8());
        keep_first(&mut first_error, "resume input", self.input.resume());
        keep_first(
            &mut first_error,
            "write enable sequence",
            write_sequence(&mut self.output, MOUSE_ON),
        );

        self.decoder.clear();
        self.tracker.reset();
        self.state = SessionState::Enabled;
        emit_log(LogLevel::Debug, "mouse tracking enabled");
        first_error.map_or(Ok(()), Err)
    }

    /// Stop mouse tracking.
    ///
    /// Writes the disable sequence, suspends the channel and restores the
    /// raw-mode state found by [`enable`](Self::enable). Every step is
    /// attempted; the session is `Disabled` afterwards and the first failure
    /// is returned.
    pub fn disable(&mut self) -> Result<()> {
        if self.state == SessionState::Disabled {
            return Ok(());
        }

        let mut first_error = None;
        keep_first(
            &mut first_error,
            "write disable sequence",
            write_sequence(&mut self.output, MOUSE_OFF),
        );
        keep_first(&mut first_error, "suspend input", self.input.suspend());
        if let Some(prior) = self.prior_raw.take() {
            keep_first(
                &mut first_error,
                "restore raw mode",
                self.input.set_raw_mode(prior),
            );
        }

        self.decoder.clear();
        self.tracker.reset();
        self.dispatcher.reset_hover();
        self.state = SessionState::Disabled;
        emit_log(LogLevel::Debug, "mouse tracking disabled");
        first_error.map_or(Ok(()), Err)
    }

    /// Stop delivering events without touching the terminal.
    ///
    /// Partially read reports and the pending press are discarded, so input
    /// dropped while paused cannot complete a click after `resume`.
    pub fn pause(&mut self) {
        if self.state == SessionState::Enabled {
            self.state = SessionState::Paused;
            self.decoder.clear();
            self.tracker.clear_pending();
            emit_log(LogLevel::Debug, "mouse tracking paused");
        }
    }

    /// Resume delivering events after [`pause`](Self::pause).
    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Enabled;
            emit_log(LogLevel::Debug, "mouse tracking resumed");
        }
    }

    /// Disable and drop every handler, listener and element. The session
    /// cannot be enabled again.
    pub fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        let result = self.disable();
        self.dispatcher.clear();
        self.bus.clear();
        self.last_event = None;
        self.destroyed = true;
        emit_log(LogLevel::Debug, "mouse session destroyed");
        result
    }

    /// Feed input bytes. Returns the number of events delivered.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        self.feed_at(bytes, Instant::now())
    }

    /// Feed input bytes that arrived at `now`.
    ///
    /// Bytes are dropped unless the session is enabled.
    pub fn feed_at(&mut self, bytes: &[u8], now: Instant) -> usize {
        if self.state != SessionState::Enabled {
            return 0;
        }

        let mut delivered = 0;
        for decoded in self.decoder.push(bytes) {
            for event in self.tracker.on_decoded(decoded, now).into_events() {
                self.bus.publish(&event);
                self.dispatcher.dispatch(&event, now);
                self.last_event = Some(event);
                delivered += 1;
            }
        }
        delivered
    }

    /// Read one chunk from the channel and feed it. Returns the number of
    /// events delivered.
    ///
    /// While paused the chunk is read and discarded.
    pub fn pump(&mut self) -> Result<usize> {
        if self.state == SessionState::Disabled {
            return Ok(0);
        }
        let mut buf = [0u8; READ_CHUNK];
        let n = self.input.read_chunk(&mut buf)?;
        Ok(self.feed(&buf[..n]))
    }

    /// Last pointer position seen on a move or drag.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.tracker.last_position()
    }

    /// Last delivered event.
    #[must_use]
    pub fn last_event(&self) -> Option<&MouseEvent> {
        self.last_event.as_ref()
    }

    /// The session's event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Issue a handle for a newly mounted element.
    pub fn mount(&mut self) -> ElementId {
        self.dispatcher.mount()
    }

    /// Unmount an element and drop its per-element state.
    pub fn unmount(&mut self, element: ElementId) -> bool {
        self.dispatcher.unmount(element)
    }

    /// Register an event prop value on an element.
    pub fn register(
        &mut self,
        element: ElementId,
        event_type: EventType,
        value: impl Into<PropValue>,
    ) -> Option<EntryId> {
        self.dispatcher.register(element, event_type, value)
    }

    /// Register a handler closure on an element.
    pub fn on<F>(&mut self, element: ElementId, event_type: EventType, f: F) -> Option<EntryId>
    where
        F: Fn(&MouseEvent) + 'static,
    {
        self.dispatcher.on(element, event_type, f)
    }

    /// The input channel.
    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// The output writer.
    #[must_use]
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<I: InputChannel, W: Write> Drop for MouseSession<I, W> {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            emit_log(
                LogLevel::Warn,
                &format!("mouse session cleanup on drop failed: {e}"),
            );
        }
    }
}

fn write_sequence<W: Write>(output: &mut W, sequence: &str) -> io::Result<()> {
    output.write_all(sequence.as_bytes())?;
    output.flush()
}

fn keep_first(slot: &mut Option<Error>, step: &str, result: io::Result<()>) {
    if let Err(e) = result {
        emit_log(LogLevel::Warn, &format!("mouse session failed to {step}: {e}"));
        if slot.is_none() {
            *slot = Some(Error::Io(e));
        }
    }
}
