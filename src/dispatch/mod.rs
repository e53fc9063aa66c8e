//! Hit-tested dispatch of mouse events to element handlers.
//!
//! Handlers are registered per (event type, element). On dispatch every
//! entry whose element contains the pointer fires; there is no topmost
//! winner and no propagation control. Overlapping elements all receive the
//! event, in registration order.
//!
//! Motion events additionally run a hover pass that derives `mouseEnter` and
//! `mouseLeave` from per-element hover state.

mod bounds;
mod element;
mod handler;

pub use bounds::{BoundsCache, CachedBounds, DEFAULT_BOUNDS_VALIDITY, Geometry, Rect};
pub use element::{ElementArena, ElementId};
pub use handler::{EventType, MouseHandler, PropValue, VALIDATION_ENV, ValidationMode};

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::diagnostics::{LogLevel, emit_log};
use crate::input::MouseEvent;

/// Handle to a registered handler entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Clone, Debug)]
struct HandlerEntry {
    id: EntryId,
    event_type: EventType,
    element: ElementId,
    value: PropValue,
}

/// Dispatch counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events passed to [`Dispatcher::dispatch`].
    pub dispatched: u64,
    /// Handler invocations.
    pub invoked: u64,
    /// Entries skipped because their element had no bounds.
    pub unmeasured: u64,
    /// Entries skipped because their value was not callable.
    pub not_callable: u64,
    /// Registrations refused because the development probe panicked.
    pub probe_failures: u64,
}

/// Element registry and hit-testing dispatcher.
pub struct Dispatcher {
    elements: ElementArena,
    entries: Vec<HandlerEntry>,
    next_entry: u64,
    hover: HashMap<ElementId, bool>,
    bounds: BoundsCache,
    geometry: Box<dyn Geometry>,
    mode: ValidationMode,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Create a dispatcher with the default bounds validity window and
    /// production validation.
    pub fn new(geometry: impl Geometry + 'static) -> Self {
        Self::with_options(geometry, DEFAULT_BOUNDS_VALIDITY, ValidationMode::Production)
    }

    /// Create a dispatcher with explicit settings.
    pub fn with_options(
        geometry: impl Geometry + 'static,
        bounds_validity: Duration,
        mode: ValidationMode,
    ) -> Self {
        Self {
            elements: ElementArena::new(),
            entries: Vec::new(),
            next_entry: 0,
            hover: HashMap::new(),
            bounds: BoundsCache::new(bounds_validity),
            geometry: Box::new(geometry),
            mode,
            stats: DispatchStats::default(),
        }
    }

    /// Validation mode.
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Issue a handle for a newly mounted element.
    pub fn mount(&mut self) -> ElementId {
        self.elements.mount()
    }

    /// Unmount an element, dropping its handlers, hover state and cached
    /// bounds. Returns `false` for a stale handle.
    pub fn unmount(&mut self, element: ElementId) -> bool {
        if !self.elements.unmount(element) {
            return false;
        }
        self.entries.retain(|entry| entry.element != element);
        self.hover.remove(&element);
        self.bounds.invalidate(element);
        true
    }

    /// Check if the handle refers to a mounted element.
    #[must_use]
    pub fn is_mounted(&self, element: ElementId) -> bool {
        self.elements.contains(element)
    }

    /// Register whatever the element holds under an event prop.
    ///
    /// Returns `None` when the element is not mounted, or when development
    /// validation rejected the handler. Non-callable values are accepted and
    /// reported each time they would have fired.
    pub fn register(
        &mut self,
        element: ElementId,
        event_type: EventType,
        value: impl Into<PropValue>,
    ) -> Option<EntryId> {
        if !self.elements.contains(element) {
            emit_log(
                LogLevel::Warn,
                &format!("cannot register {event_type} handler on unmounted element {element}"),
            );
            return None;
        }

        let value = value.into();
        if self.mode == ValidationMode::Development {
            if let Some(handler) = value.as_handler() {
                if !handler::probe(handler, event_type) {
                    self.stats.probe_failures += 1;
                    emit_log(
                        LogLevel::Error,
                        &format!(
                            "{event_type} handler on element {element} panicked during validation; skipping registration"
                        ),
                    );
                    return None;
                }
            }
        }

        let id = EntryId(self.next_entry);
        self.next_entry += 1;
        self.entries.push(HandlerEntry {
            id,
            event_type,
            element,
            value,
        });
        Some(id)
    }

    /// Register a closure.
    pub fn on<F>(&mut self, element: ElementId, event_type: EventType, f: F) -> Option<EntryId>
    where
        F: Fn(&MouseEvent) + 'static,
    {
        self.register(element, event_type, PropValue::handler(f))
    }

    /// Remove one handler entry.
    pub fn unregister(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Number of registered entries.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.entries.len()
    }

    /// Remove every handler, element and cached state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hover.clear();
        self.bounds.clear();
        self.elements.clear();
    }

    /// Forget hover state, so the next motion inside an element fires
    /// `MouseEnter` again.
    pub fn reset_hover(&mut self) {
        self.hover.clear();
    }

    /// Whether the pointer was inside `element` at the last motion event.
    ///
    /// Hover is only tracked for elements with a `MouseEnter` or
    /// `MouseLeave` entry; any other element reports `false`.
    #[must_use]
    pub fn is_hovering(&self, element: ElementId) -> bool {
        self.hover.get(&element).copied().unwrap_or(false)
    }

    /// Current bounds of `element`, through the cache.
    pub fn bounds(&mut self, element: ElementId, now: Instant) -> Option<Rect> {
        self.bounds.get(element, self.geometry.as_ref(), now)
    }

    /// Force the next lookup of `element` to recompute.
    pub fn invalidate_bounds(&mut self, element: ElementId) {
        self.bounds.invalidate(element);
    }

    /// Force every next lookup to recompute (e.g. after a resize).
    pub fn clear_bounds(&mut self) {
        self.bounds.clear();
    }

    /// The bounds cache.
    #[must_use]
    pub fn bounds_cache(&self) -> &BoundsCache {
        &self.bounds
    }

    /// Dispatch counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Fan `event` out to every matching handler. Returns the number of
    /// handlers invoked.
    pub fn dispatch(&mut self, event: &MouseEvent, now: Instant) -> usize {
        self.stats.dispatched += 1;

        let mut fire = Vec::new();
        if let Some(event_type) = EventType::for_action(event.action) {
            self.collect_point(event_type, event, now, &mut fire);
        }
        if event.action.is_motion() {
            self.collect_hover(event, now, &mut fire);
        }

        for handler in &fire {
            handler(event);
        }
        self.stats.invoked += fire.len() as u64;
        fire.len()
    }

    /// Point pass: fire every `event_type` entry whose element contains the
    /// pointer.
    fn collect_point(
        &mut self,
        event_type: EventType,
        event: &MouseEvent,
        now: Instant,
        fire: &mut Vec<MouseHandler>,
    ) {
        for entry in &self.entries {
            if entry.event_type != event_type {
                continue;
            }
            let Some(rect) = self.bounds.get(entry.element, self.geometry.as_ref(), now) else {
                self.stats.unmeasured += 1;
                continue;
            };
            if !rect.contains(event.x, event.y) {
                continue;
            }
            if let Some(handler) = checked_handler(entry, &mut self.stats) {
                fire.push(handler);
            }
        }
    }

    /// Hover pass: `mouseMove` while inside, `mouseEnter` on an
    /// outside→inside flip, `mouseLeave` on an inside→outside flip.
    ///
    /// The flip is decided once per element per pass, so every enter (or
    /// leave) entry of the element sees the same transition.
    fn collect_hover(&mut self, event: &MouseEvent, now: Instant, fire: &mut Vec<MouseHandler>) {
        let mut inside: HashMap<ElementId, Option<bool>> = HashMap::new();

        for entry in &self.entries {
            if !entry.event_type.is_move_class() {
                continue;
            }
            let is_inside = *inside.entry(entry.element).or_insert_with(|| {
                let rect = self.bounds.get(entry.element, self.geometry.as_ref(), now);
                rect.map(|r| r.contains(event.x, event.y))
            });
            let Some(is_inside) = is_inside else {
                self.stats.unmeasured += 1;
                continue;
            };

            let was_inside = self.hover.get(&entry.element).copied().unwrap_or(false);
            let fires = match entry.event_type {
                EventType::MouseMove => is_inside,
                EventType::MouseEnter => !was_inside && is_inside,
                EventType::MouseLeave => was_inside && !is_inside,
                _ => false,
            };
            if fires {
                if let Some(handler) = checked_handler(entry, &mut self.stats) {
                    fire.push(handler);
                }
            }
        }

        for (element, is_inside) in inside {
            let tracks_hover = self.entries.iter().any(|entry| {
                entry.element == element
                    && matches!(entry.event_type, EventType::MouseEnter | EventType::MouseLeave)
            });
            match is_inside {
                Some(true) if tracks_hover => {
                    self.hover.insert(element, true);
                }
                Some(false) => {
                    self.hover.remove(&element);
                }
                _ => {}
            }
        }
    }
}

/// The entry's handler, or `None` (with a diagnostic) when its value is not
/// callable.
fn checked_handler(entry: &HandlerEntry, stats: &mut DispatchStats) -> Option<MouseHandler> {
    match entry.value.as_handler() {
        Some(handler) => Some(Rc::clone(handler)),
        None => {
            stats.not_callable += 1;
            emit_log(
                LogLevel::Warn,
                &format!(
                    "{} handler on element {} is not callable (got {}); skipping",
                    entry.event_type,
                    entry.element,
                    entry.value.kind()
                ),
            );
            None
        }
    }
}
