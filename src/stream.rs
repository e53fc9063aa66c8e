//! Blocking event streams over the [`EventBus`].
//!
//! An [`EventStream`] subscribes to the bus and buffers matching events in a
//! bounded queue. Consumers block in [`EventStream::recv`] (or its timeout
//! and non-blocking variants) on any thread. A [`CancellationToken`] wakes
//! every stream registered with it and makes them fail with
//! [`Error::Cancelled`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use crate::bus::{EventBus, SubscriptionId};
use crate::error::{Error, Result};
use crate::input::{MouseAction, MouseEvent};

/// Default queue capacity.
pub const DEFAULT_STREAM_CAPACITY: usize = 64;

/// What happens when an event arrives and the queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    /// Drop the oldest queued event.
    #[default]
    DropOldest,
    /// Keep only the newest event, regardless of capacity.
    LatestOnly,
}

/// Stream configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamOptions {
    /// Maximum number of queued events (at least 1).
    pub capacity: usize,
    /// Overflow policy.
    pub overflow: Overflow,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STREAM_CAPACITY,
            overflow: Overflow::DropOldest,
        }
    }
}

impl StreamOptions {
    /// Options for a latest-only stream.
    #[must_use]
    pub fn latest_only() -> Self {
        Self {
            capacity: 1,
            overflow: Overflow::LatestOnly,
        }
    }
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<MouseEvent>,
    dropped: u64,
    cancelled: bool,
    closed: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: MouseEvent, options: StreamOptions) {
        let mut state = self.lock();
        if state.cancelled || state.closed {
            return;
        }
        match options.overflow {
            Overflow::LatestOnly => {
                state.dropped += state.queue.len() as u64;
                state.queue.clear();
            }
            Overflow::DropOldest => {
                while state.queue.len() >= options.capacity.max(1) {
                    state.queue.pop_front();
                    state.dropped += 1;
                }
            }
        }
        state.queue.push_back(event);
        drop(state);
        self.ready.notify_one();
    }

    fn cancel(&self) {
        self.lock().cancelled = true;
        self.ready.notify_all();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// Marks the stream closed when the bus drops its listener.
struct CloseOnDrop(Arc<Shared>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}

struct TokenInner {
    cancelled: AtomicBool,
    streams: Mutex<Vec<Weak<Shared>>>,
}

/// Cooperative cancellation for blocked streams.
///
/// Clones share state. Cancelling is permanent.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                streams: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Cancel every stream registered with this token, now and later.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let streams = std::mem::take(
            &mut *self
                .inner
                .streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for shared in streams.iter().filter_map(Weak::upgrade) {
            shared.cancel();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn register(&self, shared: &Arc<Shared>) {
        {
            let mut streams = self
                .inner
                .streams
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            streams.retain(|weak| weak.strong_count() > 0);
            streams.push(Arc::downgrade(shared));
        }
        // A cancel that raced the push has already drained the list.
        if self.is_cancelled() {
            shared.cancel();
        }
    }
}

/// A bounded queue of bus events.
///
/// Dropping the stream unsubscribes it.
pub struct EventStream {
    bus: EventBus,
    subscription: Option<SubscriptionId>,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("subscription", &self.subscription)
            .field("queued", &self.len())
            .finish()
    }
}

impl EventStream {
    /// Stream every event published on `bus`.
    #[must_use]
    pub fn subscribe(bus: &EventBus, options: StreamOptions) -> Self {
        Self::matching(bus, |_| true, options)
    }

    /// Stream events whose action is in `actions`.
    #[must_use]
    pub fn for_actions(bus: &EventBus, actions: &[MouseAction], options: StreamOptions) -> Self {
        let actions = actions.to_vec();
        Self::matching(bus, move |e| actions.contains(&e.action), options)
    }

    /// Stream events accepted by `predicate`.
    #[must_use]
    pub fn matching<P>(bus: &EventBus, predicate: P, options: StreamOptions) -> Self
    where
        P: Fn(&MouseEvent) -> bool + Send + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::default()),
            ready: Condvar::new(),
        });
        let guard = CloseOnDrop(Arc::clone(&shared));
        let subscription = bus.subscribe_all(move |event| {
            if predicate(event) {
                guard.0.push(event.clone(), options);
            }
        });
        Self {
            bus: bus.clone(),
            subscription: Some(subscription),
            shared,
        }
    }

    /// Attach a cancellation token. A token that is already cancelled
    /// cancels the stream immediately.
    #[must_use]
    pub fn with_cancellation(self, token: &CancellationToken) -> Self {
        token.register(&self.shared);
        self
    }

    /// Block until an event arrives.
    pub fn recv(&mut self) -> Result<MouseEvent> {
        self.recv_until(None)
    }

    /// Block until an event arrives or `timeout` elapses.
    ///
    /// A timeout leaves the stream subscribed.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<MouseEvent> {
        self.recv_until(Instant::now().checked_add(timeout))
    }

    /// Take a queued event without blocking.
    pub fn try_recv(&mut self) -> Result<Option<MouseEvent>> {
        let mut state = self.shared.lock();
        if state.cancelled {
            drop(state);
            self.close();
            return Err(Error::Cancelled);
        }
        if let Some(event) = state.queue.pop_front() {
            return Ok(Some(event));
        }
        if state.closed {
            return Err(Error::Closed);
        }
        Ok(None)
    }

    fn recv_until(&mut self, deadline: Option<Instant>) -> Result<MouseEvent> {
        let mut state = self.shared.lock();
        loop {
            if state.cancelled {
                drop(state);
                self.close();
                return Err(Error::Cancelled);
            }
            if let Some(event) = state.queue.pop_front() {
                return Ok(event);
            }
            if state.closed {
                return Err(Error::Closed);
            }

            state = match deadline {
                None => self
                    .shared
                    .ready
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::TimedOut);
                    }
                    self.shared
                        .ready
                        .wait_timeout(state, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events discarded by the overflow policy.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }

    /// Whether the stream is still subscribed to the bus.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some() && !self.shared.lock().closed
    }

    /// Unsubscribe from the bus. Queued events stay readable.
    pub fn close(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.bus.unsubscribe(id);
        }
    }
}

impl Iterator for EventStream {
    type Item = MouseEvent;

    /// Blocks like [`EventStream::recv`]; ends on cancellation or close.
    fn next(&mut self) -> Option<MouseEvent> {
        self.recv().ok()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Wait for the next event, optionally restricted to one action.
pub fn wait_for_event(
    bus: &EventBus,
    action: Option<MouseAction>,
    timeout: Option<Duration>,
    token: Option<&CancellationToken>,
) -> Result<MouseEvent> {
    wait_for(
        bus,
        move |e| action.is_none_or(|a| a == e.action),
        timeout,
        token,
    )
}

/// Wait for the next event accepted by `predicate`.
///
/// The listener is removed before returning, whatever the outcome.
pub fn wait_for<P>(
    bus: &EventBus,
    predicate: P,
    timeout: Option<Duration>,
    token: Option<&CancellationToken>,
) -> Result<MouseEvent>
where
    P: Fn(&MouseEvent) -> bool + Send + 'static,
{
    let mut stream = EventStream::matching(bus, predicate, StreamOptions::latest_only());
    if let Some(token) = token {
        stream = stream.with_cancellation(token);
    }
    let result = match timeout {
        Some(timeout) => stream.recv_timeout(timeout),
        None => stream.recv(),
    };
    stream.close();
    result
}
