//! Action-keyed publish/subscribe for decoded mouse events.
//!
//! The bus is cheap to clone and shareable across threads, so event streams
//! can live on a different thread than the session that publishes.

use std::sync::{Arc, Mutex, PoisonError};

use crate::input::{MouseAction, MouseEvent};

/// A bus listener.
pub type Listener = Box<dyn FnMut(&MouseEvent) + Send>;

/// Token returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` listens to every action.
    action: Option<MouseAction>,
    listener: Arc<Mutex<Listener>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Synchronous, in-order event bus.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for one action.
    pub fn subscribe<F>(&self, action: MouseAction, listener: F) -> SubscriptionId
    where
        F: FnMut(&MouseEvent) + Send + 'static,
    {
        self.insert(Some(action), Box::new(listener))
    }

    /// Listen for every action.
    pub fn subscribe_all<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MouseEvent) + Send + 'static,
    {
        self.insert(None, Box::new(listener))
    }

    fn insert(&self, action: Option<MouseAction>, listener: Listener) -> SubscriptionId {
        let mut registry = self.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscriptions.push(Subscription {
            id,
            action,
            listener: Arc::new(Mutex::new(listener)),
        });
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut registry = self.lock();
            registry
                .subscriptions
                .iter()
                .position(|s| s.id == id)
                .map(|index| registry.subscriptions.remove(index))
        };
        // Dropped outside the registry lock; listeners may own guards that
        // take other locks when released.
        removed.is_some()
    }

    /// Deliver `event` to its action's listeners and to catch-all listeners,
    /// in subscription order. Returns the number of listeners called.
    ///
    /// Listeners are snapshotted before delivery: subscribing or
    /// unsubscribing from inside a listener takes effect on the next publish.
    /// A listener must not publish an event that would reach itself.
    pub fn publish(&self, event: &MouseEvent) -> usize {
        let targets: Vec<Arc<Mutex<Listener>>> = {
            let registry = self.lock();
            registry
                .subscriptions
                .iter()
                .filter(|s| s.action.is_none_or(|action| action == event.action))
                .map(|s| Arc::clone(&s.listener))
                .collect()
        };

        for listener in &targets {
            let mut listener = listener.lock().unwrap_or_else(PoisonError::into_inner);
            listener(event);
        }
        targets.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().subscriptions.len()
    }

    /// Number of listeners that would receive `action`.
    #[must_use]
    pub fn listener_count_for(&self, action: MouseAction) -> usize {
        self.lock()
            .subscriptions
            .iter()
            .filter(|s| s.action.is_none_or(|a| a == action))
            .count()
    }

    /// Remove every listener.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.lock().subscriptions);
        drop(removed);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
