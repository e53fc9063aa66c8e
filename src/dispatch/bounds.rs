//! Element bounds and the bounds cache.
//!
//! Layout is owned by the host. The cache asks the host's [`Geometry`] for an
//! element's absolute rectangle and trusts the answer for a short validity
//! window, so a burst of motion events does not recompute layout per event.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::dispatch::element::ElementId;

/// Default validity window for cached bounds.
pub const DEFAULT_BOUNDS_VALIDITY: Duration = Duration::from_millis(100);

/// Absolute screen rectangle of an element, in 1-indexed cells.
///
/// All four edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Rectangle covering `width` x `height` cells starting at (`left`, `top`).
    ///
    /// Zero-sized rectangles collapse to a single cell edge; use
    /// [`Rect::from_edges`] for exact control.
    #[must_use]
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width.saturating_sub(1)),
            bottom: top.saturating_add(height.saturating_sub(1)),
            width,
            height,
        }
    }

    /// Rectangle from inclusive edges.
    #[must_use]
    pub fn from_edges(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            width: right.saturating_sub(left).saturating_add(1),
            height: bottom.saturating_sub(top).saturating_add(1),
        }
    }

    /// Inclusive point-in-rectangle test.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Source of element rectangles.
pub trait Geometry {
    /// Compute the absolute rectangle of `element`, or `None` if it cannot be
    /// measured yet.
    fn compute_bounds(&self, element: ElementId) -> Option<Rect>;
}

impl<F> Geometry for F
where
    F: Fn(ElementId) -> Option<Rect>,
{
    fn compute_bounds(&self, element: ElementId) -> Option<Rect> {
        self(element)
    }
}

/// A cached rectangle and when it was computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachedBounds {
    pub rect: Rect,
    pub computed_at: Instant,
}

/// Per-element rectangle cache.
#[derive(Clone, Debug)]
pub struct BoundsCache {
    validity: Duration,
    entries: HashMap<ElementId, CachedBounds>,
    computations: u64,
}

impl Default for BoundsCache {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDS_VALIDITY)
    }
}

impl BoundsCache {
    /// Create a cache with the given validity window. A zero window disables
    /// caching.
    #[must_use]
    pub fn new(validity: Duration) -> Self {
        Self {
            validity,
            entries: HashMap::new(),
            computations: 0,
        }
    }

    /// Validity window.
    #[must_use]
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Look up the bounds of `element`, recomputing through `geometry` when
    /// the cached entry is missing or expired.
    pub fn get(
        &mut self,
        element: ElementId,
        geometry: &dyn Geometry,
        now: Instant,
    ) -> Option<Rect> {
        if let Some(cached) = self.entries.get(&element) {
            if now.saturating_duration_since(cached.computed_at) < self.validity {
                return Some(cached.rect);
            }
        }

        self.computations += 1;
        match geometry.compute_bounds(element) {
            Some(rect) => {
                self.entries.insert(
                    element,
                    CachedBounds {
                        rect,
                        computed_at: now,
                    },
                );
                Some(rect)
            }
            None => {
                self.entries.remove(&element);
                None
            }
        }
    }

    /// Cached entry for `element`, regardless of age.
    #[must_use]
    pub fn peek(&self, element: ElementId) -> Option<&CachedBounds> {
        self.entries.get(&element)
    }

    /// Drop the cached entry for `element`.
    pub fn invalidate(&mut self, element: ElementId) {
        self.entries.remove(&element);
    }

    /// Drop every cached entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How many times the geometry collaborator was consulted.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::element::ElementArena;
    use std::cell::Cell;

    struct CountingGeometry {
        rect: Option<Rect>,
        calls: Cell<u32>,
    }

    impl Geometry for CountingGeometry {
        fn compute_bounds(&self, _element: ElementId) -> Option<Rect> {
            self.calls.set(self.calls.get() + 1);
            self.rect
        }
    }

    #[test]
    fn test_rect_new_edges() {
        let rect = Rect::new(10, 5, 20, 3);
        assert_eq!(rect.right, 29);
        assert_eq!(rect.bottom, 7);
        assert_eq!(Rect::from_edges(10, 5, 29, 7), rect);
    }

    #[test]
    fn test_rect_contains_inclusive_edges() {
        let rect = Rect::from_edges(2, 3, 8, 6);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(8, 6));
        assert!(rect.contains(2, 6));
        assert!(rect.contains(8, 3));
        assert!(rect.contains(5, 4));

        assert!(!rect.contains(1, 3));
        assert!(!rect.contains(9, 3));
        assert!(!rect.contains(2, 2));
        assert!(!rect.contains(2, 7));
    }

    #[test]
    fn test_cache_hit_within_window() {
        let mut arena = ElementArena::new();
        let el = arena.mount();
        let geometry = CountingGeometry {
            rect: Some(Rect::new(1, 1, 5, 5)),
            calls: Cell::new(0),
        };
        let mut cache = BoundsCache::default();
        let t0 = Instant::now();

        assert!(cache.get(el, &geometry, t0).is_some());
        assert!(cache.get(el, &geometry, t0 + Duration::from_millis(50)).is_some());
        assert_eq!(geometry.calls.get(), 1);
    }

    #[test]
    fn test_cache_recomputes_after_expiry() {
        let mut arena = ElementArena::new();
        let el = arena.mount();
        let geometry = CountingGeometry {
            rect: Some(Rect::new(1, 1, 5, 5)),
            calls: Cell::new(0),
        };
        let mut cache = BoundsCache::default();
        let t0 = Instant::now();

        cache.get(el, &geometry, t0);
        cache.get(el, &geometry, t0 + Duration::from_millis(100));
        assert_eq!(geometry.calls.get(), 2);
        assert_eq!(
            cache.peek(el).map(|c| c.computed_at),
            Some(t0 + Duration::from_millis(100))
        );
    }

    #[test]
    fn test_zero_window_always_recomputes() {
        let mut arena = ElementArena::new();
        let el = arena.mount();
        let geometry = CountingGeometry {
            rect: Some(Rect::new(1, 1, 5, 5)),
            calls: Cell::new(0),
        };
        let mut cache = BoundsCache::new(Duration::ZERO);
        let t0 = Instant::now();
        for _ in 0..3 {
            cache.get(el, &geometry, t0);
        }
        assert_eq!(geometry.calls.get(), 3);
        assert_eq!(cache.computations(), 3);
    }

    #[test]
    fn test_unmeasurable_is_not_cached() {
        let mut arena = ElementArena::new();
        let el = arena.mount();
        let geometry = CountingGeometry {
            rect: None,
            calls: Cell::new(0),
        };
        let mut cache = BoundsCache::default();
        let t0 = Instant::now();
        assert!(cache.get(el, &geometry, t0).is_none());
        assert!(cache.get(el, &geometry, t0).is_none());
        assert_eq!(geometry.calls.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_identity_keyed_entries() {
        let mut arena = ElementArena::new();
        let a = arena.mount();
        let b = arena.mount();
        let geometry = |_: ElementId| Some(Rect::new(1, 1, 3, 3));
        let mut cache = BoundsCache::default();
        let now = Instant::now();

        cache.get(a, &geometry, now);
        cache.get(b, &geometry, now);
        // Same geometry, still two entries
        assert_eq!(cache.len(), 2);

        cache.invalidate(a);
        assert!(cache.peek(a).is_none());
        assert!(cache.peek(b).is_some());
    }
}
