//! Element identity.
//!
//! Elements are identified by a slot index plus a generation, so a slot
//! reused after unmount never aliases state left behind by its previous
//! occupant.

use std::fmt;

/// Opaque handle to a mounted UI element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    /// Slot index (stable while the element is mounted).
    #[must_use]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    live: bool,
}

/// Allocator for [`ElementId`]s.
#[derive(Clone, Debug, Default)]
pub struct ElementArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ElementArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle for a newly mounted element.
    pub fn mount(&mut self) -> ElementId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.live = true;
            return ElementId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            live: true,
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    /// Release a handle. Returns `false` if it was already stale.
    pub fn unmount(&mut self, id: ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.slots[id.index as usize].live = false;
        self.free.push(id.index);
        true
    }

    /// Check if the handle refers to a mounted element.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.live && slot.generation == id.generation)
    }

    /// Number of mounted elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unmount everything.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.live {
                slot.live = false;
                self.free.push(index as u32);
            }
        }
    }
}
