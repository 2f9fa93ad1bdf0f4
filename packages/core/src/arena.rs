//! Generational arena used to store component instances.
//!
//! Scope identities are reused once a component unmounts, so every handle
//! carries a generation counter alongside the slab index: a handle minted
//! before a slot was recycled fails its lookup rather than silently reading
//! whatever was reinserted into that slot. `ElementId`s, by contrast, are
//! bare indices into the document backend's own node table and are reused
//! as-is once reclaimed, matching how the host document already tracks
//! node lifetime.

use slab::Slab;
use std::fmt;

/// Identifies a mounted component instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({}#{})", self.index, self.generation)
    }
}

/// Identifies a single concrete node (element, text node or placeholder)
/// previously created by a mutation against the document backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementId(pub usize);

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A slab of `T` indexed by generation-checked [`ScopeId`]s.
pub struct GenerationalArena<T> {
    slots: Slab<Slot<T>>,
}

impl<T> Default for GenerationalArena<T> {
    fn default() -> Self {
        Self { slots: Slab::new() }
    }
}

impl<T> GenerationalArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning its freshly minted id.
    pub fn insert(&mut self, value: T) -> ScopeId {
        let index = self.slots.insert(Slot {
            generation: 0,
            value: Some(value),
        });
        let generation = self.slots[index].generation;
        ScopeId { index, generation }
    }

    /// Removes the value at `id`, bumping the slot's generation so any
    /// handle still referring to `id` misses on its next lookup.
    pub fn remove(&mut self, id: ScopeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        if value.is_some() {
            self.slots.remove(id.index);
        }
        value
    }

    pub fn get(&self, id: ScopeId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: ScopeId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &T)> {
        self.slots.iter().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    ScopeId {
                        index,
                        generation: slot.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
impl ScopeId {
    pub(crate) fn for_test(index: usize) -> Self {
        ScopeId {
            index,
            generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reused_slot_invalidates_old_handle() {
        let mut arena: GenerationalArena<&'static str> = GenerationalArena::new();
        let first = arena.insert("first");
        assert_eq!(arena.remove(first), Some("first"));

        let second = arena.insert("second");
        assert_ne!(first, second, "recycled slot must mint a new generation");
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&"second"));
    }
}
