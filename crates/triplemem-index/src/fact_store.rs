//! Fact stores: the canonical triple set and its slot assignment.
//!
//! Index strategies never own facts. They receive a `&dyn FactStore` on every
//! call, iterate it for bulk builds and resolve slots back to triples when
//! materializing matches.

use ahash::AHashMap;

use crate::{Slot, Term, Triple};

pub type FactIter<'a, T> = Box<dyn Iterator<Item = (Slot, &'a Triple<T>)> + 'a>;

/// Read access to a slot-addressed triple set.
///
/// Implementations must keep a triple's slot stable while the triple is live.
/// `iter` may be called from several threads at once.
pub trait FactStore<T: Term>: Send + Sync {
    /// Resolve a slot to its live triple.
    fn get(&self, slot: Slot) -> Option<&Triple<T>>;

    /// All live `(slot, triple)` pairs.
    fn iter(&self) -> FactIter<'_, T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash-set of triples with dense, reusable slots.
#[derive(Debug, Clone)]
pub struct SlotStore<T> {
    slot_by_triple: AHashMap<Triple<T>, Slot>,
    /// slot -> triple; `None` marks a free slot
    triples: Vec<Option<Triple<T>>>,
    free: Vec<Slot>,
}

impl<T> Default for SlotStore<T> {
    fn default() -> Self {
        Self {
            slot_by_triple: AHashMap::new(),
            triples: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T: Term> SlotStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `triple`, returning its new slot.
    ///
    /// Returns `None` if the triple is already present, or if every `u32`
    /// slot is live and none is free for reuse.
    pub fn insert(&mut self, triple: Triple<T>) -> Option<Slot> {
        if self.slot_by_triple.contains_key(&triple) {
            return None;
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.triples[slot as usize] = Some(triple.clone());
                slot
            }
            None => {
                let Some(slot) = slot_at(self.triples.len()) else {
                    tracing::warn!(
                        slots = self.triples.len(),
                        "slot space exhausted; triple not stored"
                    );
                    return None;
                };
                self.triples.push(Some(triple.clone()));
                slot
            }
        };
        self.slot_by_triple.insert(triple, slot);
        Some(slot)
    }

    /// Remove `triple`, returning the slot it occupied.
    pub fn remove(&mut self, triple: &Triple<T>) -> Option<Slot> {
        let slot = self.slot_by_triple.remove(triple)?;
        self.triples[slot as usize] = None;
        self.free.push(slot);
        Some(slot)
    }

    pub fn slot_of(&self, triple: &Triple<T>) -> Option<Slot> {
        self.slot_by_triple.get(triple).copied()
    }

    pub fn contains(&self, triple: &Triple<T>) -> bool {
        self.slot_by_triple.contains_key(triple)
    }

    pub fn clear(&mut self) {
        self.slot_by_triple.clear();
        self.triples.clear();
        self.free.clear();
    }
}

/// Slot for the `index`-th entry of the slot table, if it fits in a `Slot`.
fn slot_at(index: usize) -> Option<Slot> {
    Slot::try_from(index).ok()
}

impl<T: Term> FactStore<T> for SlotStore<T> {
    fn get(&self, slot: Slot) -> Option<&Triple<T>> {
        self.triples.get(slot as usize)?.as_ref()
    }

    fn iter(&self) -> FactIter<'_, T> {
        Box::new(
            self.triples
                .iter()
                .enumerate()
                .filter_map(|(slot, triple)| Some((slot as Slot, triple.as_ref()?))),
        )
    }

    fn len(&self) -> usize {
        self.slot_by_triple.len()
    }
}
