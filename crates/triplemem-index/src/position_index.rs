//! PositionIndex: `term -> {slots}` for one triple position.
//!
//! A term is a key exactly while its bitmap is non-empty; callers that remove
//! slots prune with [`PositionIndex::remove_if_empty`].

use std::sync::OnceLock;

use ahash::AHashMap;
use roaring::RoaringBitmap;

use crate::{Position, Slot, Term};

/// Shared empty bitmap, used when a term has no entry.
pub fn empty_bitmap() -> &'static RoaringBitmap {
    static EMPTY: OnceLock<RoaringBitmap> = OnceLock::new();
    EMPTY.get_or_init(RoaringBitmap::new)
}

#[derive(Debug, Clone)]
pub struct PositionIndex<T> {
    position: Position,
    by_term: AHashMap<T, RoaringBitmap>,
}

impl<T: Term> PositionIndex<T> {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            by_term: AHashMap::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of distinct terms indexed at this position.
    pub fn len(&self) -> usize {
        self.by_term.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_term.is_empty()
    }

    pub fn get(&self, term: &T) -> Option<&RoaringBitmap> {
        self.by_term.get(term)
    }

    /// Bitmap for `term`, or the shared empty bitmap.
    pub fn get_or_empty(&self, term: &T) -> &RoaringBitmap {
        self.get(term).unwrap_or(empty_bitmap())
    }

    /// Bitmap for `term`, inserting an empty one first if absent.
    pub fn get_or_insert(&mut self, term: T) -> &mut RoaringBitmap {
        self.by_term.entry(term).or_default()
    }

    /// Drop `term` if its bitmap is empty. Returns whether it was dropped.
    pub fn remove_if_empty(&mut self, term: &T) -> bool {
        if self.by_term.get(term).is_some_and(RoaringBitmap::is_empty) {
            self.by_term.remove(term);
            return true;
        }
        false
    }

    pub fn insert(&mut self, term: &T, slot: Slot) {
        // Avoid cloning the term when it is already a key.
        if let Some(slots) = self.by_term.get_mut(term) {
            slots.insert(slot);
            return;
        }
        self.get_or_insert(term.clone()).insert(slot);
    }

    /// Remove `slot` from `term`'s bitmap and prune it if it became empty.
    /// Returns false when the term had no bitmap.
    pub fn remove(&mut self, term: &T, slot: Slot) -> bool {
        let Some(slots) = self.by_term.get_mut(term) else {
            return false;
        };
        slots.remove(slot);
        self.remove_if_empty(term);
        true
    }

    pub fn clear(&mut self) {
        self.by_term.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &RoaringBitmap)> + '_ {
        self.by_term.iter()
    }

    /// Total number of `(term, slot)` entries.
    pub fn entry_count(&self) -> u64 {
        self.by_term.values().map(RoaringBitmap::len).sum()
    }
}

impl<T: Term> PartialEq for PositionIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.by_term.len() == other.by_term.len()
            && self
                .by_term
                .iter()
                .all(|(term, slots)| other.by_term.get(term) == Some(slots))
    }
}

impl<T: Term> Eq for PositionIndex<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_insert_returns_the_same_bitmap() {
        let mut index = PositionIndex::new(Position::Subject);
        index.get_or_insert("a").insert(1);
        index.get_or_insert("a").insert(2);
        assert_eq!(index.len(), 1);
        let slots: Vec<u32> = index.get_or_empty(&"a").iter().collect();
        assert_eq!(slots, vec![1, 2]);
    }

    #[test]
    fn remove_prunes_empty_terms() {
        let mut index = PositionIndex::new(Position::Object);
        index.insert(&"a", 7);
        index.insert(&"a", 8);

        assert!(index.remove(&"a", 7));
        assert!(index.get(&"a").is_some());
        assert!(index.remove(&"a", 8));
        assert!(index.get(&"a").is_none());
        assert!(index.is_empty());

        assert!(!index.remove(&"missing", 1));
    }

    #[test]
    fn remove_if_empty_keeps_non_empty_bitmaps() {
        let mut index = PositionIndex::new(Position::Predicate);
        index.get_or_insert("p");
        index.insert(&"q", 3);
        assert!(index.remove_if_empty(&"p"));
        assert!(!index.remove_if_empty(&"q"));
        assert!(!index.remove_if_empty(&"nope"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn get_or_empty_falls_back_to_shared_empty() {
        let index: PositionIndex<&str> = PositionIndex::new(Position::Subject);
        assert!(index.get_or_empty(&"x").is_empty());
        assert!(std::ptr::eq(index.get_or_empty(&"y"), empty_bitmap()));
    }

    #[test]
    fn get_or_empty_borrows_stored_bitmaps() {
        let mut index = PositionIndex::new(Position::Object);
        index.insert(&String::from("o"), 4);
        let term = String::from("o");
        let slots = index.get_or_empty(&term);
        assert!(std::ptr::eq(slots, index.get(&term).expect("indexed term")));
        assert!(!std::ptr::eq(slots, empty_bitmap()));
        assert_eq!(index.entry_count(), 1);
    }

    #[test]
    fn entry_count_sums_every_bitmap() {
        let mut index = PositionIndex::new(Position::Predicate);
        index.insert(&"p", 1);
        index.insert(&"p", 2);
        index.insert(&"q", 2);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entry_count(), 3);
        index.remove(&"p", 1);
        assert_eq!(index.entry_count(), 2);
    }

    #[test]
    fn equality_compares_contents() {
        let mut a = PositionIndex::new(Position::Subject);
        let mut b = PositionIndex::new(Position::Subject);
        a.insert(&"x", 1);
        b.insert(&"x", 1);
        assert_eq!(a, b);
        b.insert(&"x", 2);
        assert_ne!(a, b);
    }
}
