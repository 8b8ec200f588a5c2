//! Lazy match sequences.

use roaring::bitmap::{IntoIter as OwnedSlots, Iter as BorrowedSlots};
use roaring::RoaringBitmap;

use crate::fact_store::{FactIter, FactStore};
use crate::pattern::TriplePattern;
use crate::{Term, Triple};

/// One-shot iterator over the triples matching a pattern.
///
/// Borrows the index and the fact store; nothing is resolved until the
/// iterator is advanced. Dropping it (or calling [`MatchIter::close`]) before
/// exhaustion is always fine.
pub struct MatchIter<'a, T: Term> {
    source: Source<'a, T>,
}

enum Source<'a, T: Term> {
    Empty,
    Single(Option<&'a Triple<T>>),
    Borrowed {
        slots: BorrowedSlots<'a>,
        facts: &'a dyn FactStore<T>,
    },
    Owned {
        slots: OwnedSlots,
        facts: &'a dyn FactStore<T>,
    },
    Scan {
        facts: FactIter<'a, T>,
        pattern: TriplePattern<T>,
    },
}

impl<'a, T: Term> MatchIter<'a, T> {
    pub fn empty() -> Self {
        Self {
            source: Source::Empty,
        }
    }

    /// Resolve the slots of a bitmap owned by the index.
    pub fn from_bitmap(slots: &'a RoaringBitmap, facts: &'a dyn FactStore<T>) -> Self {
        if slots.is_empty() {
            return Self::empty();
        }
        Self {
            source: Source::Borrowed {
                slots: slots.iter(),
                facts,
            },
        }
    }

    /// Resolve the slots of a freshly computed bitmap (e.g. an intersection).
    pub fn from_owned_bitmap(slots: RoaringBitmap, facts: &'a dyn FactStore<T>) -> Self {
        if slots.is_empty() {
            return Self::empty();
        }
        Self {
            source: Source::Owned {
                slots: slots.into_iter(),
                facts,
            },
        }
    }

    /// Filter every live triple of `facts` through `pattern`.
    pub fn scan(facts: &'a dyn FactStore<T>, pattern: TriplePattern<T>) -> Self {
        Self {
            source: Source::Scan {
                facts: facts.iter(),
                pattern,
            },
        }
    }

    /// A single triple, or nothing.
    pub fn single(triple: Option<&'a Triple<T>>) -> Self {
        Self {
            source: Source::Single(triple),
        }
    }

    /// Release the iterator before it is exhausted.
    pub fn close(self) {}
}

impl<'a, T: Term> Iterator for MatchIter<'a, T> {
    type Item = &'a Triple<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Empty => None,
            Source::Single(triple) => triple.take(),
            // Slots that no longer resolve are skipped.
            Source::Borrowed { slots, facts } => {
                let facts: &'a dyn FactStore<T> = *facts;
                slots.find_map(|slot| facts.get(slot))
            }
            Source::Owned { slots, facts } => {
                let facts: &'a dyn FactStore<T> = *facts;
                slots.find_map(|slot| facts.get(slot))
            }
            Source::Scan { facts, pattern } => facts
                .find(|(_, triple)| pattern.matches(triple))
                .map(|(_, triple)| triple),
        }
    }
}

impl<T: Term> std::fmt::Debug for MatchIter<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.source {
            Source::Empty => "empty",
            Source::Single(_) => "single",
            Source::Borrowed { .. } => "bitmap",
            Source::Owned { .. } => "owned-bitmap",
            Source::Scan { .. } => "scan",
        };
        f.debug_struct("MatchIter").field("source", &kind).finish()
    }
}
