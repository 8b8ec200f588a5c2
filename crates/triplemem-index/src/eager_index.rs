//! EagerIndex: three position indexes kept current on every mutation.
//!
//! Each triple position has its own `term -> {slots}` map:
//!
//! - `subject   -> {slots}`
//! - `predicate -> {slots}`
//! - `object    -> {slots}`
//!
//! One-position patterns read a single bitmap; two-position patterns
//! intersect two. The three maps never reference each other, so a bulk build
//! can fill them on separate threads.

use std::time::Instant;

use roaring::RoaringBitmap;

use crate::error::{IndexError, IndexResult};
use crate::fact_store::FactStore;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::position_index::PositionIndex;
use crate::strategy::TripleIndex;
use crate::{Position, Slot, Term, Triple};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EagerIndex<T: Term> {
    subjects: PositionIndex<T>,
    predicates: PositionIndex<T>,
    objects: PositionIndex<T>,
}

impl<T: Term> Default for EagerIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lookup plan for one partial pattern.
enum Lookup<'p, T> {
    One(Position, &'p T),
    Two((Position, &'p T), (Position, &'p T)),
}

impl<T: Term> EagerIndex<T> {
    /// Empty index, to be filled through `add_to_index`.
    pub fn new() -> Self {
        Self {
            subjects: PositionIndex::new(Position::Subject),
            predicates: PositionIndex::new(Position::Predicate),
            objects: PositionIndex::new(Position::Object),
        }
    }

    /// Index every live triple of `facts` in one pass.
    pub fn build(facts: &dyn FactStore<T>) -> Self {
        let start = Instant::now();
        let mut index = Self::new();
        for (slot, triple) in facts.iter() {
            index.add_to_index(triple, slot);
        }
        tracing::debug!(
            triples = facts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built eager triple index"
        );
        index
    }

    /// Index every live triple of `facts` with one scan per position.
    ///
    /// Subject and predicate scans run on scoped threads while the calling
    /// thread scans objects; the index is returned once all three joined.
    /// The result equals [`EagerIndex::build`] for the same facts.
    pub fn build_parallel(facts: &dyn FactStore<T>) -> Self {
        let _span = tracing::info_span!("build_parallel", triples = facts.len()).entered();
        let start = Instant::now();

        let (subjects, predicates, objects) = std::thread::scope(|s| {
            let subjects = s.spawn(move || index_position(facts, Position::Subject));
            let predicates = s.spawn(move || index_position(facts, Position::Predicate));
            let objects = index_position(facts, Position::Object);
            (
                join_position(subjects),
                join_position(predicates),
                objects,
            )
        });

        tracing::debug!(
            triples = facts.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built eager triple index in parallel"
        );
        Self {
            subjects,
            predicates,
            objects,
        }
    }

    /// Independent deep copy, for use with a cloned fact store.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn position(&self, position: Position) -> &PositionIndex<T> {
        match position {
            Position::Subject => &self.subjects,
            Position::Predicate => &self.predicates,
            Position::Object => &self.objects,
        }
    }

    fn position_mut(&mut self, position: Position) -> &mut PositionIndex<T> {
        match position {
            Position::Subject => &mut self.subjects,
            Position::Predicate => &mut self.predicates,
            Position::Object => &mut self.objects,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty() && self.predicates.is_empty() && self.objects.is_empty()
    }

    fn plan<'p>(
        pattern: &'p TriplePattern<T>,
        shape: MatchPattern,
    ) -> IndexResult<Lookup<'p, T>> {
        let bound = |position: Position| {
            pattern
                .term(position)
                .map(|term| (position, term))
                .ok_or(IndexError::UnsupportedPattern(shape))
        };
        let one = |position: Position| -> IndexResult<Lookup<'p, T>> {
            Ok(Lookup::One(position, bound(position)?.1))
        };
        let two = |a: Position, b: Position| -> IndexResult<Lookup<'p, T>> {
            Ok(Lookup::Two(bound(a)?, bound(b)?))
        };
        match shape {
            MatchPattern::SubAnyAny => one(Position::Subject),
            MatchPattern::AnyPreAny => one(Position::Predicate),
            MatchPattern::AnyAnyObj => one(Position::Object),
            MatchPattern::SubPreAny => two(Position::Subject, Position::Predicate),
            MatchPattern::AnyPreObj => two(Position::Predicate, Position::Object),
            MatchPattern::SubAnyObj => two(Position::Subject, Position::Object),
            MatchPattern::SubPreObj | MatchPattern::AnyAnyAny => {
                Err(IndexError::UnsupportedPattern(shape))
            }
        }
    }

    /// Both bitmaps of a two-position lookup, or `None` if either term is absent.
    fn pair(
        &self,
        (a_pos, a): (Position, &T),
        (b_pos, b): (Position, &T),
    ) -> Option<(&RoaringBitmap, &RoaringBitmap)> {
        let left = self.position(a_pos).get(a)?;
        let right = self.position(b_pos).get(b)?;
        Some((left, right))
    }
}

fn index_position<T: Term>(facts: &dyn FactStore<T>, position: Position) -> PositionIndex<T> {
    let mut index = PositionIndex::new(position);
    for (slot, triple) in facts.iter() {
        index.insert(triple.term(position), slot);
    }
    index
}

fn join_position<T: Term>(
    handle: std::thread::ScopedJoinHandle<'_, PositionIndex<T>>,
) -> PositionIndex<T> {
    match handle.join() {
        Ok(index) => index,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

impl<T: Term> TripleIndex<T> for EagerIndex<T> {
    fn add_to_index(&mut self, triple: &Triple<T>, slot: Slot) {
        for position in Position::ALL {
            self.position_mut(position)
                .insert(triple.term(position), slot);
        }
    }

    fn remove_from_index(&mut self, triple: &Triple<T>, slot: Slot) {
        for position in Position::ALL {
            if !self
                .position_mut(position)
                .remove(triple.term(position), slot)
            {
                tracing::trace!(
                    position = position.name(),
                    slot,
                    "ignoring removal of a term that is not indexed"
                );
            }
        }
    }

    fn clear_index(&mut self) {
        for position in Position::ALL {
            self.position_mut(position).clear();
        }
    }

    fn contains_match(
        &self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        _facts: &dyn FactStore<T>,
    ) -> IndexResult<bool> {
        Ok(match Self::plan(pattern, shape)? {
            Lookup::One(position, term) => self.position(position).get(term).is_some(),
            Lookup::Two(a, b) => self
                .pair(a, b)
                .is_some_and(|(left, right)| !left.is_disjoint(right)),
        })
    }

    fn stream_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        Ok(match Self::plan(pattern, shape)? {
            Lookup::One(position, term) => {
                MatchIter::from_bitmap(self.position(position).get_or_empty(term), facts)
            }
            Lookup::Two(a, b) => match self.pair(a, b) {
                Some((left, right)) => MatchIter::from_owned_bitmap(left & right, facts),
                None => MatchIter::empty(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact_store::SlotStore;

    fn store(triples: &[(&'static str, &'static str, &'static str)]) -> SlotStore<&'static str> {
        let mut store = SlotStore::new();
        for &t in triples {
            store.insert(t.into());
        }
        store
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        let facts = store(&[("s", "p", "o")]);
        let index = EagerIndex::build(&facts);
        let full = TriplePattern::from_triple(&Triple::new("s", "p", "o"));
        assert_eq!(
            index.contains_match(&full, MatchPattern::SubPreObj, &facts),
            Err(IndexError::UnsupportedPattern(MatchPattern::SubPreObj))
        );
        assert!(matches!(
            index.stream_match(&TriplePattern::any(), MatchPattern::AnyAnyAny, &facts),
            Err(IndexError::UnsupportedPattern(MatchPattern::AnyAnyAny))
        ));
        // Shape and pattern disagree: the subject is not actually bound.
        assert_eq!(
            index.contains_match(&TriplePattern::any(), MatchPattern::SubAnyAny, &facts),
            Err(IndexError::UnsupportedPattern(MatchPattern::SubAnyAny))
        );
    }

    #[test]
    fn missing_terms_yield_nothing() {
        let facts = store(&[("s", "p", "o")]);
        let index = EagerIndex::build(&facts);
        let pattern = TriplePattern::any().with_subject("x").with_predicate("p");
        assert_eq!(
            index.contains_match(&pattern, MatchPattern::SubPreAny, &facts),
            Ok(false)
        );
        let found = index
            .stream_match(&pattern, MatchPattern::SubPreAny, &facts)
            .expect("partial shape");
        assert_eq!(found.count(), 0);
    }

    #[test]
    fn double_add_is_idempotent() {
        let mut index = EagerIndex::new();
        let t = Triple::new("s", "p", "o");
        index.add_to_index(&t, 3);
        let once = index.clone();
        index.add_to_index(&t, 3);
        assert_eq!(index, once);
    }

    #[test]
    fn removing_unindexed_pair_is_ignored() {
        let facts = store(&[("s", "p", "o")]);
        let mut index = EagerIndex::build(&facts);
        let before = index.clone();
        index.remove_from_index(&Triple::new("x", "y", "z"), 0);
        index.remove_from_index(&Triple::new("s", "p", "o"), 42);
        assert_eq!(index, before);
    }

    #[test]
    fn parallel_build_equals_sequential_build() {
        let mut triples = Vec::new();
        for i in 0..200u32 {
            triples.push(Triple::new(i % 7, i % 3, i % 11));
        }
        let mut facts = SlotStore::new();
        for t in triples {
            facts.insert(t);
        }
        assert_eq!(EagerIndex::build(&facts), EagerIndex::build_parallel(&facts));
    }
}
