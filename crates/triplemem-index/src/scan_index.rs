//! MinimalIndex: no index at all; every query scans the fact store.
//!
//! Mutations cost nothing, queries cost a full pass over the live triples.

use crate::error::IndexResult;
use crate::fact_store::FactStore;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::strategy::TripleIndex;
use crate::{Slot, Term, Triple};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinimalIndex;

impl<T: Term> TripleIndex<T> for MinimalIndex {
    fn add_to_index(&mut self, _triple: &Triple<T>, _slot: Slot) {}

    fn remove_from_index(&mut self, _triple: &Triple<T>, _slot: Slot) {}

    fn clear_index(&mut self) {}

    fn contains_match(
        &self,
        pattern: &TriplePattern<T>,
        _shape: MatchPattern,
        facts: &dyn FactStore<T>,
    ) -> IndexResult<bool> {
        Ok(facts.iter().any(|(_, triple)| pattern.matches(triple)))
    }

    fn stream_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        _shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        Ok(MatchIter::scan(facts, pattern.clone()))
    }
}
