//! ManualIndex: placeholder while the caller defers indexing.
//!
//! Typical use is a bulk load: insert everything without paying for index
//! maintenance, then install an eager index in one build. Until then every
//! query fails with [`IndexError::NotInitialized`], so an unbuilt index is
//! never mistaken for an empty one.

use crate::error::{IndexError, IndexResult};
use crate::fact_store::FactStore;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::strategy::TripleIndex;
use crate::{Slot, Term, Triple};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualIndex;

impl<T: Term> TripleIndex<T> for ManualIndex {
    fn add_to_index(&mut self, _triple: &Triple<T>, _slot: Slot) {}

    fn remove_from_index(&mut self, _triple: &Triple<T>, _slot: Slot) {}

    fn clear_index(&mut self) {}

    fn contains_match(
        &self,
        _pattern: &TriplePattern<T>,
        _shape: MatchPattern,
        _facts: &dyn FactStore<T>,
    ) -> IndexResult<bool> {
        Err(IndexError::NotInitialized)
    }

    fn stream_match<'a>(
        &'a self,
        _pattern: &TriplePattern<T>,
        _shape: MatchPattern,
        _facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        Err(IndexError::NotInitialized)
    }
}
