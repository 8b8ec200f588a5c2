//! The indexing contract and the closed set of strategies implementing it.

use crate::config::IndexingStrategyKind;
use crate::eager_index::EagerIndex;
use crate::error::IndexResult;
use crate::fact_store::FactStore;
use crate::lazy_index::LazyIndex;
use crate::manual_index::ManualIndex;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::scan_index::MinimalIndex;
use crate::{Slot, Term, Triple};

/// Pattern index kept alongside a fact store.
///
/// The owning store forwards every insertion and removal together with the
/// triple's slot, and forwards queries for the six partial shapes
/// (see [`MatchPattern::is_partial`]) together with a reference to itself.
pub trait TripleIndex<T: Term> {
    /// Index `triple` under `slot`. Repeating the same pair is a no-op.
    fn add_to_index(&mut self, triple: &Triple<T>, slot: Slot);

    /// Forget `triple` under `slot`. Pairs that were never indexed are ignored.
    fn remove_from_index(&mut self, triple: &Triple<T>, slot: Slot);

    fn clear_index(&mut self);

    fn contains_match(
        &self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &dyn FactStore<T>,
    ) -> IndexResult<bool>;

    fn stream_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>>;

    /// Same matches as [`TripleIndex::stream_match`], handed out as a closable
    /// iterator (see [`MatchIter::close`]).
    fn find_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        self.stream_match(pattern, shape, facts)
    }
}

/// Active indexing policy of a store.
#[derive(Debug, Clone)]
pub enum IndexingStrategy<T: Term> {
    /// Three position indexes, always current. `parallel` records how the
    /// index was built.
    Eager { index: EagerIndex<T>, parallel: bool },
    /// Eager index built on first query.
    Lazy(LazyIndex<T>),
    /// No index; queries scan the store.
    Minimal(MinimalIndex),
    /// No index; queries fail until a real strategy is installed.
    Manual(ManualIndex),
}

impl<T: Term> IndexingStrategy<T> {
    /// Create the strategy for `kind`, building eagerly from `facts` if needed.
    pub fn for_kind(kind: IndexingStrategyKind, facts: &dyn FactStore<T>) -> Self {
        match kind {
            IndexingStrategyKind::Eager => Self::eager_built(EagerIndex::build(facts), false),
            IndexingStrategyKind::EagerParallel => {
                Self::eager_built(EagerIndex::build_parallel(facts), true)
            }
            IndexingStrategyKind::Lazy => Self::Lazy(LazyIndex::new()),
            IndexingStrategyKind::LazyParallel => Self::Lazy(LazyIndex::new_parallel()),
            IndexingStrategyKind::Minimal => Self::Minimal(MinimalIndex),
            IndexingStrategyKind::Manual => Self::Manual(ManualIndex),
        }
    }

    pub fn eager_built(index: EagerIndex<T>, parallel: bool) -> Self {
        Self::Eager { index, parallel }
    }

    pub fn kind(&self) -> IndexingStrategyKind {
        match self {
            Self::Eager { parallel: true, .. } => IndexingStrategyKind::EagerParallel,
            Self::Eager { .. } => IndexingStrategyKind::Eager,
            Self::Lazy(lazy) if lazy.is_parallel() => IndexingStrategyKind::LazyParallel,
            Self::Lazy(_) => IndexingStrategyKind::Lazy,
            Self::Minimal(_) => IndexingStrategyKind::Minimal,
            Self::Manual(_) => IndexingStrategyKind::Manual,
        }
    }

    /// True when queries are answered from built position indexes.
    pub fn is_initialized(&self) -> bool {
        match self {
            Self::Eager { .. } => true,
            Self::Lazy(lazy) => lazy.is_built(),
            Self::Minimal(_) | Self::Manual(_) => false,
        }
    }

    /// The built eager index, if there is one.
    pub fn eager(&self) -> Option<&EagerIndex<T>> {
        match self {
            Self::Eager { index, .. } => Some(index),
            Self::Lazy(lazy) => lazy.built(),
            Self::Minimal(_) | Self::Manual(_) => None,
        }
    }
}

impl<T: Term> TripleIndex<T> for IndexingStrategy<T> {
    fn add_to_index(&mut self, triple: &Triple<T>, slot: Slot) {
        match self {
            Self::Eager { index, .. } => index.add_to_index(triple, slot),
            Self::Lazy(index) => index.add_to_index(triple, slot),
            Self::Minimal(index) => index.add_to_index(triple, slot),
            Self::Manual(index) => index.add_to_index(triple, slot),
        }
    }

    fn remove_from_index(&mut self, triple: &Triple<T>, slot: Slot) {
        match self {
            Self::Eager { index, .. } => index.remove_from_index(triple, slot),
            Self::Lazy(index) => index.remove_from_index(triple, slot),
            Self::Minimal(index) => index.remove_from_index(triple, slot),
            Self::Manual(index) => index.remove_from_index(triple, slot),
        }
    }

    fn clear_index(&mut self) {
        match self {
            Self::Eager { index, .. } => index.clear_index(),
            Self::Lazy(index) => TripleIndex::<T>::clear_index(index),
            Self::Minimal(index) => TripleIndex::<T>::clear_index(index),
            Self::Manual(index) => TripleIndex::<T>::clear_index(index),
        }
    }

    fn contains_match(
        &self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &dyn FactStore<T>,
    ) -> IndexResult<bool> {
        match self {
            Self::Eager { index, .. } => index.contains_match(pattern, shape, facts),
            Self::Lazy(index) => index.contains_match(pattern, shape, facts),
            Self::Minimal(index) => index.contains_match(pattern, shape, facts),
            Self::Manual(index) => index.contains_match(pattern, shape, facts),
        }
    }

    fn stream_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        match self {
            Self::Eager { index, .. } => index.stream_match(pattern, shape, facts),
            Self::Lazy(index) => index.stream_match(pattern, shape, facts),
            Self::Minimal(index) => index.stream_match(pattern, shape, facts),
            Self::Manual(index) => index.stream_match(pattern, shape, facts),
        }
    }
}
