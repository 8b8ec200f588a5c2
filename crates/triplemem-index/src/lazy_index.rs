//! LazyIndex: an [`EagerIndex`] that is only built when first queried.
//!
//! Before the first query mutations are not tracked at all (the build reads
//! the store as it is at that moment). After the build the index is
//! maintained exactly like an eager one. Clearing drops the built index.

use std::sync::OnceLock;

use crate::eager_index::EagerIndex;
use crate::error::IndexResult;
use crate::fact_store::FactStore;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::strategy::TripleIndex;
use crate::{Slot, Term, Triple};

#[derive(Debug, Clone)]
pub struct LazyIndex<T: Term> {
    built: OnceLock<EagerIndex<T>>,
    parallel: bool,
}

impl<T: Term> Default for LazyIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Term> LazyIndex<T> {
    pub fn new() -> Self {
        Self {
            built: OnceLock::new(),
            parallel: false,
        }
    }

    /// Like [`LazyIndex::new`], but the first query builds with
    /// [`EagerIndex::build_parallel`].
    pub fn new_parallel() -> Self {
        Self {
            built: OnceLock::new(),
            parallel: true,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }

    pub fn built(&self) -> Option<&EagerIndex<T>> {
        self.built.get()
    }

    /// The eager index, building it from `facts` if this is the first use.
    pub fn ensure_built(&self, facts: &dyn FactStore<T>) -> &EagerIndex<T> {
        self.built.get_or_init(|| {
            tracing::debug!(parallel = self.parallel, "building lazy triple index on first query");
            if self.parallel {
                EagerIndex::build_parallel(facts)
            } else {
                EagerIndex::build(facts)
            }
        })
    }

    /// Take the built index out, leaving this one unbuilt.
    pub fn into_built(self) -> Option<EagerIndex<T>> {
        self.built.into_inner()
    }
}

impl<T: Term> TripleIndex<T> for LazyIndex<T> {
    fn add_to_index(&mut self, triple: &Triple<T>, slot: Slot) {
        if let Some(index) = self.built.get_mut() {
            index.add_to_index(triple, slot);
        }
    }

    fn remove_from_index(&mut self, triple: &Triple<T>, slot: Slot) {
        if let Some(index) = self.built.get_mut() {
            index.remove_from_index(triple, slot);
        }
    }

    fn clear_index(&mut self) {
        self.built = OnceLock::new();
    }

    fn contains_match(
        &self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &dyn FactStore<T>,
    ) -> IndexResult<bool> {
        self.ensure_built(facts).contains_match(pattern, shape, facts)
    }

    fn stream_match<'a>(
        &'a self,
        pattern: &TriplePattern<T>,
        shape: MatchPattern,
        facts: &'a dyn FactStore<T>,
    ) -> IndexResult<MatchIter<'a, T>> {
        self.ensure_built(facts).stream_match(pattern, shape, facts)
    }
}
