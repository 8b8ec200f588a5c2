//! TripleStore: a slot store plus its active indexing strategy.
//!
//! The store owns the canonical triple set and keeps the strategy in step with
//! it. Queries are classified first: fully bound patterns are a direct
//! membership check, fully unbound ones a full scan, and only the six partial
//! shapes reach the strategy.

use crate::config::{ConfigError, IndexConfig, IndexingStrategyKind};
use crate::eager_index::EagerIndex;
use crate::error::IndexResult;
use crate::fact_store::{FactStore, SlotStore};
use crate::manual_index::ManualIndex;
use crate::matches::MatchIter;
use crate::pattern::{MatchPattern, TriplePattern};
use crate::strategy::{IndexingStrategy, TripleIndex};
use crate::{Term, Triple};

/// In-memory triple set with pattern indexes.
///
/// `Clone` produces an independent copy: facts and index are duplicated, and
/// mutating one copy never shows in the other.
#[derive(Debug, Clone)]
pub struct TripleStore<T: Term> {
    facts: SlotStore<T>,
    index: IndexingStrategy<T>,
}

impl<T: Term> Default for TripleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Term> TripleStore<T> {
    /// Empty store with eager indexing.
    pub fn new() -> Self {
        Self::with_config(&IndexConfig::default())
    }

    pub fn with_config(config: &IndexConfig) -> Self {
        Self::with_strategy(config.strategy)
    }

    pub fn with_strategy(kind: IndexingStrategyKind) -> Self {
        let facts = SlotStore::new();
        let index = IndexingStrategy::for_kind(kind, &facts);
        Self { facts, index }
    }

    /// Empty store configured from the environment (see [`IndexConfig::from_env`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_config(&IndexConfig::from_env()?))
    }

    /// Bulk-load `triples`, then build the index once for `kind`.
    pub fn from_triples(
        triples: impl IntoIterator<Item = Triple<T>>,
        kind: IndexingStrategyKind,
    ) -> Self {
        let mut facts = SlotStore::new();
        for triple in triples {
            facts.insert(triple);
        }
        let index = IndexingStrategy::for_kind(kind, &facts);
        Self { facts, index }
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Add a triple. Returns false if it was already present or the slot
    /// space is exhausted.
    pub fn add(&mut self, triple: Triple<T>) -> bool {
        let Some(slot) = self.facts.insert(triple) else {
            return false;
        };
        if let Some(stored) = self.facts.get(slot) {
            self.index.add_to_index(stored, slot);
        }
        true
    }

    /// Remove a triple. Returns false if it was not present.
    pub fn remove(&mut self, triple: &Triple<T>) -> bool {
        let Some(slot) = self.facts.remove(triple) else {
            return false;
        };
        self.index.remove_from_index(triple, slot);
        true
    }

    /// Remove every triple. The strategy stays, with an empty index.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.index.clear_index();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn contains(&self, triple: &Triple<T>) -> bool {
        self.facts.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Does any triple match `pattern`?
    pub fn contains_match(&self, pattern: &TriplePattern<T>) -> IndexResult<bool> {
        match pattern.classify() {
            MatchPattern::SubPreObj => Ok(self.lookup_exact(pattern).is_some()),
            MatchPattern::AnyAnyAny => Ok(!self.is_empty()),
            shape => self.index.contains_match(pattern, shape, &self.facts),
        }
    }

    /// Closable iterator over the triples matching `pattern`.
    pub fn find(&self, pattern: &TriplePattern<T>) -> IndexResult<MatchIter<'_, T>> {
        match pattern.classify() {
            MatchPattern::SubPreObj => Ok(MatchIter::single(self.lookup_exact(pattern))),
            MatchPattern::AnyAnyAny => Ok(MatchIter::scan(&self.facts, TriplePattern::any())),
            shape => self.index.find_match(pattern, shape, &self.facts),
        }
    }

    /// Lazy sequence of the triples matching `pattern`.
    pub fn stream(&self, pattern: &TriplePattern<T>) -> IndexResult<MatchIter<'_, T>> {
        match pattern.classify() {
            MatchPattern::SubPreObj => Ok(MatchIter::single(self.lookup_exact(pattern))),
            MatchPattern::AnyAnyAny => Ok(MatchIter::scan(&self.facts, TriplePattern::any())),
            shape => self.index.stream_match(pattern, shape, &self.facts),
        }
    }

    fn lookup_exact(&self, pattern: &TriplePattern<T>) -> Option<&Triple<T>> {
        let slot = self.facts.slot_of(&pattern.as_triple()?)?;
        self.facts.get(slot)
    }

    // ------------------------------------------------------------------------
    // Indexing policy
    // ------------------------------------------------------------------------

    pub fn facts(&self) -> &SlotStore<T> {
        &self.facts
    }

    pub fn index(&self) -> &IndexingStrategy<T> {
        &self.index
    }

    pub fn indexing_strategy_kind(&self) -> IndexingStrategyKind {
        self.index.kind()
    }

    /// Replace the indexing strategy, building whatever `kind` builds eagerly.
    pub fn set_indexing_strategy(&mut self, kind: IndexingStrategyKind) {
        tracing::debug!(
            from = %self.index.kind(),
            to = %kind,
            triples = self.facts.len(),
            "switching indexing strategy"
        );
        self.index = IndexingStrategy::for_kind(kind, &self.facts);
    }

    /// True when partial-pattern queries are served from built indexes.
    pub fn is_index_initialized(&self) -> bool {
        self.index.is_initialized()
    }

    /// Install an eager index built from the current triples.
    ///
    /// An already-built eager or lazy index is kept as is.
    pub fn initialize_index(&mut self) {
        self.install_eager(false);
    }

    /// Like [`TripleStore::initialize_index`], with a parallel build.
    pub fn initialize_index_parallel(&mut self) {
        self.install_eager(true);
    }

    fn install_eager(&mut self, parallel: bool) {
        let build = |facts: &SlotStore<T>| {
            if parallel {
                EagerIndex::build_parallel(facts)
            } else {
                EagerIndex::build(facts)
            }
        };
        let current = std::mem::replace(&mut self.index, IndexingStrategy::Manual(ManualIndex));
        self.index = match current {
            IndexingStrategy::Eager { .. } => current,
            IndexingStrategy::Lazy(lazy) => {
                let built_parallel = lazy.is_parallel();
                match lazy.into_built() {
                    Some(index) => IndexingStrategy::eager_built(index, built_parallel),
                    None => IndexingStrategy::eager_built(build(&self.facts), parallel),
                }
            }
            IndexingStrategy::Minimal(_) | IndexingStrategy::Manual(_) => {
                IndexingStrategy::eager_built(build(&self.facts), parallel)
            }
        };
    }

    /// Drop the built position indexes, keeping the triples.
    ///
    /// Lazy indexing returns to its unbuilt state. Eager indexing falls back
    /// to manual, so queries fail until [`TripleStore::initialize_index`]
    /// runs again instead of silently answering from an empty index.
    pub fn clear_index(&mut self) {
        if matches!(self.index, IndexingStrategy::Eager { .. }) {
            tracing::debug!("dropping eager index; store is now manually indexed");
            self.index = IndexingStrategy::Manual(ManualIndex);
            return;
        }
        self.index.clear_index();
    }
}
