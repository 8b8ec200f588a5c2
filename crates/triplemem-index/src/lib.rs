//! Triplemem: pattern-matching indexes for an in-memory triple store
//!
//! A triple store keeps a canonical set of `(subject, predicate, object)`
//! facts and hands each live fact a stable integer **slot**. This crate is the
//! layer that answers "which facts match a pattern" without rescanning that
//! set on every query:
//!
//! 1. **Position indexes**: one `term -> {slots}` map per triple position,
//!    stored as Roaring bitmaps
//! 2. **Bitmap joins**: two-position patterns intersect two bitmaps
//! 3. **Pluggable strategies**: eager, lazy, minimal (scan) and manual
//!    (deferred) indexing behind one `TripleIndex` contract
//!
//! ## Module Organization
//!
//! - `pattern`: triple patterns and the eight-way binding classifier
//! - `position_index`: the per-position `term -> bitmap` map
//! - `eager_index` / `lazy_index` / `scan_index` / `manual_index`: strategies
//! - `strategy`: the `TripleIndex` trait and the `IndexingStrategy` enum
//! - `fact_store`: the slot-assigning fact store contract and `SlotStore`
//! - `store`: `TripleStore`, which routes mutations and queries
//! - `interner`: `TermId` and a concurrent string interner

pub mod config;
pub mod eager_index;
pub mod error;
pub mod fact_store;
pub mod interner;
pub mod lazy_index;
pub mod manual_index;
pub mod matches;
pub mod pattern;
pub mod position_index;
pub mod scan_index;
pub mod store;
pub mod strategy;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

pub use config::{ConfigError, IndexConfig, IndexingStrategyKind, INDEXING_STRATEGY_ENV};
pub use eager_index::EagerIndex;
pub use error::{IndexError, IndexResult};
pub use fact_store::{FactIter, FactStore, SlotStore};
pub use interner::{TermId, TermInterner};
pub use lazy_index::LazyIndex;
pub use manual_index::ManualIndex;
pub use matches::MatchIter;
pub use pattern::{MatchPattern, TriplePattern};
pub use position_index::PositionIndex;
pub use scan_index::MinimalIndex;
pub use store::TripleStore;
pub use strategy::{IndexingStrategy, TripleIndex};

// ============================================================================
// Terms, Triples, Slots
// ============================================================================

/// Stable integer handle of one live triple inside a fact store.
pub type Slot = u32;

/// A subject, predicate or object value.
///
/// Terms are opaque to the index layer: only equality and hashing are used.
pub trait Term: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Term for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// One of the three positions of a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Position {
    pub const ALL: [Position; 3] = [Position::Subject, Position::Predicate, Position::Object];

    pub fn name(self) -> &'static str {
        match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
        }
    }
}

/// A `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple<T> {
    pub subject: T,
    pub predicate: T,
    pub object: T,
}

impl<T> Triple<T> {
    pub fn new(subject: T, predicate: T, object: T) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The term stored at `position`.
    pub fn term(&self, position: Position) -> &T {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }
}

impl<T> From<(T, T, T)> for Triple<T> {
    fn from((subject, predicate, object): (T, T, T)) -> Self {
        Self::new(subject, predicate, object)
    }
}
