use thiserror::Error;

use crate::pattern::MatchPattern;

pub type IndexResult<T> = Result<T, IndexError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Queried under manual indexing before a real strategy was installed.
    #[error("index not initialized: install an indexing strategy (or call initialize_index) before querying")]
    NotInitialized,

    /// A pattern class the strategy cannot answer reached it. Fully bound and
    /// fully unbound patterns belong to the owning store.
    #[error("unsupported match pattern {0} for an index lookup")]
    UnsupportedPattern(MatchPattern),
}
