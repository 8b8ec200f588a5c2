//! Indexing configuration.
//!
//! The strategy can be chosen in code, deserialized from a config document, or
//! taken from the `TRIPLEMEM_INDEXING_STRATEGY` environment variable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INDEXING_STRATEGY_ENV: &str = "TRIPLEMEM_INDEXING_STRATEGY";

/// Which indexing policy a store runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexingStrategyKind {
    /// Position indexes maintained on every mutation; initial build is sequential.
    #[default]
    Eager,
    /// Like `Eager`, but the initial build scans the three positions in parallel.
    EagerParallel,
    /// Position indexes built on the first query.
    Lazy,
    /// Like `Lazy`, with a parallel build.
    LazyParallel,
    /// No index; queries scan.
    Minimal,
    /// No index; queries fail until an index is initialized.
    Manual,
}

impl IndexingStrategyKind {
    pub const ALL: [IndexingStrategyKind; 6] = [
        IndexingStrategyKind::Eager,
        IndexingStrategyKind::EagerParallel,
        IndexingStrategyKind::Lazy,
        IndexingStrategyKind::LazyParallel,
        IndexingStrategyKind::Minimal,
        IndexingStrategyKind::Manual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexingStrategyKind::Eager => "eager",
            IndexingStrategyKind::EagerParallel => "eager-parallel",
            IndexingStrategyKind::Lazy => "lazy",
            IndexingStrategyKind::LazyParallel => "lazy-parallel",
            IndexingStrategyKind::Minimal => "minimal",
            IndexingStrategyKind::Manual => "manual",
        }
    }
}

impl fmt::Display for IndexingStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexingStrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown indexing strategy `{0}` (expected: eager, eager-parallel, lazy, lazy-parallel, minimal, manual)")]
    UnknownStrategy(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub strategy: IndexingStrategyKind,
}

impl IndexConfig {
    pub fn new(strategy: IndexingStrategyKind) -> Self {
        Self { strategy }
    }

    /// Read the strategy from [`INDEXING_STRATEGY_ENV`]; unset or empty means default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var(INDEXING_STRATEGY_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Result<Self, ConfigError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(value) => Ok(Self::new(value.parse()?)),
        }
    }
}
