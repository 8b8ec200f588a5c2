//! Integration tests for the triple store end to end
//!
//! These exercise the public API the way an embedding application would:
//! - loading facts and querying every pattern shape
//! - switching, initializing and clearing indexing strategies at runtime
//! - cloning stores and sharing one store between reader threads
//!
//! Run with: cargo test --test integration_tests

use anyhow::Result;
use triplemem_index::{
    IndexConfig, IndexError, IndexingStrategyKind, MatchPattern, TermId, TermInterner, Triple,
    TriplePattern, TripleStore, INDEXING_STRATEGY_ENV,
};

const FAMILY: &[&str] = &[
    "alice parent bob",
    "alice parent carol",
    "bob parent dave",
    "carol parent erin",
    "alice knows bob",
    "bob knows carol",
    "dave likes erin",
];

fn load(kind: IndexingStrategyKind) -> (TermInterner, TripleStore<TermId>) {
    let terms = TermInterner::new();
    let triples: Vec<Triple<TermId>> = FAMILY
        .iter()
        .map(|line| terms.parse_triple(line).expect("fixture triple"))
        .collect();
    let store = TripleStore::from_triples(triples, kind);
    (terms, store)
}

fn query(terms: &TermInterner, store: &TripleStore<TermId>, pattern: &str) -> Result<Vec<String>> {
    let pattern = terms.intern_pattern(pattern).expect("three tokens");
    let mut found: Vec<String> = store.find(&pattern)?.map(|t| terms.render(t)).collect();
    found.sort();
    Ok(found)
}

// ============================================================================
// Queries across strategies
// ============================================================================

#[test]
fn test_every_shape_under_every_queryable_strategy() -> Result<()> {
    let cases: &[(&str, &[&str])] = &[
        ("alice ?? ??", &["alice knows bob", "alice parent bob", "alice parent carol"]),
        ("?? knows ??", &["alice knows bob", "bob knows carol"]),
        ("?? ?? erin", &["carol parent erin", "dave likes erin"]),
        ("alice parent ??", &["alice parent bob", "alice parent carol"]),
        ("?? parent dave", &["bob parent dave"]),
        ("alice ?? bob", &["alice knows bob", "alice parent bob"]),
        ("bob parent dave", &["bob parent dave"]),
        ("bob parent erin", &[]),
        ("zed ?? ??", &[]),
    ];

    for kind in IndexingStrategyKind::ALL {
        if kind == IndexingStrategyKind::Manual {
            continue;
        }
        let (terms, store) = load(kind);
        for (pattern, expected) in cases {
            assert_eq!(query(&terms, &store, pattern)?, *expected, "{kind}: {pattern}");
        }
        assert_eq!(query(&terms, &store, "?? ?? ??")?.len(), FAMILY.len(), "{kind}");
    }
    Ok(())
}

#[test]
fn test_contains_match_agrees_with_find() -> Result<()> {
    let (terms, store) = load(IndexingStrategyKind::Eager);
    for pattern in ["alice ?? ??", "?? likes ??", "dave ?? bob", "?? knows erin"] {
        let parsed = terms
            .parse_pattern(pattern)
            .flatten()
            .expect("known terms");
        let found = store.find(&parsed)?.next().is_some();
        assert_eq!(store.contains_match(&parsed)?, found, "{pattern}");
    }
    Ok(())
}

// ============================================================================
// Strategy lifecycle
// ============================================================================

#[test]
fn test_manual_store_fails_until_initialized() -> Result<()> {
    let (terms, mut store) = load(IndexingStrategyKind::Manual);
    let pattern = terms
        .parse_pattern("alice ?? ??")
        .flatten()
        .expect("known terms");

    assert_eq!(store.contains_match(&pattern), Err(IndexError::NotInitialized));
    let unseen = query(&terms, &store, "zed ?? ??").unwrap_err();
    assert_eq!(unseen.downcast_ref::<IndexError>(), Some(&IndexError::NotInitialized));
    store.add(terms.triple("alice", "likes", "erin"));
    assert!(matches!(store.find(&pattern), Err(IndexError::NotInitialized)));

    store.initialize_index();
    assert!(store.is_index_initialized());
    assert_eq!(store.find(&pattern)?.count(), 4);
    assert!(query(&terms, &store, "zed ?? ??")?.is_empty());
    Ok(())
}

#[test]
fn test_lazy_store_builds_on_first_partial_query() -> Result<()> {
    let (terms, mut store) = load(IndexingStrategyKind::Lazy);
    assert!(!store.is_index_initialized());

    // Exact and full-scan lookups never touch the index.
    assert!(store.contains_match(&TriplePattern::any())?);
    let exact = TriplePattern::from_triple(&terms.triple("bob", "parent", "dave"));
    assert!(store.contains_match(&exact)?);
    assert!(!store.is_index_initialized());

    assert_eq!(query(&terms, &store, "?? parent ??")?.len(), 4);
    assert!(store.is_index_initialized());

    store.remove(&terms.triple("bob", "parent", "dave"));
    store.add(terms.triple("erin", "parent", "frank"));
    assert_eq!(
        query(&terms, &store, "?? parent ??")?,
        vec![
            "alice parent bob",
            "alice parent carol",
            "carol parent erin",
            "erin parent frank",
        ]
    );

    store.clear_index();
    assert!(!store.is_index_initialized());
    assert_eq!(query(&terms, &store, "erin ?? ??")?, vec!["erin parent frank"]);
    Ok(())
}

#[test]
fn test_switching_strategies_keeps_answers() -> Result<()> {
    let (terms, mut store) = load(IndexingStrategyKind::Minimal);
    let baseline = query(&terms, &store, "?? parent ??")?;

    for kind in [
        IndexingStrategyKind::EagerParallel,
        IndexingStrategyKind::LazyParallel,
        IndexingStrategyKind::Eager,
        IndexingStrategyKind::Minimal,
    ] {
        store.set_indexing_strategy(kind);
        assert_eq!(query(&terms, &store, "?? parent ??")?, baseline, "{kind}");
    }

    store.set_indexing_strategy(IndexingStrategyKind::Manual);
    assert!(query(&terms, &store, "?? parent ??").is_err());
    store.initialize_index_parallel();
    assert_eq!(store.indexing_strategy_kind(), IndexingStrategyKind::EagerParallel);
    assert_eq!(query(&terms, &store, "?? parent ??")?, baseline);
    Ok(())
}

#[test]
fn test_clear_keeps_strategy_and_empties_answers() -> Result<()> {
    let (terms, mut store) = load(IndexingStrategyKind::Eager);
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.indexing_strategy_kind(), IndexingStrategyKind::Eager);
    assert!(query(&terms, &store, "alice ?? ??")?.is_empty());

    store.add(terms.triple("alice", "parent", "bob"));
    assert_eq!(query(&terms, &store, "alice ?? ??")?, vec!["alice parent bob"]);
    Ok(())
}

// ============================================================================
// Copies and concurrent readers
// ============================================================================

#[test]
fn test_cloned_store_is_independent() -> Result<()> {
    let (terms, mut original) = load(IndexingStrategyKind::Eager);
    let mut copy = original.clone();

    original.remove(&terms.triple("alice", "knows", "bob"));
    copy.add(terms.triple("erin", "knows", "alice"));

    assert_eq!(query(&terms, &original, "?? knows ??")?, vec!["bob knows carol"]);
    assert_eq!(
        query(&terms, &copy, "?? knows ??")?,
        vec!["alice knows bob", "bob knows carol", "erin knows alice"]
    );
    Ok(())
}

#[test]
fn test_readers_share_one_store() -> Result<()> {
    let (terms, store) = load(IndexingStrategyKind::LazyParallel);
    let expected = query(&terms, &store, "alice ?? ??")?;

    let results: Vec<Vec<String>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| query(&terms, &store, "alice ?? ??")))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("reader thread"))
            .collect::<Result<_>>()
    })?;

    for found in results {
        assert_eq!(found, expected);
    }
    Ok(())
}

// ============================================================================
// Non-interned terms and configuration
// ============================================================================

#[test]
fn test_string_terms_work_without_an_interner() -> Result<()> {
    let mut store: TripleStore<String> = TripleStore::new();
    store.add(Triple::new("x".into(), "type".into(), "Tool".into()));
    store.add(Triple::new("y".into(), "type".into(), "Material".into()));

    let pattern = TriplePattern::any().with_predicate("type".to_string());
    assert_eq!(pattern.classify(), MatchPattern::AnyPreAny);
    assert_eq!(store.stream(&pattern)?.count(), 2);

    let mut matches = store.find(&pattern)?;
    assert!(matches.next().is_some());
    matches.close();
    assert_eq!(store.len(), 2);
    Ok(())
}

#[test]
fn test_config_documents_select_strategies() -> Result<()> {
    let config: IndexConfig = serde_json::from_str(r#"{ "strategy": "lazy-parallel" }"#)?;
    let store: TripleStore<u32> = TripleStore::with_config(&config);
    assert_eq!(store.indexing_strategy_kind(), IndexingStrategyKind::LazyParallel);

    assert!(serde_json::from_str::<IndexConfig>(r#"{ "strategy": "bitmap" }"#).is_err());
    assert!(serde_json::from_str::<IndexConfig>(r#"{ "mode": "eager" }"#).is_err());
    assert_eq!(INDEXING_STRATEGY_ENV, "TRIPLEMEM_INDEXING_STRATEGY");
    Ok(())
}
