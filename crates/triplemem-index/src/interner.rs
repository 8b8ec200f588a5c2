//! Term interning: strings stored once, referenced by a `u32` id.
//!
//! Index keys are cheapest when terms are small `Copy` values, so text-based
//! callers (the CLI, tests) intern every term and build `Triple<TermId>`s.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::pattern::TriplePattern;
use crate::Triple;

/// Token for an unbound position in textual patterns.
pub const ANY_TOKEN: &str = "??";

/// Interned term id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(u32);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Concurrent string interner.
pub struct TermInterner {
    str_to_id: DashMap<String, TermId>,
    id_to_str: DashMap<TermId, String>,
    next_id: AtomicU32,
}

impl TermInterner {
    pub fn new() -> Self {
        Self {
            str_to_id: DashMap::new(),
            id_to_str: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Intern a string, returning its id.
    pub fn intern(&self, s: &str) -> TermId {
        if let Some(id) = self.str_to_id.get(s) {
            return *id;
        }
        // `entry` re-checks under the shard lock, so racing callers agree on one id.
        let id = *self
            .str_to_id
            .entry(s.to_string())
            .or_insert_with(|| TermId(self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.id_to_str.entry(id).or_insert_with(|| s.to_string());
        id
    }

    /// Existing id for `s`, without inserting.
    pub fn id_of(&self, s: &str) -> Option<TermId> {
        self.str_to_id.get(s).map(|id| *id)
    }

    pub fn lookup(&self, id: TermId) -> Option<String> {
        self.id_to_str.get(&id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.str_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.str_to_id.is_empty()
    }

    pub fn triple(&self, subject: &str, predicate: &str, object: &str) -> Triple<TermId> {
        Triple::new(
            self.intern(subject),
            self.intern(predicate),
            self.intern(object),
        )
    }

    /// Parse `"s p o"`; returns `None` unless there are exactly three tokens.
    pub fn parse_triple(&self, line: &str) -> Option<Triple<TermId>> {
        let mut tokens = line.split_whitespace();
        let (s, p, o) = (tokens.next()?, tokens.next()?, tokens.next()?);
        if tokens.next().is_some() {
            return None;
        }
        Some(self.triple(s, p, o))
    }

    /// Parse `"s p o"` where `??` marks an unbound position.
    ///
    /// Bound terms are looked up, not interned: a term the interner has never
    /// seen yields `Some(None)`, since no stored triple can match it.
    pub fn parse_pattern(&self, line: &str) -> Option<Option<TriplePattern<TermId>>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [s, p, o] = tokens.as_slice() else {
            return None;
        };
        let mut terms = [None, None, None];
        for (term, token) in terms.iter_mut().zip([s, p, o]) {
            if *token == ANY_TOKEN {
                continue;
            }
            match self.id_of(token) {
                Some(id) => *term = Some(id),
                None => return Some(None),
            }
        }
        let [s, p, o] = terms;
        Some(Some(TriplePattern::new(s, p, o)))
    }

    /// Parse `"s p o"` like [`TermInterner::parse_pattern`], interning bound
    /// terms instead of looking them up.
    ///
    /// An unseen term gets a fresh id that no stored triple uses, so the
    /// pattern still reaches the store and its indexing strategy.
    pub fn intern_pattern(&self, line: &str) -> Option<TriplePattern<TermId>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [s, p, o] = tokens.as_slice() else {
            return None;
        };
        let term = |token: &str| (token != ANY_TOKEN).then(|| self.intern(token));
        Some(TriplePattern::new(term(*s), term(*p), term(*o)))
    }

    /// Render a triple back to `"s p o"`.
    pub fn render(&self, triple: &Triple<TermId>) -> String {
        let name = |id: TermId| self.lookup(id).unwrap_or_else(|| id.to_string());
        format!(
            "{} {} {}",
            name(triple.subject),
            name(triple.predicate),
            name(triple.object)
        )
    }
}

impl Default for TermInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::MatchPattern;

    #[test]
    fn intern_is_stable() {
        let interner = TermInterner::new();
        let a = interner.intern("a");
        assert_eq!(interner.intern("a"), a);
        assert_ne!(interner.intern("b"), a);
        assert_eq!(interner.lookup(a).as_deref(), Some("a"));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn parse_pattern_marks_unbound_positions() {
        let interner = TermInterner::new();
        let t = interner.parse_triple("x R y").expect("three tokens");
        assert_eq!(interner.render(&t), "x R y");

        let pattern = interner
            .parse_pattern("x ?? y")
            .expect("three tokens")
            .expect("known terms");
        assert_eq!(pattern.classify(), MatchPattern::SubAnyObj);
        assert!(pattern.matches(&t));

        assert_eq!(interner.parse_pattern("zzz ?? ??"), Some(None));
        assert_eq!(interner.parse_pattern("x R"), None);
        assert_eq!(interner.parse_triple("x R y z"), None);
    }

    #[test]
    fn intern_pattern_keeps_unseen_terms_bound() {
        let interner = TermInterner::new();
        interner.parse_triple("x R y").expect("three tokens");

        let pattern = interner.intern_pattern("zzz ?? ??").expect("three tokens");
        assert_eq!(pattern.classify(), MatchPattern::SubAnyAny);
        assert_eq!(pattern.subject, interner.id_of("zzz"));
        assert_eq!(interner.len(), 4);

        let known = interner.intern_pattern("x R ??").expect("three tokens");
        assert_eq!(Some(known), interner.parse_pattern("x R ??").flatten());
        assert_eq!(interner.intern_pattern("?? ??"), None);
    }
}
