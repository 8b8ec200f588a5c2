//! Triple patterns and the binding-shape classifier.
//!
//! A pattern fixes zero to three positions of a triple. The classifier maps a
//! pattern onto one of eight shapes, named by which positions are bound:
//!
//! | shape        | bound positions         | answered by        |
//! |--------------|-------------------------|--------------------|
//! | `SubPreObj`  | subject, predicate, object | the fact store  |
//! | `SubPreAny`  | subject, predicate      | index strategy     |
//! | `SubAnyObj`  | subject, object         | index strategy     |
//! | `SubAnyAny`  | subject                 | index strategy     |
//! | `AnyPreObj`  | predicate, object       | index strategy     |
//! | `AnyPreAny`  | predicate               | index strategy     |
//! | `AnyAnyObj`  | object                  | index strategy     |
//! | `AnyAnyAny`  | none                    | the fact store     |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Position, Term, Triple};

/// A triple where each position is either a concrete term or unbound (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePattern<T> {
    pub subject: Option<T>,
    pub predicate: Option<T>,
    pub object: Option<T>,
}

impl<T> Default for TriplePattern<T> {
    fn default() -> Self {
        Self::any()
    }
}

impl<T> TriplePattern<T> {
    pub fn new(subject: Option<T>, predicate: Option<T>, object: Option<T>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// The fully unbound pattern.
    pub fn any() -> Self {
        Self::new(None, None, None)
    }

    pub fn with_subject(mut self, subject: T) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: T) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_object(mut self, object: T) -> Self {
        self.object = Some(object);
        self
    }

    /// The bound term at `position`, if any.
    pub fn term(&self, position: Position) -> Option<&T> {
        match position {
            Position::Subject => self.subject.as_ref(),
            Position::Predicate => self.predicate.as_ref(),
            Position::Object => self.object.as_ref(),
        }
    }

    pub fn classify(&self) -> MatchPattern {
        MatchPattern::classify(
            self.subject.is_some(),
            self.predicate.is_some(),
            self.object.is_some(),
        )
    }
}

impl<T: Term> TriplePattern<T> {
    /// Fully bound pattern equal to `triple`.
    pub fn from_triple(triple: &Triple<T>) -> Self {
        Self::new(
            Some(triple.subject.clone()),
            Some(triple.predicate.clone()),
            Some(triple.object.clone()),
        )
    }

    /// True if every bound position equals the triple's term at that position.
    pub fn matches(&self, triple: &Triple<T>) -> bool {
        Position::ALL.into_iter().all(|position| {
            self.term(position)
                .map_or(true, |term| term == triple.term(position))
        })
    }

    /// The triple this pattern denotes when fully bound.
    pub fn as_triple(&self) -> Option<Triple<T>> {
        Some(Triple::new(
            self.subject.clone()?,
            self.predicate.clone()?,
            self.object.clone()?,
        ))
    }
}

impl<T> From<Triple<T>> for TriplePattern<T> {
    fn from(triple: Triple<T>) -> Self {
        Self::new(
            Some(triple.subject),
            Some(triple.predicate),
            Some(triple.object),
        )
    }
}

/// Binding shape of a [`TriplePattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPattern {
    SubPreObj,
    SubPreAny,
    SubAnyObj,
    SubAnyAny,
    AnyPreObj,
    AnyPreAny,
    AnyAnyObj,
    AnyAnyAny,
}

impl MatchPattern {
    pub const PARTIAL: [MatchPattern; 6] = [
        MatchPattern::SubPreAny,
        MatchPattern::SubAnyObj,
        MatchPattern::SubAnyAny,
        MatchPattern::AnyPreObj,
        MatchPattern::AnyPreAny,
        MatchPattern::AnyAnyObj,
    ];

    pub fn classify(subject: bool, predicate: bool, object: bool) -> Self {
        match (subject, predicate, object) {
            (true, true, true) => MatchPattern::SubPreObj,
            (true, true, false) => MatchPattern::SubPreAny,
            (true, false, true) => MatchPattern::SubAnyObj,
            (true, false, false) => MatchPattern::SubAnyAny,
            (false, true, true) => MatchPattern::AnyPreObj,
            (false, true, false) => MatchPattern::AnyPreAny,
            (false, false, true) => MatchPattern::AnyAnyObj,
            (false, false, false) => MatchPattern::AnyAnyAny,
        }
    }

    /// One or two bound positions: the shapes index strategies answer.
    pub fn is_partial(self) -> bool {
        !matches!(self, MatchPattern::SubPreObj | MatchPattern::AnyAnyAny)
    }

    pub fn binds(self, position: Position) -> bool {
        let (s, p, o) = self.bound();
        match position {
            Position::Subject => s,
            Position::Predicate => p,
            Position::Object => o,
        }
    }

    fn bound(self) -> (bool, bool, bool) {
        match self {
            MatchPattern::SubPreObj => (true, true, true),
            MatchPattern::SubPreAny => (true, true, false),
            MatchPattern::SubAnyObj => (true, false, true),
            MatchPattern::SubAnyAny => (true, false, false),
            MatchPattern::AnyPreObj => (false, true, true),
            MatchPattern::AnyPreAny => (false, true, false),
            MatchPattern::AnyAnyObj => (false, false, true),
            MatchPattern::AnyAnyAny => (false, false, false),
        }
    }
}

impl fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (s, p, o) = self.bound();
        let part = |bound: bool, c: char| if bound { c } else { '_' };
        write!(f, "{}{}{}", part(s, 'S'), part(p, 'P'), part(o, 'O'))
    }
}
