//! Deterministic synthetic fact sets for the perf harnesses.

use std::collections::HashSet;

use anyhow::{anyhow, Result};
use triplemem_index::{MatchPattern, Position, Triple, TriplePattern};

/// Small deterministic RNG (xorshift64*), so runs with the same seed compare.
pub(crate) struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub(crate) fn new(seed: u64) -> Self {
        // All-zero state would stay zero forever.
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    pub(crate) fn gen_range_u32(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(upper)) as u32
    }

    pub(crate) fn gen_range_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() % (upper as u64)) as usize
    }
}

/// Shape of a generated fact set.
///
/// Subjects, predicates and objects draw from disjoint id ranges so a term
/// never shows up in two positions by accident.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SyntheticShape {
    pub(crate) triples: usize,
    pub(crate) subjects: u32,
    pub(crate) predicates: u32,
    pub(crate) objects: u32,
}

impl SyntheticShape {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.triples == 0 {
            return Err(anyhow!("--triples must be > 0"));
        }
        if self.subjects == 0 || self.predicates == 0 || self.objects == 0 {
            return Err(anyhow!("--subjects, --predicates and --objects must be > 0"));
        }
        let space = u64::from(self.subjects) * u64::from(self.predicates) * u64::from(self.objects);
        if (self.triples as u64) > space {
            return Err(anyhow!(
                "--triples={} exceeds the {} distinct triples the term ranges allow",
                self.triples,
                space
            ));
        }
        if u64::from(self.subjects) + u64::from(self.predicates) + u64::from(self.objects)
            > u64::from(u32::MAX)
        {
            return Err(anyhow!("term ranges do not fit in u32 ids"));
        }
        Ok(())
    }

    fn predicate_base(&self) -> u32 {
        self.subjects
    }

    fn object_base(&self) -> u32 {
        self.subjects + self.predicates
    }

    pub(crate) fn random_subject(&self, rng: &mut XorShift64) -> u32 {
        rng.gen_range_u32(self.subjects)
    }

    pub(crate) fn random_predicate(&self, rng: &mut XorShift64) -> u32 {
        self.predicate_base() + rng.gen_range_u32(self.predicates)
    }

    pub(crate) fn random_object(&self, rng: &mut XorShift64) -> u32 {
        self.object_base() + rng.gen_range_u32(self.objects)
    }

    pub(crate) fn random_triple(&self, rng: &mut XorShift64) -> Triple<u32> {
        Triple::new(
            self.random_subject(rng),
            self.random_predicate(rng),
            self.random_object(rng),
        )
    }
}

/// Generate `shape.triples` distinct triples.
pub(crate) fn generate_triples(shape: &SyntheticShape, seed: u64) -> Result<Vec<Triple<u32>>> {
    shape.validate()?;
    let mut rng = XorShift64::new(seed);
    let mut seen = HashSet::with_capacity(shape.triples);
    let mut out = Vec::with_capacity(shape.triples);
    while out.len() < shape.triples {
        let triple = shape.random_triple(&mut rng);
        if seen.insert(triple.clone()) {
            out.push(triple);
        }
    }
    Ok(out)
}

/// A query workload: `per_shape` patterns for each of the six partial shapes.
///
/// Bound terms are taken from stored triples so most queries hit.
pub(crate) fn generate_queries(
    triples: &[Triple<u32>],
    per_shape: usize,
    seed: u64,
) -> Vec<(MatchPattern, TriplePattern<u32>)> {
    let mut rng = XorShift64::new(seed ^ 0x5157_4f52_4b4c_4f41);
    let mut out = Vec::with_capacity(per_shape * MatchPattern::PARTIAL.len());
    if triples.is_empty() {
        return out;
    }
    for shape in MatchPattern::PARTIAL {
        for _ in 0..per_shape {
            let source = &triples[rng.gen_range_usize(triples.len())];
            let mut pattern = TriplePattern::from_triple(source);
            if !shape.binds(Position::Subject) {
                pattern.subject = None;
            }
            if !shape.binds(Position::Predicate) {
                pattern.predicate = None;
            }
            if !shape.binds(Position::Object) {
                pattern.object = None;
            }
            out.push((shape, pattern));
        }
    }
    out
}
