//! Performance harnesses for the triple indexes.
//!
//! Not a microbenchmark framework. These answer practical questions:
//! - How long does an eager build take, sequential vs parallel?
//! - What does each partial pattern shape cost under a given strategy?
//! - How does query throughput hold up with several concurrent readers?
//!
//! Run in release mode for meaningful results:
//!
//! ```bash
//! cargo run -p triplemem-cli --release -- perf query --triples 1000000 --readers 4
//! ```

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde::Serialize;
use triplemem_index::{
    EagerIndex, IndexingStrategyKind, MatchPattern, Position, TriplePattern, TripleStore,
};

use crate::synthetic::{generate_queries, generate_triples, SyntheticShape};

#[derive(Subcommand)]
pub enum PerfCommands {
    /// Time sequential vs parallel eager index builds over synthetic triples.
    Build {
        /// Number of distinct triples to generate.
        #[arg(long, default_value_t = 200_000)]
        triples: usize,

        /// Distinct subject terms.
        #[arg(long, default_value_t = 20_000)]
        subjects: u32,

        /// Distinct predicate terms.
        #[arg(long, default_value_t = 32)]
        predicates: u32,

        /// Distinct object terms.
        #[arg(long, default_value_t = 20_000)]
        objects: u32,

        /// RNG seed (deterministic).
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Write a JSON report.
        #[arg(long)]
        out_json: Option<PathBuf>,
    },

    /// Time the six partial pattern shapes under one indexing strategy.
    Query {
        /// Number of distinct triples to generate.
        #[arg(long, default_value_t = 200_000)]
        triples: usize,

        /// Distinct subject terms.
        #[arg(long, default_value_t = 20_000)]
        subjects: u32,

        /// Distinct predicate terms.
        #[arg(long, default_value_t = 32)]
        predicates: u32,

        /// Distinct object terms.
        #[arg(long, default_value_t = 20_000)]
        objects: u32,

        /// Indexing strategy (eager, eager-parallel, lazy, lazy-parallel, minimal, manual).
        #[arg(long, default_value_t = IndexingStrategyKind::Eager)]
        strategy: IndexingStrategyKind,

        /// Queries per pattern shape.
        #[arg(long, default_value_t = 1_000)]
        queries: usize,

        /// Reader threads running the workload concurrently.
        #[arg(long, default_value_t = 1)]
        readers: usize,

        /// RNG seed (deterministic).
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Write a JSON report.
        #[arg(long)]
        out_json: Option<PathBuf>,
    },
}

pub fn cmd_perf(command: PerfCommands) -> Result<()> {
    match command {
        PerfCommands::Build {
            triples,
            subjects,
            predicates,
            objects,
            seed,
            out_json,
        } => cmd_perf_build(
            SyntheticShape {
                triples,
                subjects,
                predicates,
                objects,
            },
            seed,
            out_json.as_ref(),
        ),
        PerfCommands::Query {
            triples,
            subjects,
            predicates,
            objects,
            strategy,
            queries,
            readers,
            seed,
            out_json,
        } => cmd_perf_query(
            SyntheticShape {
                triples,
                subjects,
                predicates,
                objects,
            },
            strategy,
            queries,
            readers,
            seed,
            out_json.as_ref(),
        ),
    }
}

#[derive(Debug, Clone, Serialize)]
struct PerfBuildReport {
    triples: usize,
    subjects: u32,
    predicates: u32,
    objects: u32,
    seed: u64,
    load_secs: f64,
    build_secs: f64,
    build_parallel_secs: f64,
    subject_terms: usize,
    predicate_terms: usize,
    object_terms: usize,
    index_entries: u64,
}

fn cmd_perf_build(shape: SyntheticShape, seed: u64, out_json: Option<&PathBuf>) -> Result<()> {
    println!("perf/build");
    println!(
        "  triples={} subjects={} predicates={} objects={} seed={}",
        shape.triples, shape.subjects, shape.predicates, shape.objects, seed
    );

    let triples = generate_triples(&shape, seed)?;
    tracing::debug!(triples = triples.len(), seed, "generated synthetic triples");
    let start = Instant::now();
    let store = TripleStore::from_triples(triples, IndexingStrategyKind::Minimal);
    let load_time = start.elapsed();
    println!("  load={load_time:?}");

    let start = Instant::now();
    let sequential = EagerIndex::build(store.facts());
    let build_time = start.elapsed();
    println!("  build={build_time:?}");

    let start = Instant::now();
    let parallel = EagerIndex::build_parallel(store.facts());
    let build_parallel_time = start.elapsed();
    println!("  build_parallel={build_parallel_time:?}");

    if sequential != parallel {
        return Err(anyhow!("parallel build differs from the sequential build"));
    }
    let index_entries: u64 = Position::ALL
        .iter()
        .map(|&position| sequential.position(position).entry_count())
        .sum();
    if index_entries != 3 * store.len() as u64 {
        return Err(anyhow!(
            "index holds {index_entries} entries for {} triples",
            store.len()
        ));
    }

    let report = PerfBuildReport {
        triples: store.len(),
        subjects: shape.subjects,
        predicates: shape.predicates,
        objects: shape.objects,
        seed,
        load_secs: load_time.as_secs_f64(),
        build_secs: build_time.as_secs_f64(),
        build_parallel_secs: build_parallel_time.as_secs_f64(),
        subject_terms: sequential.position(Position::Subject).len(),
        predicate_terms: sequential.position(Position::Predicate).len(),
        object_terms: sequential.position(Position::Object).len(),
        index_entries,
    };
    write_report(&report, out_json)
}

#[derive(Debug, Clone, Serialize)]
struct ShapeTiming {
    shape: String,
    queries: usize,
    total_hits: u64,
    time_secs: f64,
    queries_per_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
struct PerfQueryReport {
    triples: usize,
    strategy: IndexingStrategyKind,
    queries_per_shape: usize,
    readers: usize,
    seed: u64,
    load_secs: f64,
    index_secs: f64,
    wall_secs: f64,
    shapes: Vec<ShapeTiming>,
}

fn cmd_perf_query(
    shape: SyntheticShape,
    strategy: IndexingStrategyKind,
    queries: usize,
    readers: usize,
    seed: u64,
    out_json: Option<&PathBuf>,
) -> Result<()> {
    if readers == 0 {
        return Err(anyhow!("--readers must be > 0"));
    }

    println!("perf/query");
    println!(
        "  triples={} strategy={} queries_per_shape={} readers={} seed={}",
        shape.triples, strategy, queries, readers, seed
    );

    let triples = generate_triples(&shape, seed)?;
    let workload = generate_queries(&triples, queries, seed);
    tracing::debug!(
        triples = triples.len(),
        queries = workload.len(),
        seed,
        "generated synthetic query workload"
    );

    let start = Instant::now();
    let mut store = TripleStore::from_triples(triples, strategy);
    let load_time = start.elapsed();
    println!("  load={load_time:?}");

    // Manual indexing cannot answer anything until told to; lazy indexing is
    // warmed here so the first reader does not pay for the build.
    let start = Instant::now();
    match strategy {
        IndexingStrategyKind::Manual => store.initialize_index(),
        IndexingStrategyKind::Lazy | IndexingStrategyKind::LazyParallel => {
            store.contains_match(&warmup_pattern(&workload))?;
        }
        _ => {}
    }
    let index_time = start.elapsed();
    println!("  index={index_time:?}");

    let start = Instant::now();
    let per_reader = std::thread::scope(|s| {
        let handles: Vec<_> = (0..readers)
            .map(|_| s.spawn(|| run_workload(&store, &workload)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Result<Vec<_>>>()
    })?;
    let wall_time = start.elapsed();
    println!("  wall={wall_time:?}");

    let shapes = merge_timings(&per_reader, readers);
    for timing in &shapes {
        println!(
            "  {:<4} queries={} hits={} time={:.3}s qps={:.0}",
            timing.shape, timing.queries, timing.total_hits, timing.time_secs, timing.queries_per_sec
        );
    }

    let report = PerfQueryReport {
        triples: store.len(),
        strategy,
        queries_per_shape: queries,
        readers,
        seed,
        load_secs: load_time.as_secs_f64(),
        index_secs: index_time.as_secs_f64(),
        wall_secs: wall_time.as_secs_f64(),
        shapes,
    };
    write_report(&report, out_json)
}

fn warmup_pattern(workload: &[(MatchPattern, TriplePattern<u32>)]) -> TriplePattern<u32> {
    workload
        .first()
        .map(|(_, pattern)| pattern.clone())
        .unwrap_or_else(|| TriplePattern::any().with_subject(0))
}

/// Per-shape (hits, elapsed, query count) for one reader, in `MatchPattern::PARTIAL` order.
type ReaderTimings = Vec<(MatchPattern, u64, Duration, usize)>;

fn run_workload(
    store: &TripleStore<u32>,
    workload: &[(MatchPattern, TriplePattern<u32>)],
) -> Result<ReaderTimings> {
    let mut out: ReaderTimings = Vec::with_capacity(MatchPattern::PARTIAL.len());
    for shape in MatchPattern::PARTIAL {
        let mut hits = 0u64;
        let mut count = 0usize;
        let start = Instant::now();
        for (_, pattern) in workload.iter().filter(|(s, _)| *s == shape) {
            hits += store.stream(pattern)?.count() as u64;
            count += 1;
        }
        out.push((shape, hits, start.elapsed(), count));
    }
    Ok(out)
}

fn merge_timings(per_reader: &[ReaderTimings], readers: usize) -> Vec<ShapeTiming> {
    MatchPattern::PARTIAL
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            let mut hits = 0u64;
            let mut queries = 0usize;
            let mut slowest = Duration::ZERO;
            for timings in per_reader {
                let (_, reader_hits, elapsed, count) = timings[i];
                hits += reader_hits;
                queries += count;
                slowest = slowest.max(elapsed);
            }
            let secs = slowest.as_secs_f64();
            ShapeTiming {
                shape: shape.to_string(),
                queries,
                total_hits: hits / readers as u64,
                time_secs: secs,
                queries_per_sec: if secs > 0.0 { queries as f64 / secs } else { 0.0 },
            }
        })
        .collect()
}

fn write_report<R: Serialize>(report: &R, out_json: Option<&PathBuf>) -> Result<()> {
    if let Some(out) = out_json {
        fs::write(out, serde_json::to_string_pretty(report)?)?;
        println!("  wrote_json={}", out.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_shape() -> SyntheticShape {
        SyntheticShape {
            triples: 500,
            subjects: 40,
            predicates: 4,
            objects: 40,
        }
    }

    #[test]
    fn workload_hits_agree_across_strategies() -> Result<()> {
        let triples = generate_triples(&small_shape(), 11)?;
        let workload = generate_queries(&triples, 20, 11);

        let eager = TripleStore::from_triples(triples.clone(), IndexingStrategyKind::Eager);
        let minimal = TripleStore::from_triples(triples, IndexingStrategyKind::Minimal);

        let hits = |timings: ReaderTimings| -> Vec<u64> {
            timings.into_iter().map(|(_, hits, _, _)| hits).collect()
        };
        assert_eq!(
            hits(run_workload(&eager, &workload)?),
            hits(run_workload(&minimal, &workload)?)
        );
        Ok(())
    }

    #[test]
    fn merged_timings_average_hits_over_readers() -> Result<()> {
        let triples = generate_triples(&small_shape(), 5)?;
        let workload = generate_queries(&triples, 10, 5);
        let store = TripleStore::from_triples(triples, IndexingStrategyKind::Eager);

        let one = run_workload(&store, &workload)?;
        let merged = merge_timings(&[one.clone(), one.clone()], 2);
        assert_eq!(merged.len(), 6);
        for (timing, (_, hits, _, count)) in merged.iter().zip(&one) {
            assert_eq!(timing.total_hits, *hits);
            assert_eq!(timing.queries, count * 2);
            // Every query was generated from a stored triple.
            assert!(timing.total_hits >= *count as u64);
        }
        Ok(())
    }

    #[test]
    fn build_report_serializes() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("triplemem-perf-{}", std::process::id()));
        fs::create_dir_all(&dir)?;
        let out = dir.join("build.json");
        cmd_perf_build(small_shape(), 3, Some(&out))?;

        let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
        assert_eq!(report["triples"], 500);
        assert_eq!(report["predicate_terms"], 4);
        assert_eq!(report["index_entries"], 1_500);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
