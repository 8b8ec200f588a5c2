//! triplemem CLI
//!
//! - `query`: load a whitespace-separated triple file and run one pattern
//! - `perf`: synthetic build and query harnesses for the indexing strategies

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use triplemem_index::{IndexConfig, IndexingStrategyKind, TermId, TermInterner, TripleStore};

mod perf;
mod synthetic;

#[derive(Parser)]
#[command(name = "triplemem")]
#[command(author, version, about = "In-memory triple store with roaring-bitmap pattern indexes")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load triples from a file and print the ones matching a pattern.
    ///
    /// Input lines are `subject predicate object`; blank lines and lines
    /// starting with `#` are skipped. In the pattern `??` is unbound.
    Query {
        /// Triple file.
        #[arg(short, long)]
        input: PathBuf,

        /// Pattern such as `alice ?? bob`.
        #[arg(short, long)]
        pattern: String,

        /// Indexing strategy; overrides `--config` and the environment.
        #[arg(long)]
        strategy: Option<IndexingStrategyKind>,

        /// JSON index config, e.g. `{ "strategy": "lazy" }`.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Build the index once up front (needed for `manual`).
        #[arg(long)]
        initialize: bool,
    },

    /// Performance harnesses.
    Perf {
        #[command(subcommand)]
        command: perf::PerfCommands,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Query {
            input,
            pattern,
            strategy,
            config,
            initialize,
        } => {
            let config = resolve_config(strategy, config.as_deref())?;
            cmd_query(&input, &pattern, &config, initialize)
        }
        Commands::Perf { command } => perf::cmd_perf(command),
    }
}

/// `--strategy` wins over `--config`, which wins over the environment.
fn resolve_config(
    strategy: Option<IndexingStrategyKind>,
    config: Option<&Path>,
) -> Result<IndexConfig> {
    if let Some(strategy) = strategy {
        return Ok(IndexConfig::new(strategy));
    }
    if let Some(path) = config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()));
    }
    Ok(IndexConfig::from_env()?)
}

fn load_triples(
    text: &str,
    terms: &TermInterner,
    config: &IndexConfig,
) -> Result<TripleStore<TermId>> {
    let mut store = TripleStore::with_config(config);
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let triple = terms
            .parse_triple(line)
            .ok_or_else(|| anyhow!("line {}: expected `subject predicate object`", lineno + 1))?;
        store.add(triple);
    }
    tracing::debug!(
        triples = store.len(),
        terms = terms.len(),
        strategy = %config.strategy,
        "loaded triple file"
    );
    Ok(store)
}

/// Run `pattern` against `store` and render the matches.
///
/// Unseen terms are interned rather than short-circuited, so the store's
/// strategy still decides the answer (manual indexing fails until built).
fn run_query(
    store: &TripleStore<TermId>,
    terms: &TermInterner,
    pattern: &str,
) -> Result<Vec<String>> {
    let parsed = terms.intern_pattern(pattern).ok_or_else(|| {
        anyhow!("pattern `{pattern}` must have exactly three terms (use ?? for unbound)")
    })?;
    tracing::debug!(shape = %parsed.classify(), "running pattern query");
    let matches = store
        .find(&parsed)
        .with_context(|| format!("querying `{pattern}`"))?
        .map(|triple| terms.render(triple))
        .collect();
    Ok(matches)
}

fn cmd_query(input: &Path, pattern: &str, config: &IndexConfig, initialize: bool) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("reading triples from {}", input.display()))?;
    let terms = TermInterner::new();
    let mut store = load_triples(&text, &terms, config)?;
    if initialize {
        store.initialize_index();
    }

    println!(
        "{} {} triples ({} indexing)",
        "Loaded".green().bold(),
        store.len(),
        store.indexing_strategy_kind()
    );

    let matches = run_query(&store, &terms, pattern)?;
    println!("{} {} matches", "Found".cyan().bold(), matches.len());
    for line in &matches {
        println!("  {line}");
    }
    Ok(())
}
