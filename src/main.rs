use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use csv::Writer;
use tracing::{info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fractional_coloring::{
    colgen::{ColumnGeneration, ColumnGenerationConfig, ColumnGenerationResult},
    heuristics::Heuristic,
    loader,
    mwss::ExactMode,
    pricing::{ParallelMode, PricingConfig},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// DIMACS graph file; an extension of `b` selects the packed binary format.
    path: PathBuf,

    /// Stop after adding this many columns.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Wall-clock limit in seconds, checked between LP solves.
    #[arg(long)]
    time_limit: Option<f64>,

    /// States the exact pricing search may visit per call.
    #[arg(long, default_value_t = 200_000)]
    exact_budget: usize,

    #[arg(long, value_enum, default_value_t = ExactMode::FirstViolating)]
    exact_mode: ExactMode,

    /// Greedy heuristics to try, in order.
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    heuristics: Option<Vec<Heuristic>>,

    #[arg(long)]
    no_local_search: bool,

    #[arg(long, value_enum, default_value_t = ParallelMode::None)]
    parallel: ParallelMode,

    /// Write the final column pool to this CSV file.
    #[arg(long)]
    columns: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn write_columns(path: &Path, result: &ColumnGenerationResult) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["index", "value", "vertices"])?;
    for (i, (column, value)) in result.columns.iter().zip(&result.column_values).enumerate() {
        writer.write_record([i.to_string(), value.to_string(), column.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let graph = loader::load(&cli.path)
        .with_context(|| format!("failed to load graph from {}", cli.path.display()))?;
    info!(
        vertices = graph.len(),
        edges = graph.num_edges(),
        density = graph.density(),
        "loaded graph"
    );
    trace!("{}", graph.info());

    let time_limit = match cli.time_limit {
        Some(secs) => Some(
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid time limit {secs}"))?,
        ),
        None => None,
    };
    let config = ColumnGenerationConfig {
        max_iterations: cli.max_iterations,
        time_limit,
        pricing: PricingConfig {
            heuristics: cli.heuristics.unwrap_or_else(|| Heuristic::ALL.to_vec()),
            local_search: !cli.no_local_search,
            exact_budget: cli.exact_budget,
            exact_mode: cli.exact_mode,
            parallel: cli.parallel,
            ..PricingConfig::default()
        },
    };

    let result = ColumnGeneration::new(&graph, config)
        .run()
        .context("column generation failed")?;

    println!("{}", result.objective);
    println!("{} columns", result.columns.len());
    info!(
        iterations = result.iterations,
        termination = ?result.termination,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "done"
    );

    if let Some(path) = &cli.columns {
        write_columns(path, &result)
            .with_context(|| format!("failed to write columns to {}", path.display()))?;
    }
    Ok(())
}
