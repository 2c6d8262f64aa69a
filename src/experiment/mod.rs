//! Orchestration of a short-burst experiment: read the precincts, build the initial
//! plan, run the optimizer `n_samps` times, and save each run's results.

mod config;
mod output;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    common::ensure_dir_exists,
    graph::PrecinctGraph,
    io::{write_json, write_npy},
    optimize::{Direction, Gingleator, Optimizer},
    plan::{InitialAssignment, Plan, Updaters},
};

pub use config::RunConfig;
pub use output::{MaxPartStats, OutputPaths, RunRecord};

/// Read the precinct graph and build the initial plan and optimizer.
pub fn setup(config: &RunConfig) -> Result<(Plan, Gingleator)> {
    config.validate()?;

    info!("Reading in Data/Graph");
    let graph = PrecinctGraph::from_file(&config.input, config.adjacency)?;

    let mut updaters = Updaters::gingles(&config.pop_col);
    let extra = [&config.min_pop_col, &config.total_vap_col].into_iter().chain(&config.stats_columns);
    for column in extra {
        if !updaters.contains(column) { updaters = updaters.with_tally(column, column) }
    }

    let total_pop = graph.total(&config.pop_col)?;
    info!(total_pop, nodes = graph.node_count(), edges = graph.edge_count(), "loaded precinct graph");

    let initial = InitialAssignment::from_graph(&graph, &config.district_col, config.missing_labels)?;
    let mut plan = Plan::new(&graph, &initial, updaters, config.num_districts)
        .context("Failed to build the initial plan")?;

    let perc_col = config.minority_perc_col();
    let mut gingles = Gingleator::new(
        &plan,
        &config.pop_col,
        config.threshold,
        config.score.clone(),
        config.epsilon,
        &perc_col,
    )?;
    gingles.init_minority_perc_col(&mut plan, &config.min_pop_col, &config.total_vap_col, &perc_col)?;

    Ok((plan, gingles))
}

/// Run the optimizer `config.n_samps` times from `plan`, writing each run's score trace
/// and best-plan tallies before starting the next. Run `i` uses seed `config.seed + i`.
pub fn run_experiment(
    config: &RunConfig,
    plan: &Plan,
    optimizer: &mut dyn Optimizer,
    tag: &str,
) -> Result<Vec<RunRecord>> {
    config.validate()?;

    info!("Starting Short Bursts Runs");
    let mut records = Vec::with_capacity(config.n_samps);

    for run in 0..config.n_samps {
        let seed = config.seed + run as u64;
        let outcome = optimizer
            .short_burst_run(plan, config.num_bursts(), config.burst_len, Direction::Maximize, seed)
            .with_context(|| format!("short-burst run {run} failed"))?;
        info!("Finished chain {run}");

        info!("Saving results");
        let paths = OutputPaths::for_run(config, tag, run);
        ensure_dir_exists(paths.dir())?;

        let trace = outcome.trace();
        write_npy(&paths.scores, &trace)?;

        let stats = MaxPartStats::from_outcome(&outcome, &config.stats_columns)
            .with_context(|| format!("Failed to collect tallies for run {run}"))?;
        write_json(&paths.max_part, &stats)?;

        records.push(RunRecord { run, seed, paths, trace: trace.to_vec(), stats });
    }

    Ok(records)
}

/// Set up and run a full experiment.
pub fn run(config: &RunConfig) -> Result<Vec<RunRecord>> {
    let (plan, mut gingles) = setup(config)?;
    let tag = config.score_function().tag().to_string();
    run_experiment(config, &plan, &mut gingles, &tag)
}
