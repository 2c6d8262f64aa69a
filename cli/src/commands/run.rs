use anyhow::Result;
use shortburst::{Adjacency, MissingLabelPolicy, RunConfig};
use tracing::info;

use crate::cli::{Cli, RunArgs};

/// Build the run configuration from the config file (if any) and flag overrides.
fn config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(input) = &args.input { config.input = input.clone() }
    if let Some(output_dir) = &args.output_dir { config.output_dir = output_dir.clone() }
    if let Some(region) = &args.region { config.region = region.to_ascii_uppercase() }
    if let Some(districts) = args.districts { config.num_districts = districts }
    if let Some(iters) = args.iters { config.iters = iters }
    if let Some(burst_len) = args.burst_len { config.burst_len = burst_len }
    if let Some(runs) = args.runs { config.n_samps = runs }
    if let Some(pop_col) = &args.pop_col { config.pop_col = pop_col.clone() }
    if let Some(min_pop_col) = &args.min_pop_col { config.min_pop_col = min_pop_col.clone() }
    if let Some(total_vap_col) = &args.total_vap_col { config.total_vap_col = total_vap_col.clone() }
    if let Some(district_col) = &args.district_col { config.district_col = district_col.clone() }
    if let Some(epsilon) = args.epsilon { config.epsilon = epsilon }
    if let Some(threshold) = args.threshold { config.threshold = threshold }
    if let Some(score) = &args.score { config.score = Some(score.clone()) }
    if let Some(seed) = args.seed { config.seed = seed }
    if args.omit_missing { config.missing_labels = MissingLabelPolicy::Omit }
    if args.queen { config.adjacency = Adjacency::Queen }

    config.validate()?;
    Ok(config)
}

pub fn run(_cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = config(args)?;
    let records = shortburst::run(&config)?;

    for record in &records {
        info!(
            run = record.run,
            seed = record.seed,
            best_score = record.stats.score,
            "wrote {}",
            record.paths.scores.display()
        );
    }

    Ok(())
}
