use std::path::PathBuf;

use shortburst::ScoreFunction;

/// Short-burst redistricting experiments
#[derive(clap::Parser, Debug)]
#[command(name = "shortburst", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run a short-burst experiment and save every run's results
    Run(RunArgs),

    /// Summarize a precinct file
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// JSON config file; flags below override its fields
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Precinct file (.geojson or .shp)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output directory, defaults to "short_burst_run_result"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Region code used in output file names, e.g. SC
    #[arg(long)]
    pub region: Option<String>,

    /// Number of districts
    #[arg(short, long)]
    pub districts: Option<u32>,

    /// Total states per run
    #[arg(long)]
    pub iters: Option<usize>,

    /// States per burst
    #[arg(long)]
    pub burst_len: Option<usize>,

    /// Number of independent runs
    #[arg(short = 'n', long)]
    pub runs: Option<usize>,

    /// Population column
    #[arg(long)]
    pub pop_col: Option<String>,

    /// Minority voting-age population column
    #[arg(long)]
    pub min_pop_col: Option<String>,

    /// Total voting-age population column
    #[arg(long)]
    pub total_vap_col: Option<String>,

    /// Column with each precinct's initial district
    #[arg(long)]
    pub district_col: Option<String>,

    /// Allowed population deviation from ideal, e.g. 0.045
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Opportunity district threshold, e.g. 0.5
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Score function name or tag (num_opportunity_dists, score1, ...)
    #[arg(long)]
    pub score: Option<ScoreFunction>,

    /// Seed of the first run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Leave precincts without a district label unassigned instead of failing
    #[arg(long)]
    pub omit_missing: bool,

    /// Treat precincts touching at a single point as adjacent
    #[arg(long)]
    pub queen: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Precinct file (.geojson or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Population column to total
    #[arg(long, default_value = "TOTPOP")]
    pub pop_col: String,

    /// Column with each precinct's district label
    #[arg(long, default_value = "CD")]
    pub district_col: String,

    /// Treat precincts touching at a single point as adjacent
    #[arg(long)]
    pub queen: bool,
}
