use std::{collections::BTreeMap, path::{Path, PathBuf}};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{experiment::RunConfig, optimize::BurstOutcome};

/// Where one run's results are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    /// `.npy` array with the running best score after each burst.
    pub scores: PathBuf,
    /// JSON record of the best plan's tallies.
    pub max_part: PathBuf,
}

impl OutputPaths {
    /// Paths for run `run`, encoding every run parameter:
    /// `{output_dir}/threshold_{τ}/{region}_dists{k}_{col}opt_{ε:.1%}_{iters}_sbl{burst_len}_{tag}_{run}`.
    pub fn for_run(config: &RunConfig, tag: &str, run: usize) -> Self {
        let dir = config.output_dir.join(format!("threshold_{}", python_float(config.threshold)));
        let stem = format!(
            "{}_dists{}_{}opt_{:.1}%_{}_sbl{}_{}_{}",
            config.region,
            config.num_districts,
            config.min_pop_col,
            config.epsilon * 100.0,
            config.iters,
            config.burst_len,
            tag,
            run,
        );

        Self {
            scores: dir.join(format!("{stem}.npy")),
            max_part: dir.join(format!("{stem}_max_part.json")),
        }
    }

    /// Directory holding both files.
    pub fn dir(&self) -> &Path {
        self.scores.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Format a float the way Python's `str()` does (`0.5`, `1.0`, `1e-05`).
/// Python switches to exponent notation below `1e-4` and from `1e16` up.
fn python_float(value: f64) -> String {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let s = format!("{value:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = exp.strip_prefix('-').map_or(("+", exp), |d| ("-", d));
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => s,
        };
    }
    let s = format!("{value}");
    if value.is_finite() && !s.contains('.') { format!("{s}.0") } else { s }
}

/// Tallies of the best plan found in a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaxPartStats {
    pub score: f64,
    /// District labels, in the order of every tally vector.
    pub districts: Vec<String>,
    pub tallies: BTreeMap<String, Vec<f64>>,
}

impl MaxPartStats {
    /// Collect the given tallies from the best plan of an outcome.
    pub fn from_outcome(outcome: &BurstOutcome, columns: &[String]) -> Result<Self> {
        let tallies = columns.iter()
            .map(|column| Ok((column.clone(), outcome.best.values(column)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            score: outcome.best_score,
            districts: outcome.best.district_labels().to_vec(),
            tallies,
        })
    }
}

/// Summary of one completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunRecord {
    pub run: usize,
    pub seed: u64,
    pub paths: OutputPaths,
    /// Running best score after each burst.
    pub trace: Vec<f64>,
    pub stats: MaxPartStats,
}
