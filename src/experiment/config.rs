use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{geom::Adjacency, plan::MissingLabelPolicy, score::ScoreFunction};

/// Parameters of a short-burst experiment. Every field has a default, so a config
/// file only needs the fields it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// States per burst.
    pub burst_len: usize,
    pub num_districts: u32,
    /// Total states per run; split into `iters / burst_len` bursts.
    pub iters: usize,
    /// Population column used for balance.
    pub pop_col: String,
    /// Number of independent runs.
    pub n_samps: usize,
    /// Score function; `None` counts opportunity districts.
    pub score: Option<ScoreFunction>,
    /// Allowed population deviation from ideal, as a fraction.
    pub epsilon: f64,
    /// Minority voting-age population column.
    pub min_pop_col: String,
    pub total_vap_col: String,
    /// Minority share at which a district counts as an opportunity district.
    pub threshold: f64,
    /// Region code used in output file names.
    pub region: String,
    /// Column holding each precinct's initial district label.
    pub district_col: String,
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Run `i` is seeded with `seed + i`.
    pub seed: u64,
    pub missing_labels: MissingLabelPolicy,
    pub adjacency: Adjacency,
    /// Tallies saved with the best plan of each run.
    pub stats_columns: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            burst_len: 10,
            num_districts: 7,
            iters: 500,
            pop_col: "TOTPOP".into(),
            n_samps: 10,
            score: None,
            epsilon: 0.045,
            min_pop_col: "BVAP".into(),
            total_vap_col: "VAP".into(),
            threshold: 0.5,
            region: "SC".into(),
            district_col: "CD".into(),
            input: PathBuf::from("./shapefiles/SC.geojson"),
            output_dir: PathBuf::from("short_burst_run_result"),
            seed: 0,
            missing_labels: MissingLabelPolicy::Reject,
            adjacency: Adjacency::Rook,
            stats_columns: ["VAP", "BVAP", "WVAP", "HVAP"].map(String::from).to_vec(),
        }
    }
}

impl RunConfig {
    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Number of bursts per run (integer division).
    #[inline] pub fn num_bursts(&self) -> usize { self.iters / self.burst_len.max(1) }

    /// Name of the derived minority percentage column.
    #[inline] pub fn minority_perc_col(&self) -> String { format!("{}_perc", self.min_pop_col) }

    /// The configured score function, or the default.
    #[inline] pub fn score_function(&self) -> ScoreFunction { self.score.clone().unwrap_or_default() }

    /// Reject parameter combinations no run can use.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.burst_len > 0, "burst_len must be at least 1");
        ensure!(self.n_samps > 0, "n_samps must be at least 1");
        ensure!(self.num_districts > 0, "num_districts must be at least 1");
        ensure!(self.epsilon > 0.0 && self.epsilon < 1.0, "epsilon must be in (0, 1), got {}", self.epsilon);
        ensure!(self.threshold > 0.0 && self.threshold < 1.0, "threshold must be in (0, 1), got {}", self.threshold);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_experiment() {
        let config = RunConfig::default();
        assert_eq!(config.num_bursts(), 50);
        assert_eq!(config.minority_perc_col(), "BVAP_perc");
        assert_eq!(config.score_function().tag(), "score0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn num_bursts_truncates() {
        let config = RunConfig { iters: 25, burst_len: 10, ..RunConfig::default() };
        assert_eq!(config.num_bursts(), 2);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{
            "region": "GA",
            "num_districts": 14,
            "score": "reward_partial_dist",
            "missing_labels": "omit",
            "adjacency": "queen"
        }"#).unwrap();

        assert_eq!(config.region, "GA");
        assert_eq!(config.num_districts, 14);
        assert_eq!(config.score_function().tag(), "score1");
        assert_eq!(config.missing_labels, MissingLabelPolicy::Omit);
        assert_eq!(config.adjacency, Adjacency::Queen);
        assert_eq!(config.iters, 500);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<RunConfig>(r#"{ "iterations": 10 }"#).is_err());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let bad = [
            RunConfig { burst_len: 0, ..RunConfig::default() },
            RunConfig { n_samps: 0, ..RunConfig::default() },
            RunConfig { num_districts: 0, ..RunConfig::default() },
            RunConfig { epsilon: 0.0, ..RunConfig::default() },
            RunConfig { threshold: 1.0, ..RunConfig::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "iters": 100, "burst_len": 5 }"#).unwrap();

        let config = RunConfig::from_json_file(&path).unwrap();
        assert_eq!(config.num_bursts(), 20);
        assert!(RunConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
