//! Short-burst search over districting plans.

mod gingles;

use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::plan::Plan;

pub use gingles::Gingleator;

/// Whether higher or lower scores are better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

impl Direction {
    /// Check if `candidate` is strictly better than `incumbent`.
    #[inline]
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Maximize => candidate > incumbent,
            Direction::Minimize => candidate < incumbent,
        }
    }
}

/// Result of one short-burst run.
#[derive(Clone, Debug)]
pub struct BurstOutcome {
    /// Best plan seen during the run.
    pub best: Plan,
    pub best_score: f64,
    /// Score of every visited state, one row per burst and one column per step.
    pub observations: Array2<f64>,
    pub direction: Direction,
}

impl BurstOutcome {
    /// Running best score after each burst.
    pub fn trace(&self) -> Array1<f64> {
        let mut running: Option<f64> = None;
        self.observations.rows().into_iter()
            .map(|row| {
                for &score in row {
                    if running.is_none_or(|best| self.direction.improves(score, best)) {
                        running = Some(score);
                    }
                }
                running.unwrap_or(self.best_score)
            })
            .collect()
    }
}

/// A bounded search that improves a plan in short bursts.
pub trait Optimizer {
    /// Run `num_bursts` bursts of `burst_len` states each, starting from `initial`.
    /// The same `seed` must reproduce the same outcome.
    fn short_burst_run(
        &mut self,
        initial: &Plan,
        num_bursts: usize,
        burst_len: usize,
        direction: Direction,
        seed: u64,
    ) -> Result<BurstOutcome>;
}
