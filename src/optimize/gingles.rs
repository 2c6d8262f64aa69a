use anyhow::{Context, Result, ensure};
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::{
    optimize::{BurstOutcome, Direction, Optimizer},
    partition::BalanceBounds,
    plan::{Derived, Plan},
    score::ScoreFunction,
};

/// Short-burst optimizer for the number of minority opportunity districts.
///
/// Each burst is a ReCom chain started at the best plan found so far. Proposals keep
/// every district within `epsilon` of the ideal population and are always accepted.
#[derive(Clone, Debug)]
pub struct Gingleator {
    pop_col: String,
    threshold: f64,
    score_fn: ScoreFunction,
    epsilon: f64,
    minority_perc_col: String,
    ideal_pop: f64,
    max_attempts: usize,
}

impl Gingleator {
    /// Spanning trees tried per district pair, and district pairs tried per step.
    pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

    /// Create an optimizer for plans like `initial`, which must be contiguous and within
    /// `epsilon` of the ideal population in every district.
    pub fn new(
        initial: &Plan,
        pop_col: &str,
        threshold: f64,
        score_fn: Option<ScoreFunction>,
        epsilon: f64,
        minority_perc_col: &str,
    ) -> Result<Self> {
        ensure!(initial.partition.has_series(pop_col), "plan has no tally over population column '{pop_col}'");
        ensure!(epsilon > 0.0 && epsilon < 1.0, "epsilon must be in (0, 1), got {epsilon}");

        let totals = (1..=initial.num_districts())
            .map(|d| initial.partition.part_total(pop_col, d))
            .collect::<Vec<_>>();
        let ideal_pop = totals.iter().sum::<f64>() / initial.num_districts() as f64;

        let optimizer = Self {
            pop_col: pop_col.to_string(),
            threshold,
            score_fn: score_fn.unwrap_or_default(),
            epsilon,
            minority_perc_col: minority_perc_col.to_string(),
            ideal_pop,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        };

        let discontiguous = initial.partition.discontiguous_parts();
        ensure!(discontiguous.is_empty(), "initial plan is not valid: districts {discontiguous:?} are not contiguous");

        let bounds = optimizer.bounds();
        for (d, &total) in totals.iter().enumerate() {
            ensure!(bounds.accepts(total),
                "initial plan is not valid: district '{}' has population {total}, outside {:.1}% of ideal {ideal_pop}",
                initial.district_labels()[d], epsilon * 100.0);
        }

        Ok(optimizer)
    }

    /// Override the retry bound for ReCom proposals.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[inline] pub fn ideal_population(&self) -> f64 { self.ideal_pop }

    #[inline] pub fn threshold(&self) -> f64 { self.threshold }

    #[inline] pub fn score_function(&self) -> &ScoreFunction { &self.score_fn }

    #[inline] pub fn minority_perc_col(&self) -> &str { &self.minority_perc_col }

    /// Attach `name = minority / total` to the plan and score against it.
    pub fn init_minority_perc_col(&mut self, plan: &mut Plan, minority: &str, total: &str, name: &str) -> Result<()> {
        plan.add_derived(Derived::Ratio {
            name: name.to_string(),
            numerator: minority.to_string(),
            denominator: total.to_string(),
        })?;
        self.minority_perc_col = name.to_string();
        Ok(())
    }

    /// Score a plan by its minority percentage column.
    pub fn score(&self, plan: &Plan) -> Result<f64> {
        let percs = plan.values(&self.minority_perc_col)?;
        Ok(self.score_fn.score(&percs, self.threshold))
    }

    fn bounds(&self) -> BalanceBounds {
        BalanceBounds::new(self.pop_col.clone(), self.ideal_pop, self.epsilon)
    }
}

impl Optimizer for Gingleator {
    fn short_burst_run(
        &mut self,
        initial: &Plan,
        num_bursts: usize,
        burst_len: usize,
        direction: Direction,
        seed: u64,
    ) -> Result<BurstOutcome> {
        ensure!(burst_len > 0, "burst length must be at least 1");

        let mut rng = StdRng::seed_from_u64(seed);
        let bounds = self.bounds();

        let mut best = initial.clone();
        let mut best_score = self.score(&best)?;
        let mut observations = Array2::zeros((num_bursts, burst_len));

        for burst in 0..num_bursts {
            let mut state = best.clone();

            // The first state of each chain is its starting plan.
            for step in 0..burst_len {
                if step > 0 {
                    state.partition.recom_step(&bounds, self.max_attempts, &mut rng)
                        .with_context(|| format!("ReCom proposal failed in burst {burst}, step {step}"))?;
                }

                let score = self.score(&state)?;
                observations[[burst, step]] = score;
                trace!(burst, step, score);

                if direction.improves(score, best_score) {
                    best = state.clone();
                    best_score = score;
                }
            }

            debug!(burst, best_score, "finished burst");
        }

        Ok(BurstOutcome { best, best_score, observations, direction })
    }
}
