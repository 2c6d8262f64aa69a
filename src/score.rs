use std::{fmt, str::FromStr, sync::Arc};

use anyhow::{Error, Result, bail};
use serde::{Deserialize, Serialize, Serializer, ser::Error as _};

type ScoreFn = dyn Fn(&[f64], f64) -> f64 + Send + Sync;

#[derive(Clone)]
enum ScoreKind {
    NumOpportunityDists,
    RewardPartialDist,
    RewardNextHighestClose,
    PenalizeMaximumOver,
    PenalizeAvgOver,
    Custom { tag: String, func: Arc<ScoreFn> },
}

/// Scores a plan from its per-district minority percentages and an opportunity threshold.
///
/// A district is an *opportunity district* when its percentage is at least the threshold.
/// Built-in functions all start from the opportunity district count and differ in how
/// they break ties between plans with the same count.
///
/// Built-ins serialize to their configuration name; custom functions cannot be serialized.
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct ScoreFunction {
    kind: ScoreKind,
}

impl ScoreFunction {
    /// Number of opportunity districts.
    pub fn num_opportunity_dists() -> Self {
        Self { kind: ScoreKind::NumOpportunityDists }
    }

    /// Opportunity count plus the highest percentage below the threshold.
    pub fn reward_partial_dist() -> Self {
        Self { kind: ScoreKind::RewardPartialDist }
    }

    /// Opportunity count, plus a bonus when the next highest district is within 0.1 of the threshold.
    pub fn reward_next_highest_close() -> Self {
        Self { kind: ScoreKind::RewardNextHighestClose }
    }

    /// Opportunity count, penalized by how far the highest district overshoots the threshold.
    pub fn penalize_maximum_over() -> Self {
        Self { kind: ScoreKind::PenalizeMaximumOver }
    }

    /// Opportunity count, penalized by how far the average opportunity district overshoots the threshold.
    pub fn penalize_avg_over() -> Self {
        Self { kind: ScoreKind::PenalizeAvgOver }
    }

    /// A caller-supplied score; `tag` names it in output file names.
    pub fn custom(tag: impl Into<String>, func: impl Fn(&[f64], f64) -> f64 + Send + Sync + 'static) -> Self {
        Self { kind: ScoreKind::Custom { tag: tag.into(), func: Arc::new(func) } }
    }

    /// Every built-in score function.
    pub fn builtins() -> [Self; 5] {
        [
            Self::num_opportunity_dists(),
            Self::reward_partial_dist(),
            Self::reward_next_highest_close(),
            Self::penalize_maximum_over(),
            Self::penalize_avg_over(),
        ]
    }

    /// Short tag used in output file names (`score0`..`score4` for built-ins).
    pub fn tag(&self) -> &str {
        match &self.kind {
            ScoreKind::NumOpportunityDists => "score0",
            ScoreKind::RewardPartialDist => "score1",
            ScoreKind::RewardNextHighestClose => "score2",
            ScoreKind::PenalizeMaximumOver => "score3",
            ScoreKind::PenalizeAvgOver => "score4",
            ScoreKind::Custom { tag, .. } => tag,
        }
    }

    /// Configuration name of the function.
    pub fn name(&self) -> &str {
        match &self.kind {
            ScoreKind::NumOpportunityDists => "num_opportunity_dists",
            ScoreKind::RewardPartialDist => "reward_partial_dist",
            ScoreKind::RewardNextHighestClose => "reward_next_highest_close",
            ScoreKind::PenalizeMaximumOver => "penalize_maximum_over",
            ScoreKind::PenalizeAvgOver => "penalize_avg_over",
            ScoreKind::Custom { tag, .. } => tag,
        }
    }

    /// Score a plan given its district percentages.
    pub fn score(&self, percs: &[f64], threshold: f64) -> f64 {
        let count = percs.iter().filter(|&&p| p >= threshold).count() as f64;
        let next_highest = || percs.iter().copied()
            .filter(|&p| p < threshold)
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))));

        match &self.kind {
            ScoreKind::NumOpportunityDists => count,
            ScoreKind::RewardPartialDist => count + next_highest().unwrap_or(0.0),
            ScoreKind::RewardNextHighestClose => match next_highest() {
                Some(next) if next >= threshold - 0.1 => count + (next - threshold + 0.1) * 10.0,
                _ => count,
            },
            ScoreKind::PenalizeMaximumOver => {
                if count == 0.0 { return 0.0 }
                let max = percs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                count + (1.0 - max) / (1.0 - threshold)
            }
            ScoreKind::PenalizeAvgOver => {
                if count == 0.0 { return 0.0 }
                let avg = percs.iter().filter(|&&p| p >= threshold).sum::<f64>() / count;
                count + (1.0 - avg) / (1.0 - threshold)
            }
            ScoreKind::Custom { func, .. } => func(percs, threshold),
        }
    }
}

impl Default for ScoreFunction {
    fn default() -> Self { Self::num_opportunity_dists() }
}

impl fmt::Debug for ScoreFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScoreFunction").field(&self.name()).finish()
    }
}

impl PartialEq for ScoreFunction {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ScoreKind::Custom { func: a, .. }, ScoreKind::Custom { func: b, .. }) => Arc::ptr_eq(a, b),
            (ScoreKind::Custom { .. }, _) | (_, ScoreKind::Custom { .. }) => false,
            _ => self.tag() == other.tag(),
        }
    }
}

impl FromStr for ScoreFunction {
    type Err = Error;

    /// Accepts either the function name or its tag.
    fn from_str(s: &str) -> Result<Self> {
        match Self::builtins().into_iter().find(|f| f.name() == s || f.tag() == s) {
            Some(f) => Ok(f),
            None => bail!("unknown score function '{s}'"),
        }
    }
}

impl TryFrom<String> for ScoreFunction {
    type Error = Error;
    fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl Serialize for ScoreFunction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            ScoreKind::Custom { tag, .. } => Err(S::Error::custom(format!("custom score function '{tag}' cannot be serialized"))),
            _ => serializer.serialize_str(self.name()),
        }
    }
}
