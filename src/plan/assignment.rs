use std::cmp::Ordering;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{graph::PrecinctGraph, io::AttrValue};

/// What to do with precincts that carry no district label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingLabelPolicy {
    /// Leave unlabeled precincts unassigned (district 0) and log a warning.
    Omit,
    /// Treat any unlabeled precinct as a configuration error.
    #[default]
    Reject,
}

/// District label for each precinct, read from a label column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitialAssignment {
    labels: Vec<Option<String>>,
}

impl InitialAssignment {
    /// Read labels from `column`. Absent and null values count as missing.
    pub fn from_graph(graph: &PrecinctGraph, column: &str, policy: MissingLabelPolicy) -> Result<Self> {
        let labels = (0..graph.node_count())
            .map(|node| match graph.attribute(node, column) {
                None | Some(AttrValue::Null) => None,
                Some(value) => Some(value.to_string()),
            })
            .collect::<Vec<_>>();

        let missing = labels.iter().filter(|label| label.is_none()).count();
        if missing > 0 {
            let first = labels.iter().position(Option::is_none).unwrap_or_default();
            match policy {
                MissingLabelPolicy::Reject => bail!(
                    "{missing} precinct(s) have no '{column}' label (first: node {first})"
                ),
                MissingLabelPolicy::Omit => warn!(
                    missing, first, column, "precincts without a district label are left unassigned"
                ),
            }
        }

        Ok(Self { labels })
    }

    /// Build from explicit per-node labels.
    pub fn from_labels(labels: Vec<Option<String>>) -> Self { Self { labels } }

    #[inline] pub fn len(&self) -> usize { self.labels.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Label of a node, or None if it was left unassigned.
    #[inline] pub fn label(&self, node: usize) -> Option<&str> { self.labels[node].as_deref() }

    /// Number of nodes carrying a label.
    pub fn num_assigned(&self) -> usize { self.labels.iter().flatten().count() }

    /// Distinct labels, sorted numerically when every label is a number and lexically otherwise.
    pub fn distinct_labels(&self) -> Vec<String> {
        let mut labels = self.labels.iter().flatten().cloned().collect::<Vec<_>>();
        labels.sort_by(compare_labels);
        labels.dedup();
        labels
    }
}

fn compare_labels(a: &String, b: &String) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
