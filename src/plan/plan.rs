use std::collections::HashMap;

use anyhow::{Result, anyhow, ensure};

use crate::{
    graph::PrecinctGraph,
    partition::Partition,
    plan::{Derived, InitialAssignment, Updaters},
};

/// A districting plan: an assignment of precincts to districts plus the
/// updaters that summarize each district.
///
/// Districts are numbered `1..=num_districts()` internally and carry the labels of the
/// initial assignment (`district_labels()[d - 1]`). Precincts without a label sit in
/// the unassigned district 0 and contribute to no updater.
#[derive(Clone, Debug)]
pub struct Plan {
    num_districts: u32, // number of districts (excluding unassigned 0)
    labels: Vec<String>,
    updaters: Updaters,
    pub(crate) partition: Partition,
}

impl Plan {
    /// Create a plan from an initial assignment with exactly `num_districts` distinct labels.
    pub fn new(
        graph: &PrecinctGraph,
        initial: &InitialAssignment,
        updaters: Updaters,
        num_districts: u32,
    ) -> Result<Self> {
        ensure!(num_districts > 0, "a plan needs at least one district");
        ensure!(initial.len() == graph.node_count(),
            "initial assignment covers {} precincts but the graph has {}", initial.len(), graph.node_count());
        updaters.validate()?;

        let labels = initial.distinct_labels();
        ensure!(labels.len() == num_districts as usize,
            "initial assignment has {} distinct district labels but {} districts were requested",
            labels.len(), num_districts);

        let index = labels.iter().enumerate()
            .map(|(i, label)| (label.as_str(), i as u32 + 1))
            .collect::<HashMap<_, _>>();

        let assignments = (0..graph.node_count())
            .map(|node| initial.label(node).map_or(0, |label| index[label]))
            .collect();

        let mut partition = Partition::new(num_districts as usize + 1, graph.weighted_graph(&updaters.columns())?);
        partition.set_assignments(assignments);

        Ok(Self { num_districts, labels, updaters, partition })
    }

    /// Get the number of districts in this plan (excluding unassigned 0).
    #[inline] pub fn num_districts(&self) -> u32 { self.num_districts }

    /// District labels, in district order.
    #[inline] pub fn district_labels(&self) -> &[String] { &self.labels }

    #[inline] pub fn updaters(&self) -> &Updaters { &self.updaters }

    /// Label of the district a precinct is in, or None if it is unassigned.
    #[inline]
    pub fn assignment_of(&self, node: usize) -> Option<&str> {
        self.label(self.partition.assignment(node))
    }

    /// District label of every precinct, indexed by node.
    pub fn assignments(&self) -> Vec<Option<&str>> {
        self.partition.assignments().into_iter()
            .map(|d| self.label(d))
            .collect()
    }

    #[inline]
    fn label(&self, district: u32) -> Option<&str> {
        match district {
            0 => None,
            d => Some(&self.labels[d as usize - 1]),
        }
    }

    /// Number of precincts left unassigned.
    #[inline] pub fn num_unassigned(&self) -> usize { self.partition.part(0).len() }

    /// Cut edges as precinct pairs `(u, v)` with `u < v`, sorted.
    pub fn cut_edges(&self) -> Vec<(usize, usize)> {
        let mut edges = self.partition.cut_edges().iter()
            .map(|&edge| self.partition.graph().endpoints(edge))
            .map(|(u, v)| (u.min(v), u.max(v)))
            .collect::<Vec<_>>();
        edges.sort_unstable();
        edges
    }

    /// Per-district values of a tally or derived updater, in district order.
    pub fn values(&self, name: &str) -> Result<Vec<f64>> {
        if let Some(tally) = self.updaters.tally(name) {
            return Ok((1..=self.num_districts)
                .map(|d| self.partition.part_total(&tally.column, d))
                .collect());
        }

        let derived = self.updaters.derived_value(name)
            .ok_or_else(|| anyhow!("no updater named '{name}'"))?;
        let [lhs, rhs] = derived.operands().map(|operand| self.values(operand));
        Ok(lhs?.into_iter().zip(rhs?)
            .map(|(a, b)| derived.apply(a, b))
            .collect())
    }

    /// Attach a derived updater to this plan.
    pub fn add_derived(&mut self, derived: Derived) -> Result<()> {
        self.updaters.push_derived(derived)
    }

    /// Total population over every precinct, assigned or not.
    pub fn population_total(&self) -> Result<f64> {
        let tally = self.updaters.tally(Updaters::POPULATION)
            .ok_or_else(|| anyhow!("plan has no '{}' tally", Updaters::POPULATION))?;
        Ok(self.partition.part_totals(&tally.column).iter().sum())
    }

    /// Check if every district is connected.
    #[inline] pub fn is_contiguous(&self) -> bool { self.partition.discontiguous_parts().is_empty() }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{io::AttrValue, plan::MissingLabelPolicy};

    /// 4x4 grid of precincts numbered row-major, `CD` = column + 1.
    /// Every precinct has TOTPOP 10, VAP 8 and HVAP 1; BVAP is 6 in the left
    /// column and the top row and 1 elsewhere; WVAP = VAP - BVAP - HVAP.
    pub(crate) fn grid_precincts() -> PrecinctGraph {
        let n = 4;
        let mut adjacency = vec![Vec::new(); n * n];
        let mut attributes = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                let u = r * n + c;
                if c > 0 { adjacency[u].push((u - 1) as u32) }
                if c + 1 < n { adjacency[u].push((u + 1) as u32) }
                if r > 0 { adjacency[u].push((u - n) as u32) }
                if r + 1 < n { adjacency[u].push((u + n) as u32) }

                let bvap = if c == 0 || r == 0 { 6.0 } else { 1.0 };
                attributes.push(BTreeMap::from([
                    ("CD".to_string(), AttrValue::Number((c + 1) as f64)),
                    ("TOTPOP".to_string(), AttrValue::Number(10.0)),
                    ("VAP".to_string(), AttrValue::Number(8.0)),
                    ("BVAP".to_string(), AttrValue::Number(bvap)),
                    ("HVAP".to_string(), AttrValue::Number(1.0)),
                    ("WVAP".to_string(), AttrValue::Number(8.0 - bvap - 1.0)),
                ]));
            }
        }
        PrecinctGraph::from_parts(adjacency, attributes).unwrap()
    }

    pub(crate) fn grid_plan() -> Plan {
        let graph = grid_precincts();
        let initial = InitialAssignment::from_graph(&graph, "CD", MissingLabelPolicy::Reject).unwrap();
        Plan::new(&graph, &initial, Updaters::gingles("TOTPOP"), 4).unwrap()
    }

    #[test]
    fn tallies_sum_precincts() {
        let plan = grid_plan();
        assert_eq!(plan.district_labels(), &["1", "2", "3", "4"]);
        assert_eq!(plan.values("population").unwrap(), vec![40.0; 4]);
        assert_eq!(plan.values("BVAP").unwrap(), vec![24.0, 9.0, 9.0, 9.0]);
        assert_eq!(plan.values("nWVAP").unwrap(), vec![28.0, 13.0, 13.0, 13.0]);
        assert_eq!(plan.population_total().unwrap(), 160.0);
        assert_eq!(plan.values("population").unwrap().iter().sum::<f64>(), 160.0);
        assert!(plan.is_contiguous());
        assert_eq!(plan.cut_edges().len(), 12);
        assert_eq!(plan.assignment_of(5), Some("2"));
        assert_eq!(plan.assignments()[..4], [Some("1"), Some("2"), Some("3"), Some("4")]);
    }

    #[test]
    fn ratios_stay_in_unit_interval() {
        let mut plan = grid_plan();
        plan.add_derived(Derived::Ratio {
            name: "BVAP_perc".into(),
            numerator: "BVAP".into(),
            denominator: "VAP".into(),
        }).unwrap();

        let percs = plan.values("BVAP_perc").unwrap();
        assert_eq!(percs[0], 0.75);
        assert!(percs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn unknown_updater_is_an_error() {
        assert!(grid_plan().values("CVAP").is_err());
    }

    #[test]
    fn district_count_must_match_labels() {
        let graph = grid_precincts();
        let initial = InitialAssignment::from_graph(&graph, "CD", MissingLabelPolicy::Reject).unwrap();
        let err = Plan::new(&graph, &initial, Updaters::gingles("TOTPOP"), 7).unwrap_err();
        assert!(err.to_string().contains("4 distinct district labels but 7 districts"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let graph = grid_precincts();
        let initial = InitialAssignment::from_graph(&graph, "CD", MissingLabelPolicy::Reject).unwrap();
        assert!(Plan::new(&graph, &initial, Updaters::gingles("POP20"), 4).is_err());
    }

    #[test]
    fn unlabeled_precincts_are_unassigned() {
        let graph = grid_precincts();
        let labels = (0..16)
            .map(|node| (node != 0).then(|| ((node % 4) + 1).to_string()))
            .collect();
        let plan = Plan::new(&graph, &InitialAssignment::from_labels(labels), Updaters::gingles("TOTPOP"), 4).unwrap();

        assert_eq!(plan.num_unassigned(), 1);
        assert_eq!(plan.assignment_of(0), None);
        assert_eq!(plan.assignments().iter().filter(|label| label.is_none()).count(), 1);
        assert_eq!(plan.values("population").unwrap(), vec![30.0, 40.0, 40.0, 40.0]);
        assert_eq!(plan.population_total().unwrap(), 160.0);
    }
}
