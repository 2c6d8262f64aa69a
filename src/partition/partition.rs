use std::sync::Arc;

use crate::{
    graph::{Graph, WeightMatrix},
    partition::{DistrictSet, EdgeSet},
};

/// A partition of a graph into parts (districts), with cached per-part totals and cut edges.
/// Part 0 holds unassigned nodes; districts are parts `1..num_parts()`.
#[derive(Clone, Debug)]
pub(crate) struct Partition {
    pub(super) parts: DistrictSet,     // Sets of nodes in each part (including unassigned 0)
    pub(super) cut_edges: EdgeSet,     // Edges whose endpoints lie in different parts
    part_weights: WeightMatrix,        // Per-part sums of every node series
    graph: Arc<Graph>,
}

impl Partition {
    /// Construct a partition with every node unassigned.
    pub(crate) fn new(num_parts: usize, graph: impl Into<Arc<Graph>>) -> Self {
        assert!(num_parts > 0, "num_parts must be at least 1");
        let graph: Arc<Graph> = graph.into();

        let mut part_weights = graph.node_weights().copy_of_size(num_parts);
        part_weights.set_row_to_sum_of(0, graph.node_weights());

        Self {
            parts: DistrictSet::new(num_parts, graph.node_count()),
            cut_edges: EdgeSet::new(graph.edge_count()),
            part_weights,
            graph,
        }
    }

    /// Get the number of parts (including unassigned 0).
    #[inline] pub(crate) fn num_parts(&self) -> u32 { self.parts.num_districts() as u32 }

    /// Get the number of nodes in the underlying graph.
    #[inline] pub(crate) fn num_nodes(&self) -> usize { self.graph.node_count() }

    /// Get a reference to the underlying graph.
    #[inline] pub(crate) fn graph(&self) -> &Graph { &self.graph }

    /// Get the part assignment of a given node.
    #[inline] pub(crate) fn assignment(&self, node: usize) -> u32 { self.parts.find(node) as u32 }

    /// Get a complete vector of assignments for each node.
    #[inline]
    pub(crate) fn assignments(&self) -> Vec<u32> {
        self.parts.assignments().iter().map(|&p| p as u32).collect()
    }

    /// Nodes currently in `part`.
    #[inline] pub(crate) fn part(&self, part: u32) -> &[usize] { self.parts.get(part as usize) }

    /// Undirected ids of every cut edge, in no particular order.
    #[inline] pub(crate) fn cut_edges(&self) -> &[usize] { self.cut_edges.as_slice() }

    /// Replace every assignment and recompute all caches.
    pub(crate) fn set_assignments(&mut self, assignments: Vec<u32>) {
        assert!(assignments.len() == self.num_nodes(), "assignments.len() must equal number of nodes");
        assert!(assignments.iter().all(|&p| p < self.num_parts()), "all assignments must be in range [0, {})", self.num_parts());

        self.parts.rebuild(&assignments.iter().map(|&p| p as usize).collect::<Vec<_>>());

        // Recompute cut edges.
        self.cut_edges.clear();
        for edge in 0..self.graph.edge_count() {
            let (u, v) = self.graph.endpoints(edge);
            if assignments[u] != assignments[v] { self.cut_edges.insert(edge) }
        }

        // Recompute per-part totals.
        self.part_weights.clear_all_rows();
        for (node, &part) in assignments.iter().enumerate() {
            self.part_weights.add_row_from(part as usize, self.graph.node_weights(), node);
        }
    }

    /// Sum of a given series for a specific part.
    pub(crate) fn part_total(&self, series: &str, part: u32) -> f64 {
        self.part_weights.get(series, part as usize)
            .unwrap_or_else(|| panic!("part weights missing series '{series}'"))
    }

    /// Sum of a given series for each part (including unassigned 0).
    pub(crate) fn part_totals(&self, series: &str) -> Vec<f64> {
        (0..self.num_parts())
            .map(|part| self.part_total(series, part))
            .collect()
    }

    /// Check whether the node weights carry a given series.
    #[inline] pub(crate) fn has_series(&self, series: &str) -> bool { self.part_weights.contains(series) }

    /// Move a set of nodes into `part`, updating totals and cut edges.
    /// Nodes may come from any parts; nodes already in `part` are skipped.
    pub(crate) fn move_nodes(&mut self, nodes: &[usize], part: u32) {
        assert!(part < self.num_parts(), "part {} out of range [0, {})", part, self.num_parts());

        let moved = nodes.iter().copied()
            .filter(|&u| self.assignment(u) != part)
            .collect::<Vec<_>>();

        // Commit assignments and per-part totals.
        for &u in &moved {
            let prev = self.assignment(u);
            if prev == part { continue } // listed twice
            self.part_weights.subtract_row_from(prev as usize, self.graph.node_weights(), u);
            self.part_weights.add_row_from(part as usize, self.graph.node_weights(), u);
            self.parts.move_to(u, part as usize);
        }

        // Only edges incident to moved nodes can change cut status.
        let graph = Arc::clone(&self.graph);
        for &u in &moved {
            for (v, edge) in graph.edges_with_ids(u) {
                let cut = self.assignment(u) != self.assignment(v);
                self.cut_edges.set(edge, cut);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 3x3 grid numbered row-major, with TOTPOP = node + 1 and VAP = 1 everywhere.
    pub(crate) fn grid_graph() -> Arc<Graph> {
        let n = 3;
        let mut edges = vec![Vec::new(); n * n];
        for r in 0..n {
            for c in 0..n {
                let u = r * n + c;
                if c + 1 < n { edges[u].push((u + 1) as u32); edges[u + 1].push(u as u32); }
                if r + 1 < n { edges[u].push((u + n) as u32); edges[u + n].push(u as u32); }
            }
        }
        let node_weights = WeightMatrix::new(n * n, vec![
            ("TOTPOP".into(), (1..=9).map(|v| v as f64).collect()),
            ("VAP".into(), vec![1.0; 9]),
        ]);
        Arc::new(Graph::new(n * n, &edges, node_weights))
    }

    /// Recount cut edges from scratch.
    fn brute_force_cut_edges(partition: &Partition) -> Vec<usize> {
        let mut cut = (0..partition.graph().edge_count())
            .filter(|&e| {
                let (u, v) = partition.graph().endpoints(e);
                partition.assignment(u) != partition.assignment(v)
            })
            .collect::<Vec<_>>();
        cut.sort_unstable();
        cut
    }

    fn sorted_cut_edges(partition: &Partition) -> Vec<usize> {
        let mut cut = partition.cut_edges().to_vec();
        cut.sort_unstable();
        cut
    }

    #[test]
    fn new_partition_is_unassigned() {
        let partition = Partition::new(3, grid_graph());
        assert_eq!(partition.num_parts(), 3);
        assert_eq!(partition.part(0).len(), 9);
        assert!(partition.part(1).is_empty());
        assert_eq!(partition.part_totals("TOTPOP"), vec![45.0, 0.0, 0.0]);
        assert!(partition.cut_edges().is_empty());
    }

    #[test]
    fn set_assignments_recomputes_caches() {
        let mut partition = Partition::new(3, grid_graph());
        // Left column + middle column in district 1, right column in district 2.
        partition.set_assignments(vec![1, 1, 2, 1, 1, 2, 1, 1, 2]);

        assert_eq!(partition.part_totals("TOTPOP"), vec![0.0, 27.0, 18.0]);
        assert_eq!(partition.part_total("VAP", 2), 3.0);
        assert_eq!(partition.cut_edges().len(), 3);
        assert_eq!(sorted_cut_edges(&partition), brute_force_cut_edges(&partition));
    }

    #[test]
    fn move_nodes_updates_totals_and_cut_edges() {
        let mut partition = Partition::new(3, grid_graph());
        partition.set_assignments(vec![1, 1, 2, 1, 1, 2, 1, 1, 2]);

        partition.move_nodes(&[1, 4, 7, 4], 2);
        assert_eq!(partition.assignments(), vec![1, 2, 2, 1, 2, 2, 1, 2, 2]);
        assert_eq!(partition.part_total("TOTPOP", 1), 1.0 + 4.0 + 7.0);
        assert_eq!(partition.part_total("TOTPOP", 2), 45.0 - 12.0);
        assert_eq!(sorted_cut_edges(&partition), brute_force_cut_edges(&partition));

        // Moving nodes from two different parts at once.
        partition.move_nodes(&[0, 2], 0);
        assert_eq!(partition.part_totals("TOTPOP"), vec![4.0, 11.0, 30.0]);
        assert_eq!(sorted_cut_edges(&partition), brute_force_cut_edges(&partition));
    }

    #[test]
    #[should_panic(expected = "all assignments must be in range")]
    fn set_assignments_rejects_unknown_part() {
        Partition::new(2, grid_graph()).set_assignments(vec![0, 1, 2, 0, 0, 0, 0, 0, 0]);
    }
}
