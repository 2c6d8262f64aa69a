use anyhow::{Result, anyhow, bail};
use rand::{Rng, seq::{IndexedRandom, SliceRandom}};

use crate::partition::Partition;

/// Population window a district must fall into after a recombination step.
#[derive(Clone, Debug)]
pub(crate) struct BalanceBounds {
    series: String,
    target: f64,
    epsilon: f64,
}

impl BalanceBounds {
    /// Accept totals within `epsilon * target` of `target` (inclusive).
    pub(crate) fn new(series: impl Into<String>, target: f64, epsilon: f64) -> Self {
        Self { series: series.into(), target, epsilon }
    }

    #[inline] pub(crate) fn series(&self) -> &str { &self.series }

    #[inline]
    pub(crate) fn accepts(&self, total: f64) -> bool {
        (total - self.target).abs() <= self.epsilon * self.target
    }
}

/// Cut-friendly spanning tree representation.
#[derive(Debug)]
struct SpanningTree {
    parent: Vec<Option<usize>>, // parent[root] = root; None if node not in tree.
    order: Vec<usize>,          // preorder over nodes in the tree
    index: Vec<usize>,          // preorder entry index (0 if node not in tree)
    size: Vec<usize>,           // subtree sizes (0 if node not in tree)
}

impl SpanningTree {
    #[inline] fn root(&self) -> usize { self.order[0] }

    /// Subtree slice for `node` (contiguous in `order`); empty if `node` not in tree.
    #[inline]
    fn subtree_slice(&self, node: usize) -> &[usize] {
        &self.order[self.index[node]..self.index[node] + self.size[node]]
    }
}

impl Partition {
    /// Generate a uniformly random spanning tree over the nodes of `part`, using Wilson's algorithm.
    /// Returns None if the part is empty or not connected.
    fn random_spanning_tree<R: Rng + ?Sized>(&self, part: u32, rng: &mut R) -> Option<SpanningTree> {
        if !self.is_part_contiguous(part) { return None }

        let mut nodes = self.part(part).to_vec();
        if nodes.is_empty() { return None }

        let mut parent = vec![None; self.num_nodes()];

        // Randomize the order of the nodes in part, and choose a random root.
        nodes.shuffle(rng);
        let root = nodes[0];
        parent[root] = Some(root);

        // Loop-erased random walks.
        let mut walk_start = vec![usize::MAX; self.num_nodes()];
        let mut walk_position = vec![0; self.num_nodes()];

        for &start in &nodes[1..] {
            if parent[start].is_some() { continue } // already in the tree

            let mut walk = vec![start];
            walk_start[start] = start;
            walk_position[start] = 0;

            // Walk until we hit the tree.
            let mut current = start;
            while parent[current].is_none() {
                current = self.random_same_part_edge(current, rng)?;

                if walk_start[current] == start && walk.get(walk_position[current]) == Some(&current) {
                    walk.truncate(walk_position[current] + 1);
                } else {
                    walk_start[current] = start;
                    walk_position[current] = walk.len();
                    walk.push(current);
                }
            }

            // Stitch loop-erased path into the tree (reverse).
            while let Some(node) = walk.pop() {
                if parent[node].is_some() { continue }
                parent[node] = Some(current);
                current = node;
            }
        }

        let mut children = vec![Vec::new(); self.num_nodes()];
        for &u in &nodes {
            if let Some(p) = parent[u] {
                if p != u { children[p].push(u) }
            }
        }

        let mut order = Vec::with_capacity(nodes.len());
        let mut index = vec![0; self.num_nodes()];
        let mut size = vec![0; self.num_nodes()];

        // Iterative DFS preorder from the root; sizes are filled on exit.
        let mut stack = vec![(root, false)];
        while let Some((i, entered)) = stack.pop() {
            if !entered {
                index[i] = order.len();
                order.push(i);
                stack.push((i, true));
                for &u in children[i].iter().rev() {
                    stack.push((u, false));
                }
            } else {
                size[i] = 1 + children[i].iter().map(|&u| size[u]).sum::<usize>();
            }
        }

        Some(SpanningTree { parent, order, index, size })
    }

    /// Children `u` such that cutting (parent[u], u) leaves both sides within bounds.
    fn balanced_cuts(&self, tree: &SpanningTree, bounds: &BalanceBounds) -> Vec<usize> {
        let weights = self.graph().node_weights();

        // Prefix sums over preorder.
        let mut prefix = Vec::with_capacity(tree.order.len() + 1);
        let mut acc = 0.0;
        prefix.push(acc);
        for &u in &tree.order {
            acc += weights.get(bounds.series(), u).unwrap_or(0.0);
            prefix.push(acc);
        }
        let total = acc;

        tree.order.iter().copied()
            .filter(|&u| u != tree.root())
            .filter(|&u| {
                let sub = prefix[tree.index[u] + tree.size[u]] - prefix[tree.index[u]];
                bounds.accepts(sub) && bounds.accepts(total - sub)
            })
            .collect()
    }

    /// Merge parts `a` and `b`, then split them along a random balanced spanning-tree cut.
    /// Tries up to `attempts` trees; on failure the original assignment is restored and
    /// `false` is returned.
    pub(crate) fn recombine_parts<R: Rng + ?Sized>(
        &mut self,
        a: u32,
        b: u32,
        bounds: &BalanceBounds,
        attempts: usize,
        rng: &mut R,
    ) -> bool {
        assert!(a != b, "cannot recombine part {a} with itself");

        let original = self.part(b).to_vec();
        self.move_nodes(&original, a);

        for _ in 0..attempts {
            let Some(tree) = self.random_spanning_tree(a, rng) else { break };
            if let Some(&u) = self.balanced_cuts(&tree, bounds).choose(rng) {
                debug_assert!(tree.parent[u].is_some());
                let subtree = tree.subtree_slice(u).to_vec();
                self.move_nodes(&subtree, b);
                return true;
            }
        }

        self.move_nodes(&original, b);
        false
    }

    /// One ReCom proposal: pick a random cut edge between two districts and recombine them.
    /// A pair with no balanced cut is abandoned and a new pair drawn, up to `max_attempts` pairs.
    pub(crate) fn recom_step<R: Rng + ?Sized>(
        &mut self,
        bounds: &BalanceBounds,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<()> {
        for _ in 0..max_attempts {
            let (a, b) = self.random_district_pair(rng)
                .ok_or_else(|| anyhow!("no cut edge joins two districts"))?;
            if self.recombine_parts(a, b, bounds, max_attempts, rng) { return Ok(()) }
        }
        bail!("no balanced recombination found after {max_attempts} district pairs")
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::partition::partition::tests::grid_graph;

    fn columns() -> Partition {
        let mut partition = Partition::new(4, grid_graph());
        partition.set_assignments(vec![1, 2, 3, 1, 2, 3, 1, 2, 3]);
        partition
    }

    #[test]
    fn spanning_tree_covers_part() {
        let partition = columns();
        let mut rng = StdRng::seed_from_u64(3);
        let mut merged = partition.clone();
        merged.move_nodes(&[1, 4, 7], 1);

        let tree = merged.random_spanning_tree(1, &mut rng).unwrap();
        let mut nodes = tree.order.clone();
        nodes.sort_unstable();
        assert_eq!(nodes, vec![0, 1, 3, 4, 6, 7]);
        assert_eq!(tree.subtree_slice(tree.root()).len(), 6);

        // Every tree edge is a graph edge inside the part.
        for &u in &tree.order[1..] {
            let p = tree.parent[u].unwrap();
            assert!(merged.graph().edges(u).any(|v| v == p));
        }
    }

    #[test]
    fn spanning_tree_of_split_part_is_none() {
        let mut partition = Partition::new(3, grid_graph());
        partition.set_assignments(vec![2, 2, 2, 2, 2, 2, 1, 2, 1]);
        assert!(partition.random_spanning_tree(1, &mut StdRng::seed_from_u64(0)).is_none());
    }

    #[test]
    fn recombine_keeps_balance_and_contiguity() {
        let bounds = BalanceBounds::new("VAP", 3.0, 0.0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            let mut partition = columns();
            assert!(partition.recombine_parts(1, 2, &bounds, 100, &mut rng));
            assert_eq!(partition.part_total("VAP", 1), 3.0);
            assert_eq!(partition.part_total("VAP", 2), 3.0);
            assert!(partition.is_part_contiguous(1));
            assert!(partition.is_part_contiguous(2));
            assert_eq!(partition.part(3), columns().part(3));
        }
    }

    #[test]
    fn infeasible_recombination_restores_assignment() {
        let bounds = BalanceBounds::new("VAP", 2.5, 0.01);
        let mut partition = columns();
        let before = partition.assignments();

        assert!(!partition.recombine_parts(1, 2, &bounds, 10, &mut StdRng::seed_from_u64(5)));
        assert_eq!(partition.assignments(), before);
        assert_eq!(partition.part_totals("VAP"), vec![0.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn recom_steps_stay_valid() {
        let bounds = BalanceBounds::new("VAP", 3.0, 0.0);
        let mut partition = columns();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            partition.recom_step(&bounds, 100, &mut rng).unwrap();
            assert!(partition.discontiguous_parts().is_empty());
            assert!(partition.part_totals("VAP")[1..].iter().all(|&v| v == 3.0));
        }
    }

    #[test]
    fn recom_step_errors_when_exhausted() {
        let bounds = BalanceBounds::new("VAP", 2.5, 0.01);
        let err = columns().recom_step(&bounds, 5, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(err.to_string().contains("after 5 district pairs"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = BalanceBounds::new("TOTPOP", 100.0, 0.05);
        assert!(bounds.accepts(105.0));
        assert!(bounds.accepts(95.0));
        assert!(!bounds.accepts(105.5));
    }
}
