use rand::{Rng, seq::IteratorRandom};

use crate::partition::Partition;

impl Partition {
    /// Select a random neighbor of a given node that is in the same part.
    pub(crate) fn random_same_part_edge<R: Rng + ?Sized>(&self, node: usize, rng: &mut R) -> Option<usize> {
        assert!(node < self.graph().node_count(), "node {} out of range", node);
        let part = self.assignment(node);
        self.graph().edges(node)
            .filter(|&v| self.assignment(v) == part)
            .choose(rng)
    }

    /// Select a random cut edge joining two districts (edges touching unassigned nodes are skipped).
    /// Returns the two parts on either side.
    pub(crate) fn random_district_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(u32, u32)> {
        self.cut_edges().iter()
            .map(|&edge| {
                let (u, v) = self.graph().endpoints(edge);
                (self.assignment(u), self.assignment(v))
            })
            .filter(|&(a, b)| a != 0 && b != 0)
            .choose(rng)
    }
}
