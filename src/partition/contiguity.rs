use std::collections::VecDeque;

use crate::partition::Partition;

impl Partition {
    /// Check if the nodes of `part` form a single connected component (empty parts count as contiguous).
    pub(crate) fn is_part_contiguous(&self, part: u32) -> bool {
        let nodes = self.part(part);
        let Some(&start) = nodes.first() else { return true };

        let mut visited = vec![false; self.num_nodes()];
        visited[start] = true;
        let mut seen = 1;

        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for v in self.graph().edges(u) {
                if !visited[v] && self.assignment(v) == part {
                    visited[v] = true;
                    seen += 1;
                    queue.push_back(v);
                }
            }
        }

        seen == nodes.len()
    }

    /// Districts (excluding unassigned 0) whose nodes are split into several components.
    pub(crate) fn discontiguous_parts(&self) -> Vec<u32> {
        (1..self.num_parts())
            .filter(|&part| !self.is_part_contiguous(part))
            .collect()
    }
}
