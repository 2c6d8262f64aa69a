/// Total assignment of nodes to districts with O(1) move and membership lookup.
/// District 0 holds unassigned nodes.
#[derive(Debug, Clone)]
pub(super) struct DistrictSet {
    members: Vec<Vec<usize>>, // members[d] = nodes currently in district d
    district: Vec<usize>,     // district[n] = d when n is in members[d]
    slot: Vec<usize>,         // slot[n] = i when members[d][i] == n
}

impl DistrictSet {
    /// Create `num_districts` districts over `num_nodes` nodes, all starting in district 0.
    pub(super) fn new(num_districts: usize, num_nodes: usize) -> Self {
        assert!(num_districts > 0, "must have at least one district");
        let mut members = vec![Vec::new(); num_districts];
        members[0] = (0..num_nodes).collect();

        Self {
            members,
            district: vec![0; num_nodes],
            slot: (0..num_nodes).collect(),
        }
    }

    #[inline] pub(super) fn num_districts(&self) -> usize { self.members.len() }

    #[inline] pub(super) fn num_nodes(&self) -> usize { self.district.len() }

    /// District that `node` currently belongs to.
    #[inline]
    pub(super) fn find(&self, node: usize) -> usize {
        debug_assert!(node < self.district.len(), "node out of range");
        self.district[node]
    }

    /// Nodes currently in `district`, in no particular order.
    #[inline]
    pub(super) fn get(&self, district: usize) -> &[usize] {
        debug_assert!(district < self.members.len(), "district out of range");
        &self.members[district]
    }

    /// District of every node, indexed by node.
    #[inline] pub(super) fn assignments(&self) -> &[usize] { &self.district }

    /// Replace all memberships from a complete assignment slice.
    pub(super) fn rebuild(&mut self, assignments: &[usize]) {
        assert!(assignments.len() == self.num_nodes(), "assignments length mismatch");

        self.members.iter_mut().for_each(|m| m.clear());
        for (node, &district) in assignments.iter().enumerate() {
            assert!(district < self.num_districts(), "district out of range");
            self.district[node] = district;
            self.slot[node] = self.members[district].len();
            self.members[district].push(node);
        }
    }

    /// Move `node` into `district` (no-op if already there).
    pub(super) fn move_to(&mut self, node: usize, district: usize) {
        debug_assert!(district < self.members.len(), "district out of range");

        let (prev, slot) = (self.district[node], self.slot[node]);
        if prev == district { return }

        // Swap-remove from the previous district, patching the slot of the swapped node.
        self.members[prev].swap_remove(slot);
        if let Some(&moved) = self.members[prev].get(slot) {
            self.slot[moved] = slot;
        }

        self.district[node] = district;
        self.slot[node] = self.members[district].len();
        self.members[district].push(node);
    }
}
