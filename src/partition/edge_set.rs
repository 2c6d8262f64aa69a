/// Set of undirected edge ids with O(1) insert, remove, and membership.
#[derive(Debug, Clone)]
pub(super) struct EdgeSet {
    edges: Vec<usize>,
    slot: Vec<Option<usize>>, // slot[e] = Some(i) when edges[i] == e
}

impl EdgeSet {
    /// An empty set over edge ids `0..num_edges`.
    pub(super) fn new(num_edges: usize) -> Self {
        Self { edges: Vec::new(), slot: vec![None; num_edges] }
    }

    #[inline] pub(super) fn contains(&self, edge: usize) -> bool { self.slot[edge].is_some() }

    /// Members in no particular order.
    #[inline] pub(super) fn as_slice(&self) -> &[usize] { &self.edges }

    pub(super) fn clear(&mut self) {
        self.edges.iter().for_each(|&e| self.slot[e] = None);
        self.edges.clear();
    }

    pub(super) fn insert(&mut self, edge: usize) {
        if self.slot[edge].is_none() {
            self.slot[edge] = Some(self.edges.len());
            self.edges.push(edge);
        }
    }

    pub(super) fn remove(&mut self, edge: usize) {
        let Some(i) = self.slot[edge].take() else { return };
        self.edges.swap_remove(i);
        if let Some(&moved) = self.edges.get(i) {
            self.slot[moved] = Some(i);
        }
    }

    /// Insert or remove `edge` so membership equals `present`.
    #[inline]
    pub(super) fn set(&mut self, edge: usize, present: bool) {
        if present == self.contains(edge) { return }
        if present { self.insert(edge) } else { self.remove(edge) }
    }
}
