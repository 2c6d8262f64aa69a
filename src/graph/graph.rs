use crate::graph::WeightMatrix;

/// An undirected graph in compressed sparse row format, with numeric node series.
///
/// Every undirected edge `{u, v}` is stored twice (once per endpoint) and is given a
/// single id in `0..edge_count()`, so that per-edge state can be kept in flat vectors.
#[derive(Debug, Default)]
pub(crate) struct Graph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
    edge_ids: Vec<u32>,          // directed slot -> undirected edge id
    endpoints: Vec<(u32, u32)>,  // undirected edge id -> (u, v) with u < v
    node_weights: WeightMatrix,
}

impl Graph {
    /// Construct a graph from symmetric adjacency lists and node weights.
    pub(crate) fn new(num_nodes: usize, edges: &[Vec<u32>], node_weights: WeightMatrix) -> Self {
        assert!(edges.len() == num_nodes, "edges.len() must equal num_nodes");
        assert!(node_weights.num_rows() == num_nodes, "node_weights must have one row per node");

        let offsets = std::iter::once(0u32).chain(
            edges.iter()
                .map(|v| v.len() as u32)
                .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
        ).collect::<Vec<u32>>();

        // Number each undirected edge from its lower endpoint, then look up the
        // matching slot from the higher endpoint.
        let mut edge_ids = vec![u32::MAX; offsets[num_nodes] as usize];
        let mut endpoints = Vec::with_capacity(edge_ids.len() / 2);
        for (u, neighbors) in edges.iter().enumerate() {
            for (i, &v) in neighbors.iter().enumerate() {
                assert!((v as usize) < num_nodes, "edge {u} -> {v} out of range");
                assert!(v as usize != u, "self-loop on node {u}");
                assert!(!neighbors[..i].contains(&v), "duplicate edge {u} -> {v}");
                if (u as u32) < v {
                    assert!(edges[v as usize].contains(&(u as u32)), "edge {u} -> {v} has no reverse edge");
                    edge_ids[offsets[u] as usize + i] = endpoints.len() as u32;
                    endpoints.push((u as u32, v));
                }
            }
        }
        for (u, neighbors) in edges.iter().enumerate() {
            for (i, &v) in neighbors.iter().enumerate() {
                if (v as usize) < u {
                    let reverse = edges[v as usize].iter().position(|&w| w as usize == u)
                        .unwrap_or_else(|| panic!("edge {u} -> {v} has no reverse edge"));
                    edge_ids[offsets[u] as usize + i] = edge_ids[offsets[v as usize] as usize + reverse];
                }
            }
        }

        Self {
            size: num_nodes,
            offsets,
            edges: edges.iter().flatten().copied().collect(),
            edge_ids,
            endpoints,
            node_weights,
        }
    }

    /// Get the number of nodes in the graph.
    #[inline] pub(crate) fn node_count(&self) -> usize { self.size }

    /// Get the number of undirected edges in the graph.
    #[inline] pub(crate) fn edge_count(&self) -> usize { self.endpoints.len() }

    /// Get a reference to the node weights matrix.
    #[inline] pub(crate) fn node_weights(&self) -> &WeightMatrix { &self.node_weights }

    /// Get the range of edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub(crate) fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Get an iterator over the neighbors of a given node, paired with undirected edge ids.
    #[inline]
    pub(crate) fn edges_with_ids(&self, node: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.range(node).map(move |v| (self.edges[v] as usize, self.edge_ids[v] as usize))
    }

    /// Endpoints `(u, v)` of an undirected edge, with `u < v`.
    #[inline]
    pub(crate) fn endpoints(&self, edge: usize) -> (usize, usize) {
        let (u, v) = self.endpoints[edge];
        (u as usize, v as usize)
    }
}
