use std::{collections::BTreeMap, path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow, ensure};
use tracing::debug;

use crate::{
    geom::{Adjacency, Geometries},
    graph::{Graph, WeightMatrix},
    io::{AttrValue, read_features},
};

/// Precinct adjacency graph with per-precinct attribute records.
///
/// Nodes are indexed `0..node_count()` in file order. The graph is read-only once built;
/// numeric series are pulled out of the attribute records on demand when a plan is created.
#[derive(Debug)]
pub struct PrecinctGraph {
    adjacency: Vec<Vec<u32>>,
    attributes: Vec<BTreeMap<String, AttrValue>>,
    geoms: Option<Geometries>,
}

impl PrecinctGraph {
    /// Read precincts from a GeoJSON or shapefile and connect them by shared boundaries.
    pub fn from_file(path: &Path, adjacency: Adjacency) -> Result<Self> {
        let features = read_features(path)
            .with_context(|| format!("Failed to read precincts from {}", path.display()))?;

        let (shapes, attributes): (Vec<_>, Vec<_>) = features.into_iter()
            .map(|feature| (feature.shape, feature.attributes))
            .unzip();

        let geoms = Geometries::new(shapes)?;
        let adj = geoms.adjacencies(adjacency)?;
        debug!(nodes = geoms.len(), ?adjacency, "computed precinct adjacencies");

        let mut graph = Self::from_parts(adj, attributes)?;
        graph.geoms = Some(geoms);
        Ok(graph)
    }

    /// Build a graph from explicit adjacency lists and attribute records.
    /// Adjacency must be symmetric and in range, with no self-loops or repeated neighbors.
    pub fn from_parts(adjacency: Vec<Vec<u32>>, attributes: Vec<BTreeMap<String, AttrValue>>) -> Result<Self> {
        ensure!(adjacency.len() == attributes.len(),
            "adjacency has {} rows but {} attribute records were given", adjacency.len(), attributes.len());

        let n = adjacency.len();
        for (u, neighbors) in adjacency.iter().enumerate() {
            for (i, &v) in neighbors.iter().enumerate() {
                ensure!((v as usize) < n, "node {u} has out-of-range neighbor {v}");
                ensure!(v as usize != u, "node {u} is adjacent to itself");
                ensure!(!neighbors[..i].contains(&v), "node {u} lists neighbor {v} more than once");
                ensure!(adjacency[v as usize].contains(&(u as u32)), "edge {u} -> {v} has no reverse edge");
            }
        }

        Ok(Self { adjacency, attributes, geoms: None })
    }

    /// Number of precincts.
    #[inline] pub fn node_count(&self) -> usize { self.adjacency.len() }

    /// Number of undirected adjacencies.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|v| v.len()).sum::<usize>() / 2
    }

    /// Neighbors of a precinct.
    #[inline] pub fn neighbors(&self, node: usize) -> &[u32] { &self.adjacency[node] }

    /// Attribute value of a precinct, if present.
    #[inline]
    pub fn attribute(&self, node: usize, column: &str) -> Option<&AttrValue> {
        self.attributes[node].get(column)
    }

    /// Whether precinct geometries were loaded with the graph.
    #[inline] pub fn has_geometry(&self) -> bool { self.geoms.is_some() }

    /// Every attribute column name seen on any precinct.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.attributes.iter()
            .flat_map(|record| record.keys().cloned())
            .collect::<Vec<_>>();
        columns.sort();
        columns.dedup();
        columns
    }

    /// Values of a numeric column for every precinct; errors if any precinct lacks it.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>> {
        self.attributes.iter().enumerate()
            .map(|(node, record)| record.get(column)
                .and_then(AttrValue::as_f64)
                .ok_or_else(|| anyhow!("node {node} has no numeric value for column '{column}'")))
            .collect()
    }

    /// Sum of a numeric column across all precincts.
    pub fn total(&self, column: &str) -> Result<f64> {
        Ok(self.numeric_column(column)?.iter().sum())
    }

    /// Build the CSR graph carrying the given numeric columns as node weights.
    pub(crate) fn weighted_graph(&self, columns: &[&str]) -> Result<Arc<Graph>> {
        let mut series = Vec::with_capacity(columns.len());
        for &column in columns {
            if series.iter().any(|(name, _): &(String, Vec<f64>)| name == column) { continue }
            series.push((column.to_string(), self.numeric_column(column)?));
        }

        let weights = WeightMatrix::new(self.node_count(), series);
        Ok(Arc::new(Graph::new(self.node_count(), &self.adjacency, weights)))
    }
}
