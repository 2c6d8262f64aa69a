mod graph;
mod precincts;
mod weights;

pub(crate) use graph::Graph;
pub use precincts::PrecinctGraph;
pub(crate) use weights::WeightMatrix;
