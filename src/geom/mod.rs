mod geom;

pub(crate) use geom::Geometries;
pub use geom::Adjacency;
