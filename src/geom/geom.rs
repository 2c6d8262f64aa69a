use anyhow::{Context, Result, anyhow};
use geo::{BoundingRect, MultiPolygon, Relate};
use rstar::{RTree, RTreeObject, primitives::{GeomWithData, Rectangle}};
use serde::{Deserialize, Serialize};

/// A precinct's bounding box in the R-tree, carrying the precinct index.
type BoundingBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Which shared-boundary relation makes two precincts adjacent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjacency {
    /// Shapes share a boundary segment of positive length, or overlap.
    #[default]
    Rook,
    /// Shapes share at least one point.
    Queen,
}

/// Precinct shapes with an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<BoundingBox>,
}

impl Geometries {
    /// Construct from a list of MultiPolygons; every shape must be non-empty.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>) -> Result<Self> {
        let boxes = shapes.iter().enumerate()
            .map(|(i, shape)| shape.bounding_rect()
                .map(|rect| BoundingBox::new(Rectangle::from_corners(rect.min().into(), rect.max().into()), i))
                .ok_or_else(|| anyhow!("shape {i} is empty")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rtree: RTree::bulk_load(boxes), shapes })
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Compute symmetric adjacency lists, sorted within each row.
    /// Uses the DE-9IM matrix. Queen needs any intersection; rook needs a 1-dimensional
    /// boundary/boundary intersection or a 2-dimensional interior overlap, so slivers
    /// left by digitizing errors still connect their precincts.
    pub(crate) fn adjacencies(&self, adjacency: Adjacency) -> Result<Vec<Vec<u32>>> {
        let mut adj_list = vec![Vec::new(); self.shapes.len()];

        for cand in self.rtree.iter() {
            let i = cand.data;
            let search = cand.envelope();

            for other in self.rtree.locate_in_envelope_intersecting(&search) {
                let j = other.data;
                if j <= i { continue } // each unordered pair once

                let im = self.shapes[i].relate(&self.shapes[j]);
                let adjacent = match adjacency {
                    Adjacency::Queen => im.is_intersects(),
                    // Index 0 is Interior/Interior, index 4 is Boundary/Boundary.
                    Adjacency::Rook => ["2********", "****1****"].into_iter()
                        .map(|pattern| im.matches(pattern))
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|| format!("invalid DE-9IM pattern for shapes {i} and {j}"))?
                        .contains(&true),
                };

                if adjacent {
                    adj_list[i].push(j as u32);
                    adj_list[j].push(i as u32);
                }
            }
        }

        adj_list.iter_mut().for_each(|neighbors| neighbors.sort_unstable());
        Ok(adj_list)
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use super::*;

    /// Unit square with lower-left corner at (x, y).
    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]])
    }

    /// 2x2 grid: 0 1 on the bottom row, 2 3 on the top row.
    fn grid() -> Geometries {
        Geometries::new(vec![square(0.0, 0.0), square(1.0, 0.0), square(0.0, 1.0), square(1.0, 1.0)]).unwrap()
    }

    #[test]
    fn rook_requires_shared_edge() {
        let adj = grid().adjacencies(Adjacency::Rook).unwrap();
        assert_eq!(adj, vec![vec![1, 2], vec![0, 3], vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn queen_includes_corner_contact() {
        let adj = grid().adjacencies(Adjacency::Queen).unwrap();
        assert_eq!(adj, vec![vec![1, 2, 3], vec![0, 2, 3], vec![0, 1, 3], vec![0, 1, 2]]);
    }

    #[test]
    fn disjoint_shapes_are_not_adjacent() {
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(5.0, 5.0)]).unwrap();
        assert_eq!(geoms.adjacencies(Adjacency::Queen).unwrap(), vec![Vec::<u32>::new(), vec![]]);
        assert_eq!(geoms.len(), 2);
    }

    #[test]
    fn overlapping_shapes_are_adjacent() {
        // Second square overlaps the first by a 0.01-wide sliver.
        let geoms = Geometries::new(vec![square(0.0, 0.0), square(0.99, 0.0), square(3.0, 0.0)]).unwrap();
        let expected = vec![vec![1], vec![0], vec![]];
        assert_eq!(geoms.adjacencies(Adjacency::Rook).unwrap(), expected);
        assert_eq!(geoms.adjacencies(Adjacency::Queen).unwrap(), expected);
    }

    #[test]
    fn empty_shape_is_rejected() {
        assert!(Geometries::new(vec![square(0.0, 0.0), MultiPolygon(vec![])]).is_err());
    }
}
