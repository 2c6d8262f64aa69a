use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{Reader, Shape, dbase::{FieldValue, Record}};

use crate::io::{AttrValue, Feature};

/// Read all polygon shapes and their `.dbf` records from a `.shp` file.
pub(super) fn read_shapefile(path: &Path) -> Result<Vec<Feature>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut features = Vec::with_capacity(reader.shape_count()?);
    for (i, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result.context("Error reading shape+record")?;
        let shape = match shape {
            Shape::Polygon(polygon) => shp_to_geo(&polygon),
            other => bail!("found non-Polygon shape at record {i}: {:?}", other.shapetype()),
        };
        features.push(Feature { shape, attributes: record_to_attributes(record) });
    }

    Ok(features)
}

fn record_to_attributes(record: Record) -> BTreeMap<String, AttrValue> {
    record.into_iter()
        .map(|(field, value)| {
            let value = match value {
                FieldValue::Character(Some(s)) => AttrValue::Text(s.trim().to_string()),
                FieldValue::Numeric(Some(n)) => AttrValue::Number(n),
                FieldValue::Float(Some(n)) => AttrValue::Number(n as f64),
                FieldValue::Double(n) => AttrValue::Number(n),
                FieldValue::Integer(n) => AttrValue::Number(n as f64),
                FieldValue::Currency(n) => AttrValue::Number(n),
                FieldValue::Logical(Some(b)) => AttrValue::Number(if b { 1.0 } else { 0.0 }),
                FieldValue::Memo(s) => AttrValue::Text(s),
                _ => AttrValue::Null,
            };
            (field, value)
        })
        .collect()
}

/// Convert a shapefile polygon to a geo MultiPolygon.
/// Shapefile rings are stored as exteriors (clockwise) each followed by their holes.
fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    /// Signed area of a closed ring (negative when clockwise).
    fn signed_area(pts: &[Coord<f64>]) -> f64 {
        pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    let mut polys = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in p.rings() {
        let mut coords = ring.points().iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect::<Vec<_>>();
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] { coords.push(coords[0]) }

        if signed_area(&coords) < 0.0 {
            if let Some(ext) = exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(LineString(coords));
        } else {
            holes.push(LineString(coords));
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}
