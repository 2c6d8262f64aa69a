use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::io::{AttrValue, Feature};

/// Read a GeoJSON FeatureCollection of Polygon/MultiPolygon precincts.
pub(super) fn read_geojson(path: &Path) -> Result<Vec<Feature>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;

    parse_feature_collection(&value)
}

/// Parse an in-memory FeatureCollection.
pub(super) fn parse_feature_collection(value: &Value) -> Result<Vec<Feature>> {
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON is not a FeatureCollection (missing 'features')"))?;

    features.iter().enumerate()
        .map(|(i, feature)| parse_feature(feature).with_context(|| format!("invalid feature {i}")))
        .collect()
}

fn parse_feature(feature: &Value) -> Result<Feature> {
    let geometry = feature["geometry"].as_object()
        .ok_or_else(|| anyhow!("missing geometry"))?;
    let coords = geometry.get("coordinates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("missing coordinates"))?;

    let shape = match geometry.get("type").and_then(|t| t.as_str()) {
        Some("Polygon") => MultiPolygon(vec![parse_polygon_coords(coords)?]),
        Some("MultiPolygon") => MultiPolygon(coords.iter()
            .map(|polygon| polygon.as_array()
                .ok_or_else(|| anyhow!("MultiPolygon member is not an array"))
                .and_then(|rings| parse_polygon_coords(rings)))
            .collect::<Result<Vec<_>>>()?),
        Some(other) => bail!("unsupported geometry type '{other}'"),
        None => bail!("geometry has no type"),
    };

    let attributes = match feature.get("properties") {
        Some(Value::Object(props)) => props.iter()
            .map(|(k, v)| (k.clone(), to_attr_value(v)))
            .collect(),
        _ => BTreeMap::new(),
    };

    Ok(Feature { shape, attributes })
}

fn to_attr_value(value: &Value) -> AttrValue {
    match value {
        Value::Null => AttrValue::Null,
        Value::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
        Value::Bool(b) => AttrValue::Number(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => AttrValue::Text(s.clone()),
        other => AttrValue::Text(other.to_string()),
    }
}

/// Parse polygon rings: the first ring is the exterior, the rest are holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("polygon ring is not an array"))
            .and_then(|coords| parse_ring_coords(coords))
    });

    let exterior = rings.next().ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring as `[[x, y], ...]`, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}
