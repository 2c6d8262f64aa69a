//! Format-specific readers for precinct data and writers for experiment results.
//!
//! - `geojson` - GeoJSON FeatureCollections of (Multi)Polygon precincts
//! - `shp` - Shapefiles with a sidecar `.dbf` attribute table
//! - `npy` - NumPy `.npy` arrays for score traces
//! - `json` - pretty JSON for result records

mod geojson;
mod json;
mod npy;
mod shp;

use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Result, bail};
use geo::MultiPolygon;

pub(crate) use json::write_json;
pub(crate) use npy::write_npy;

/// A single attribute value attached to a precinct.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Null,
}

impl AttrValue {
    /// Numeric value, if this is a number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self { AttrValue::Number(v) => Some(*v), _ => None }
    }

    #[inline] pub fn is_null(&self) -> bool { matches!(self, AttrValue::Null) }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Number(v) => write!(f, "{v}"),
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::Null => write!(f, "null"),
        }
    }
}

/// One precinct as read from disk: its shape and attribute record.
#[derive(Clone, Debug)]
pub(crate) struct Feature {
    pub(crate) shape: MultiPolygon<f64>,
    pub(crate) attributes: BTreeMap<String, AttrValue>,
}

/// Read precinct features, dispatching on the file extension.
pub(crate) fn read_features(path: &Path) -> Result<Vec<Feature>> {
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("geojson" | "json") => geojson::read_geojson(path),
        Some("shp") => shp::read_shapefile(path),
        _ => bail!("unsupported precinct file format: {}", path.display()),
    }
}
