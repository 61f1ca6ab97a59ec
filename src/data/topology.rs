//! Topology document decoding.
//!
//! A topology stores each shared boundary once (as an "arc") and describes
//! polygons as lists of arc indices. Decoding:
//!
//! - undo the quantization transform (delta-encoded integers → coordinates)
//! - resolve arc references (`!i` for negative indices means arc `i` reversed)
//! - stitch consecutive arcs into rings, emitting each shared endpoint once
//!
//! The result is one `GeoFeature` (a `geo::MultiPolygon`) per geometry.

use std::collections::HashMap;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Fips, GeoFeature, MapLayers};
use crate::error::AppError;

pub const COUNTIES_OBJECT: &str = "counties";
pub const STATES_OBJECT: &str = "states";

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

/// Feature identifier as found in the document: a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TopoId {
    Number(u64),
    Text(String),
}

impl TopoId {
    pub fn to_fips(&self) -> Option<Fips> {
        match self {
            TopoId::Number(n) => Fips::try_from(*n).ok(),
            TopoId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub enum TopoGeometry {
    GeometryCollection {
        geometries: Vec<TopoGeometry>,
    },
    Polygon {
        id: Option<TopoId>,
        arcs: Vec<Vec<i64>>,
    },
    MultiPolygon {
        id: Option<TopoId>,
        arcs: Vec<Vec<Vec<i64>>>,
    },
    /// Points, lines and null geometries carry no area to draw.
    Unsupported,
}

/// Geometry as written. `type` may be null, so the tag is read by hand.
#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<TopoId>,
    #[serde(default)]
    arcs: Option<serde_json::Value>,
    #[serde(default)]
    geometries: Option<Vec<TopoGeometry>>,
}

impl TryFrom<RawGeometry> for TopoGeometry {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        match raw.kind.as_deref() {
            Some("GeometryCollection") => Ok(TopoGeometry::GeometryCollection {
                geometries: raw.geometries.unwrap_or_default(),
            }),
            Some("Polygon") => Ok(TopoGeometry::Polygon {
                id: raw.id,
                arcs: arc_refs(raw.arcs, "Polygon")?,
            }),
            Some("MultiPolygon") => Ok(TopoGeometry::MultiPolygon {
                id: raw.id,
                arcs: arc_refs(raw.arcs, "MultiPolygon")?,
            }),
            _ => Ok(TopoGeometry::Unsupported),
        }
    }
}

fn arc_refs<T: serde::de::DeserializeOwned>(value: Option<serde_json::Value>, kind: &str) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{kind} geometry has no arcs"))?;
    serde_json::from_value(value).map_err(|e| format!("{kind} arcs: {e}"))
}

/// Extract the county and state layers. Either object missing is fatal.
pub fn extract_layers(topology: &Topology) -> Result<MapLayers, AppError> {
    let decoded = DecodedArcs::new(topology);
    let counties = decode_object(topology, &decoded, COUNTIES_OBJECT)?;
    let states = decode_object(topology, &decoded, STATES_OBJECT)?;
    debug!(counties = counties.len(), states = states.len(), "decoded topology layers");
    Ok(MapLayers { counties, states })
}

/// Decode one named object into features (collections are flattened).
pub fn extract_features(topology: &Topology, name: &str) -> Result<Vec<GeoFeature>, AppError> {
    decode_object(topology, &DecodedArcs::new(topology), name)
}

fn decode_object(topology: &Topology, arcs: &DecodedArcs, name: &str) -> Result<Vec<GeoFeature>, AppError> {
    let object = topology
        .objects
        .get(name)
        .ok_or_else(|| AppError::topology(format!("Topology has no '{name}' object.")))?;

    let mut out = Vec::new();
    collect_features(object, arcs, &mut out)?;
    Ok(out)
}

fn collect_features(geom: &TopoGeometry, arcs: &DecodedArcs, out: &mut Vec<GeoFeature>) -> Result<(), AppError> {
    match geom {
        TopoGeometry::GeometryCollection { geometries } => {
            for g in geometries {
                collect_features(g, arcs, out)?;
            }
        }
        TopoGeometry::Polygon { id, arcs: rings } => {
            let polygon = arcs.polygon(rings)?;
            out.push(GeoFeature {
                id: id.as_ref().and_then(TopoId::to_fips),
                geometry: MultiPolygon::new(vec![polygon]),
            });
        }
        TopoGeometry::MultiPolygon { id, arcs: polygons } => {
            let polygons = polygons
                .iter()
                .map(|rings| arcs.polygon(rings))
                .collect::<Result<Vec<_>, _>>()?;
            out.push(GeoFeature {
                id: id.as_ref().and_then(TopoId::to_fips),
                geometry: MultiPolygon::new(polygons),
            });
        }
        TopoGeometry::Unsupported => {}
    }
    Ok(())
}

/// Arcs with the transform already applied.
struct DecodedArcs {
    arcs: Vec<Vec<Coord<f64>>>,
}

impl DecodedArcs {
    fn new(topology: &Topology) -> Self {
        let arcs = topology
            .arcs
            .iter()
            .map(|arc| decode_arc(arc, topology.transform.as_ref()))
            .collect();
        Self { arcs }
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>, AppError> {
        let mut rings = rings.iter().map(|r| self.ring(r));
        let exterior = match rings.next() {
            Some(ring) => ring?,
            None => LineString::new(Vec::new()),
        };
        let interiors = rings.collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    fn ring(&self, refs: &[i64]) -> Result<LineString<f64>, AppError> {
        let mut points: Vec<Coord<f64>> = Vec::new();
        for &r in refs {
            let (index, reversed) = if r < 0 { (!r, true) } else { (r, false) };
            let arc = usize::try_from(index)
                .ok()
                .and_then(|i| self.arcs.get(i))
                .ok_or_else(|| AppError::topology(format!("Arc reference {r} is out of range.")))?;

            // Consecutive arcs share an endpoint; keep it once.
            points.pop();
            if reversed {
                points.extend(arc.iter().rev().copied());
            } else {
                points.extend(arc.iter().copied());
            }
        }
        Ok(LineString::new(points))
    }
}

fn decode_arc(positions: &[Vec<f64>], transform: Option<&Transform>) -> Vec<Coord<f64>> {
    let mut out = Vec::with_capacity(positions.len());
    match transform {
        Some(t) => {
            let (mut x, mut y) = (0.0, 0.0);
            for p in positions {
                x += p.first().copied().unwrap_or(0.0);
                y += p.get(1).copied().unwrap_or(0.0);
                out.push(Coord {
                    x: x * t.scale[0] + t.translate[0],
                    y: y * t.scale[1] + t.translate[1],
                });
            }
        }
        None => {
            for p in positions {
                out.push(Coord {
                    x: p.first().copied().unwrap_or(0.0),
                    y: p.get(1).copied().unwrap_or(0.0),
                });
            }
        }
    }
    out
}
