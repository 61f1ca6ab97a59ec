//! Shared domain types.
//!
//! These types are intentionally kept small and immutable once built so they can be:
//!
//! - shared between the SVG/HTML writers and the terminal preview
//! - compared across runs (rendering is a pure function of the fetched payloads)

use std::path::PathBuf;

use clap::ValueEnum;
use geo::{BoundingRect, MultiPolygon};
use serde::{Deserialize, Serialize};

use crate::scale::Rgb;

/// County FIPS code: the join key between geometry and statistics.
pub type Fips = u32;

/// SVG canvas size (pixels).
pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 800;

/// One row of the education dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub fips: Fips,
    pub area_name: String,
    pub state: String,
    /// Percentage of adults (25+) with a bachelor's degree or higher.
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// A decoded topology geometry plus its identifier.
///
/// County ids equal the education `fips` values. State ids are carried but unused.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: Option<Fips>,
    pub geometry: MultiPolygon<f64>,
}

/// The two disjoint feature collections drawn on the map.
#[derive(Debug, Clone, Default)]
pub struct MapLayers {
    pub counties: Vec<GeoFeature>,
    pub states: Vec<GeoFeature>,
}

impl MapLayers {
    /// Bounding box of every feature in both layers.
    pub fn extent(&self) -> Option<MapExtent> {
        let mut extent: Option<MapExtent> = None;
        for feature in self.counties.iter().chain(self.states.iter()) {
            let Some(rect) = feature.geometry.bounding_rect() else {
                continue;
            };
            let next = MapExtent {
                min_x: rect.min().x,
                min_y: rect.min().y,
                max_x: rect.max().x,
                max_y: rect.max().y,
            };
            extent = Some(match extent {
                None => next,
                Some(e) => e.union(&next),
            });
        }
        extent
    }
}

/// Axis-aligned bounds in map (pre-projected pixel) coordinates. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl MapExtent {
    pub fn union(&self, other: &MapExtent) -> MapExtent {
        MapExtent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// What to do when a county has no education record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    /// Abort the whole render with a `MissingJoinKey` error.
    Fail,
    /// Render the county with the fallback fill and a `missing` class.
    Mark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bare SVG document.
    Svg,
    /// HTML page embedding the SVG plus the hover tooltip.
    Html,
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Remote(String),
    Local(PathBuf),
}

impl DataSource {
    /// `http://` / `https://` sources are fetched; anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Remote(trimmed.to_string())
        } else {
            DataSource::Local(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Remote(url) => write!(f, "{url}"),
            DataSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved configuration for a render run (CLI flags > env > defaults).
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub education: DataSource,
    pub topology: DataSource,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub join_policy: JoinPolicy,
    /// Fill for unjoined counties under `JoinPolicy::Mark`.
    pub missing_fill: Rgb,
    pub export_colors: Option<PathBuf>,
    pub summary: bool,
}
