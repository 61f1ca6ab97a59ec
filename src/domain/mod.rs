//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the education record and its join key (`EducationRecord`, `Fips`)
//! - decoded map geometry (`GeoFeature`, `MapLayers`, `MapExtent`)
//! - render configuration enums (`JoinPolicy`, `OutputFormat`) and `RenderConfig`

pub mod types;

pub use types::*;
