//! County fill computation: join each county feature to its record and color it.

use std::collections::BTreeMap;

use tracing::warn;

use crate::data::education::FipsIndex;
use crate::domain::{Fips, GeoFeature, JoinPolicy};
use crate::error::{AppError, ErrorKind};
use crate::scale::{QuantizeScale, Rgb};
use crate::tooltip::tooltip_text;

/// Display attributes of one county path, computed once at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyPaint {
    pub fips: Option<Fips>,
    pub fill: Rgb,
    /// Scale bucket; `None` for counties rendered with the fallback fill.
    pub bucket: Option<usize>,
    pub education: Option<f64>,
    pub tooltip: String,
}

impl CountyPaint {
    pub fn is_missing(&self) -> bool {
        self.education.is_none()
    }
}

/// Color every county. Output is parallel to `counties`.
///
/// Under `JoinPolicy::Fail` the first county without a record aborts the render.
/// Under `JoinPolicy::Mark` it gets `missing_fill` and is logged.
pub fn paint_counties(
    counties: &[GeoFeature],
    index: &FipsIndex,
    scale: &QuantizeScale,
    policy: JoinPolicy,
    missing_fill: Rgb,
) -> Result<Vec<CountyPaint>, AppError> {
    let mut out = Vec::with_capacity(counties.len());
    for (i, feature) in counties.iter().enumerate() {
        let record = match feature.id {
            Some(fips) => index.lookup(fips),
            None => Err(AppError::new(
                ErrorKind::MissingJoinKey,
                format!("County feature #{i} has no id to join on."),
            )),
        };

        let paint = match (record, policy) {
            (Ok(record), _) => {
                let value = record.bachelors_or_higher;
                CountyPaint {
                    fips: feature.id,
                    fill: scale.color(value),
                    bucket: Some(scale.bucket(value)),
                    education: Some(value),
                    tooltip: tooltip_text(record),
                }
            }
            (Err(err), JoinPolicy::Fail) => return Err(err),
            (Err(err), JoinPolicy::Mark) => {
                warn!("{err} Rendering with fallback fill {missing_fill}.");
                CountyPaint {
                    fips: feature.id,
                    fill: missing_fill,
                    bucket: None,
                    education: None,
                    tooltip: match feature.id {
                        Some(fips) => format!("No data for FIPS {fips}"),
                        None => "No data".to_string(),
                    },
                }
            }
        };
        out.push(paint);
    }
    Ok(out)
}

/// fips → fill for every county that has an id.
pub fn fips_colors(paints: &[CountyPaint]) -> BTreeMap<Fips, Rgb> {
    paints
        .iter()
        .filter_map(|p| p.fips.map(|fips| (fips, p.fill)))
        .collect()
}

/// Number of painted counties per scale bucket (fallback-filled counties excluded).
pub fn bucket_counts(paints: &[CountyPaint], buckets: usize) -> Vec<usize> {
    let mut counts = vec![0; buckets];
    for bucket in paints.iter().filter_map(|p| p.bucket) {
        if let Some(slot) = counts.get_mut(bucket) {
            *slot += 1;
        }
    }
    counts
}
