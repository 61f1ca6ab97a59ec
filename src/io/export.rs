//! Write the rendered document and the per-county color table.
//!
//! The CSV is meant to be easy to consume in spreadsheets or diffed between runs.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::data::education::FipsIndex;
use crate::domain::Fips;
use crate::error::{AppError, ErrorKind};
use crate::render::map::CountyPaint;

const COLOR_HEADER: [&str; 6] = ["fips", "area_name", "state", "bachelors_or_higher", "bucket", "color"];

/// Write a rendered SVG/HTML document.
pub fn write_document(path: &Path, contents: &str) -> Result<(), AppError> {
    std::fs::write(path, contents)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write '{}': {e}", path.display())))?;
    info!(path = %path.display(), bytes = contents.len(), "wrote document");
    Ok(())
}

/// One line of the color export. `None` becomes an empty field.
#[derive(Debug, Serialize)]
struct ColorRow<'a> {
    fips: Option<Fips>,
    area_name: Option<&'a str>,
    state: Option<&'a str>,
    bachelors_or_higher: Option<f64>,
    bucket: Option<usize>,
    color: String,
}

/// Write one row per county, in drawing order.
///
/// Counties rendered with the fallback fill have empty record and bucket columns.
pub fn write_colors_csv(path: &Path, paints: &[CountyPaint], index: &FipsIndex) -> Result<(), AppError> {
    let io_err = |e: csv::Error| {
        AppError::new(ErrorKind::Io, format!("Failed to write color export '{}': {e}", path.display()))
    };

    // Header written by hand so an empty map still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(io_err)?;
    writer.write_record(COLOR_HEADER).map_err(io_err)?;

    for p in paints {
        let record = p.fips.and_then(|fips| index.get(fips));
        writer
            .serialize(ColorRow {
                fips: p.fips,
                area_name: record.map(|r| r.area_name.as_str()),
                state: record.map(|r| r.state.as_str()),
                bachelors_or_higher: p.education,
                bucket: p.bucket,
                color: p.fill.to_string(),
            })
            .map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to flush color export: {e}")))?;

    info!(path = %path.display(), rows = paints.len(), "wrote color export");
    Ok(())
}
