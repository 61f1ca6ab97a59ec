//! Map and legend rendering.
//!
//! `map` and `legend` compute what to draw; `svg` and `html` serialize it.
//! The terminal preview in `tui` reuses the same paints and legend.

pub mod html;
pub mod legend;
pub mod map;
pub mod svg;

pub use legend::{LegendLayout, Swatch, Tick, legend_layout};
pub use map::{CountyPaint, bucket_counts, fips_colors, paint_counties};

use crate::domain::{MapLayers, OutputFormat};
use crate::tooltip::TooltipConfig;

/// Serialize a painted map in the requested format.
pub fn render_document(
    format: OutputFormat,
    layers: &MapLayers,
    paints: &[CountyPaint],
    legend: &LegendLayout,
) -> String {
    match format {
        OutputFormat::Svg => svg::render_map_svg(layers, paints, legend),
        OutputFormat::Html => html::render_page(
            &svg::map_svg_element(layers, paints, legend),
            TooltipConfig::WEB,
        ),
    }
}
