//! SVG document writer.
//!
//! Layer order is significant: `#layer-1` (county fills) is drawn first,
//! `#layer-2` (state outlines) on top of it, `#layer-3` (legend) last.
//!
//! Pure functions with no I/O; they return a `String`.

use std::fmt::Write;

use geo::MultiPolygon;
use tracing::warn;

use crate::domain::{CANVAS_HEIGHT, CANVAS_WIDTH, MapLayers};
use crate::render::legend::LegendLayout;
use crate::render::map::CountyPaint;

const STATE_STROKE_WIDTH: u32 = 2;

/// Escape the five XML special characters for text content and attribute values.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Format a coordinate with at most 2 decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// SVG path data for every ring: `M x,y L x,y ... Z`.
///
/// The closing point of each ring is implied by `Z`. Returns `None` when
/// there is nothing to draw.
pub fn path_data(geometry: &MultiPolygon<f64>) -> Option<String> {
    let mut d = String::new();
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords: Vec<_> = ring.coords().collect();
            if coords.len() > 1 && coords.first() == coords.last() {
                coords.pop();
            }
            if coords.len() < 3 {
                continue;
            }
            for (i, c) in coords.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{},{}", fmt_num(c.x), fmt_num(c.y));
            }
            d.push('Z');
        }
    }
    if d.is_empty() { None } else { Some(d) }
}

/// Full map document: counties, state outlines, legend.
///
/// `paints` must be parallel to `layers.counties`.
pub fn render_map_svg(layers: &MapLayers, paints: &[CountyPaint], legend: &LegendLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    write_map_svg(&mut out, layers, paints, legend);
    out
}

/// The `<svg>` element alone (no XML declaration), for embedding in HTML.
pub fn map_svg_element(layers: &MapLayers, paints: &[CountyPaint], legend: &LegendLayout) -> String {
    let mut out = String::new();
    write_map_svg(&mut out, layers, paints, legend);
    out
}

fn write_map_svg(out: &mut String, layers: &MapLayers, paints: &[CountyPaint], legend: &LegendLayout) {
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="map-svg" width="{CANVAS_WIDTH}" height="{CANVAS_HEIGHT}" viewBox="0 0 {CANVAS_WIDTH} {CANVAS_HEIGHT}">"#
    );

    let _ = writeln!(out, r#"  <g id="layer-1">"#);
    for (feature, paint) in layers.counties.iter().zip(paints) {
        let Some(d) = path_data(&feature.geometry) else {
            warn!(fips = ?paint.fips, "county has no ring with three distinct points; no path drawn");
            continue;
        };
        let class = if paint.is_missing() { "county missing" } else { "county" };
        let fips = paint.fips.map(|f| f.to_string()).unwrap_or_default();
        let education = paint.education.map(|v| v.to_string()).unwrap_or_default();
        let tooltip = xml_escape(&paint.tooltip);
        let _ = writeln!(
            out,
            r#"    <path d="{d}" class="{class}" fill="{}" data-fips="{fips}" data-education="{education}" data-tooltip="{tooltip}"><title>{tooltip}</title></path>"#,
            paint.fill
        );
    }
    let _ = writeln!(out, "  </g>");

    let _ = writeln!(out, r#"  <g id="layer-2">"#);
    for feature in &layers.states {
        if let Some(d) = path_data(&feature.geometry) {
            let _ = writeln!(
                out,
                r#"    <path d="{d}" class="state" stroke="white" fill="transparent" stroke-width="{STATE_STROKE_WIDTH}"/>"#
            );
        }
    }
    let _ = writeln!(out, "  </g>");

    let _ = writeln!(out, r#"  <g id="layer-3">"#);
    write_legend(out, legend, "    ", true);
    let _ = writeln!(out, "  </g>");

    let _ = writeln!(out, "</svg>");
}

/// Standalone legend document (no fetched data needed).
pub fn render_legend_svg(legend: &LegendLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    write_legend(&mut out, legend, "", false);
    out
}

fn write_legend(out: &mut String, legend: &LegendLayout, indent: &str, nested: bool) {
    let (ax, ay) = legend.axis_origin;
    if nested {
        let _ = writeln!(
            out,
            r#"{indent}<svg id="legend" x="{}" y="{}" width="{}" height="{}">"#,
            fmt_num(legend.x),
            fmt_num(legend.y),
            fmt_num(legend.width),
            fmt_num(legend.height),
        );
    } else {
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="legend" width="{}" height="{}">"#,
            fmt_num(legend.width),
            fmt_num(legend.height),
        );
    }

    let _ = writeln!(
        out,
        r#"{indent}  <g id="legend-axis" transform="translate({}, {})" fill="none" font-size="10" font-family="sans-serif" text-anchor="middle">"#,
        fmt_num(ax),
        fmt_num(ay),
    );
    let _ = writeln!(
        out,
        r#"{indent}    <path class="domain" stroke="currentColor" d="M0,6V0H{}V6"/>"#,
        fmt_num(legend.axis_length)
    );
    for tick in &legend.ticks {
        let _ = writeln!(
            out,
            r#"{indent}    <g class="tick" transform="translate({},0)"><line stroke="currentColor" y2="6"/><text fill="currentColor" y="9" dy="0.71em">{}</text></g>"#,
            fmt_num(tick.offset),
            xml_escape(&tick.label),
        );
    }
    let _ = writeln!(out, "{indent}  </g>");

    for swatch in &legend.swatches {
        let _ = writeln!(
            out,
            r#"{indent}  <rect width="{}" height="{}" x="{}" y="{}" fill="{}"/>"#,
            fmt_num(swatch.width),
            fmt_num(swatch.height),
            fmt_num(swatch.x),
            fmt_num(swatch.y),
            swatch.color,
        );
    }

    let _ = writeln!(out, "{indent}</svg>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoFeature;
    use crate::render::legend::legend_layout;
    use crate::scale::{GREENS_7, QuantizeScale};
    use geo::{LineString, Polygon};

    fn square(id: u32, x0: f64) -> GeoFeature {
        let ring = LineString::from(vec![(x0, 0.0), (x0 + 10.0, 0.0), (x0 + 10.0, 10.5), (x0, 10.5), (x0, 0.0)]);
        GeoFeature {
            id: Some(id),
            geometry: MultiPolygon::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    fn paint(fips: u32, value: Option<f64>, tooltip: &str) -> CountyPaint {
        CountyPaint {
            fips: Some(fips),
            fill: GREENS_7[2],
            bucket: value.map(|_| 2),
            education: value,
            tooltip: tooltip.to_string(),
        }
    }

    #[test]
    fn fmt_num_trims() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(25.373134), "25.37");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn path_data_closes_rings() {
        let f = square(1, 0.0);
        assert_eq!(path_data(&f.geometry).unwrap(), "M0,0L10,0L10,10.5L0,10.5Z");
        assert!(path_data(&MultiPolygon::new(vec![])).is_none());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(xml_escape(r#"A & B <"x">"#), "A &amp; B &lt;&quot;x&quot;&gt;");
    }

    #[test]
    fn map_document_layers_and_attributes() {
        let layers = MapLayers {
            counties: vec![square(1001, 0.0), square(1005, 10.0)],
            states: vec![square(1, 0.0)],
        };
        let paints = vec![
            paint(1001, Some(21.3), "Autauga County, AL: 21.3%"),
            paint(1005, None, "No data for FIPS 1005"),
        ];
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        let svg = render_map_svg(&layers, &paints, &legend);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="1000" height="800""#));

        let l1 = svg.find(r#"id="layer-1""#).unwrap();
        let l2 = svg.find(r#"id="layer-2""#).unwrap();
        let l3 = svg.find(r#"id="layer-3""#).unwrap();
        assert!(l1 < l2 && l2 < l3);

        assert!(svg.contains(r##"class="county" fill="#a1d99b" data-fips="1001" data-education="21.3""##));
        assert!(svg.contains(r##"class="county missing" fill="#a1d99b" data-fips="1005" data-education="""##));
        assert!(svg.contains("<title>Autauga County, AL: 21.3%</title>"));
        assert!(svg.contains(r#"class="state" stroke="white" fill="transparent" stroke-width="2""#));

        assert_eq!(svg.matches("<rect ").count(), 7);
        assert_eq!(svg.matches(r#"class="tick""#).count(), 8);
        assert!(svg.contains(">66%</text>"));
        assert!(svg.contains(r#"<svg id="legend" x="600" y="30" width="270" height="500">"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn degenerate_county_gets_no_path() {
        let sliver = GeoFeature {
            id: Some(1003),
            geometry: MultiPolygon::new(vec![Polygon::new(
                LineString::from(vec![(10.0, 0.0), (20.0, 0.0), (10.0, 0.0)]),
                vec![],
            )]),
        };
        let layers = MapLayers {
            counties: vec![square(1001, 0.0), sliver],
            states: vec![],
        };
        let paints = vec![
            paint(1001, Some(21.3), "Autauga County, AL: 21.3%"),
            paint(1003, Some(21.3), "Baldwin County, AL: 21.3%"),
        ];
        let svg = render_map_svg(&layers, &paints, &legend_layout(&QuantizeScale::legend_swatch()));

        assert_eq!(svg.matches("class=\"county").count(), 1);
        assert!(svg.contains(r#"data-fips="1001""#));
        assert!(!svg.contains(r#"data-fips="1003""#));
    }

    #[test]
    fn standalone_legend_document() {
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        let svg = render_legend_svg(&legend);
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg" id="legend""#));
        assert!(svg.contains(r#"id="legend-axis" transform="translate(50, 20)""#));
        for color in GREENS_7 {
            assert!(svg.contains(&format!(r#"fill="{color}""#)));
        }
    }
}
