//! Legend layout: seven swatches plus a percentage axis, from fixed constants.
//!
//! Positions are relative to the legend's own viewport, which sits at
//! `(LEGEND_X, LEGEND_Y)` on the map canvas.

use crate::scale::{MAP_DOMAIN, QuantizeScale, Rgb};

pub const LEGEND_X: f64 = 600.0;
pub const LEGEND_Y: f64 = 30.0;
pub const LEGEND_WIDTH: f64 = 170.0;
pub const LEGEND_HEIGHT: f64 = 500.0;
pub const LEGEND_PADDING: f64 = 50.0;
/// Vertical offset of the axis inside the legend viewport.
pub const AXIS_Y: f64 = 20.0;
pub const SWATCH_HEIGHT: f64 = 10.0;

pub const TICK_VALUES: [f64; 8] = [3.0, 12.0, 21.0, 30.0, 39.0, 48.0, 57.0, 66.0];

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Distance from the axis origin.
    pub offset: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub axis_origin: (f64, f64),
    pub axis_length: f64,
    pub ticks: Vec<Tick>,
    pub swatches: Vec<Swatch>,
}

/// Linear map from the percentage domain onto the axis length.
#[derive(Debug, Clone, Copy)]
struct AxisScale {
    domain: (f64, f64),
    length: f64,
}

impl AxisScale {
    fn offset(&self, value: f64) -> f64 {
        let (lo, hi) = self.domain;
        (value - lo) / (hi - lo) * self.length
    }
}

pub fn tick_label(value: f64) -> String {
    format!("{value}%")
}

/// Build the legend from the swatch scale (index `i` → color).
pub fn legend_layout(swatch_scale: &QuantizeScale) -> LegendLayout {
    let axis = AxisScale {
        domain: MAP_DOMAIN,
        length: LEGEND_WIDTH,
    };

    let ticks = TICK_VALUES
        .iter()
        .map(|&value| Tick {
            value,
            offset: axis.offset(value),
            label: tick_label(value),
        })
        .collect();

    let count = swatch_scale.bucket_count();
    let step = LEGEND_WIDTH / count as f64;
    let swatches = (0..count)
        .map(|i| Swatch {
            index: i,
            x: (i % count) as f64 * step + LEGEND_PADDING,
            y: (i / 10) as f64 * 19.0 + 10.0,
            width: LEGEND_WIDTH / 6.7,
            height: SWATCH_HEIGHT,
            color: swatch_scale.color(i as f64),
        })
        .collect();

    LegendLayout {
        x: LEGEND_X,
        y: LEGEND_Y,
        width: LEGEND_WIDTH + 2.0 * LEGEND_PADDING,
        height: LEGEND_HEIGHT,
        axis_origin: (LEGEND_PADDING, AXIS_Y),
        axis_length: LEGEND_WIDTH,
        ticks,
        swatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::GREENS_7;

    #[test]
    fn seven_swatches_in_palette_order() {
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        assert_eq!(legend.swatches.len(), 7);
        for (i, swatch) in legend.swatches.iter().enumerate() {
            assert_eq!(swatch.index, i);
            assert_eq!(swatch.color, GREENS_7[i]);
            assert_eq!(swatch.y, 10.0);
            assert_eq!(swatch.height, 10.0);
        }
        for i in 0..7 {
            for j in (i + 1)..7 {
                assert_ne!(legend.swatches[i].color, legend.swatches[j].color);
            }
        }
    }

    #[test]
    fn ticks_are_percent_labels_across_axis() {
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        let labels: Vec<&str> = legend.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["3%", "12%", "21%", "30%", "39%", "48%", "57%", "66%"]);
        assert_eq!(legend.ticks[0].offset, 0.0);
        assert!((legend.ticks[7].offset - 170.0).abs() < 1e-9);
        assert_eq!(legend.axis_origin, (50.0, 20.0));
        assert_eq!(legend.width, 270.0);
    }

    #[test]
    fn swatch_i_matches_map_bucket_i() {
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        let map = QuantizeScale::map_fill();
        for (i, swatch) in legend.swatches.iter().enumerate() {
            // Swatch starts where its bucket starts on the axis...
            let start = swatch.x - LEGEND_PADDING;
            assert!((start - legend.ticks[i].offset).abs() < 1e-9, "swatch {i}");
            // ...and shows the color the map uses for that bucket.
            let (lo, _) = map.bucket_extent(i).unwrap();
            assert_eq!(map.color(lo), swatch.color, "bucket {i}");
        }
    }
}
