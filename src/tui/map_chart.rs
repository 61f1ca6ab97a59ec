//! Plotters-powered county map widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`. The chart has no margins or label areas, so the
//! plotting area is exactly the widget rect; `app` relies on that when mapping
//! mouse cells back to map coordinates.

use geo::{LineString, MultiPolygon};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TermColor, Style},
    widgets::Widget,
};

use crate::domain::{GeoFeature, MapExtent};
use crate::render::CountyPaint;

pub struct MapChart<'a> {
    pub counties: &'a [GeoFeature],
    /// Parallel to `counties`.
    pub paints: &'a [CountyPaint],
    pub states: &'a [GeoFeature],
    pub extent: MapExtent,
    /// County drawn with an outline on top of everything else.
    pub highlight: Option<usize>,
}

impl MapChart<'_> {
    /// Map coordinates have `y` growing downward; the chart's grows upward.
    fn flip(&self, x: f64, y: f64) -> (f64, f64) {
        (x, self.extent.max_y + self.extent.min_y - y)
    }

    fn ring_points(&self, ring: &LineString<f64>) -> Vec<(f64, f64)> {
        ring.coords().map(|c| self.flip(c.x, c.y)).collect()
    }

    fn rings<'g>(&self, geometry: &'g MultiPolygon<f64>) -> impl Iterator<Item = &'g LineString<f64>> {
        geometry.iter().map(|polygon| polygon.exterior())
    }
}

impl Widget for MapChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < 5 {
            buf.set_string(
                area.x,
                area.y,
                "Map area too small (resize terminal).",
                Style::default().fg(TermColor::Yellow),
            );
            return;
        }

        let MapExtent { min_x, min_y, max_x, max_y } = self.extent;
        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite())
            || max_x <= min_x
            || max_y <= min_y
        {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(0)
                .build_cartesian_2d(min_x..max_x, min_y..max_y)?;

            for (feature, paint) in self.counties.iter().zip(self.paints) {
                let fill = RGBColor(paint.fill.r, paint.fill.g, paint.fill.b);
                chart.draw_series(
                    self.rings(&feature.geometry)
                        .map(|ring| Polygon::new(self.ring_points(ring), fill.filled())),
                )?;
            }

            for feature in self.states {
                chart.draw_series(
                    self.rings(&feature.geometry)
                        .map(|ring| PathElement::new(self.ring_points(ring), &WHITE)),
                )?;
            }

            if let Some(feature) = self.highlight.and_then(|i| self.counties.get(i)) {
                chart.draw_series(
                    self.rings(&feature.geometry)
                        .map(|ring| PathElement::new(self.ring_points(ring), &BLACK)),
                )?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
