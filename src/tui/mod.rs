//! Ratatui-based terminal preview.
//!
//! Draws the painted counties and state outlines with Plotters, a legend strip
//! under the map, and a tooltip that follows the mouse. Hovering goes through
//! the same `TooltipController` the HTML page mirrors.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{Scene, load_preview_scene};
use crate::data::Sources;
use crate::domain::{JoinPolicy, MapExtent, MapLayers};
use crate::error::{AppError, ErrorKind};
use crate::render::LegendLayout;
use crate::scale::Rgb;
use crate::spatial::CountyLocator;
use crate::tooltip::{PointerEvent, TooltipConfig, TooltipController, Visibility};

mod map_chart;

use map_chart::MapChart;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;
/// Legend columns per swatch.
const SWATCH_CELLS: usize = 6;

/// Fetch the datasets, then start the preview.
pub fn run(sources: Sources, policy: JoinPolicy) -> Result<(), AppError> {
    // Fetch before touching the terminal so failures print normally.
    let scene = load_preview_scene(&sources, policy)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).map_err(|e| terminal_error("Failed to initialize terminal", e))?;

    let mut app = App::new(scene, &sources);
    app.event_loop(&mut terminal)
}

fn terminal_error(context: &str, err: impl std::fmt::Display) -> AppError {
    AppError::new(ErrorKind::Terminal, format!("{context}: {err}"))
}

/// Restores the terminal (raw mode, alternate screen, mouse capture) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| terminal_error("Failed to enable raw mode", e))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(terminal_error("Failed to enter alternate screen", e));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

struct App {
    scene: Scene,
    locator: CountyLocator,
    extent: Option<MapExtent>,
    tooltip: TooltipController,
    started: Instant,
    /// Where the map was last drawn; mouse cells are resolved against it.
    map_rect: Option<Rect>,
    hovered: Option<usize>,
    sources: String,
    status: String,
}

impl App {
    fn new(scene: Scene, sources: &Sources) -> Self {
        let locator = CountyLocator::new(&scene.layers.counties);
        let extent = scene.layers.extent();
        let status = format!(
            "{} counties, {} without data",
            scene.layers.counties.len(),
            scene.missing_count()
        );
        Self {
            scene,
            locator,
            extent,
            tooltip: TooltipController::new(TooltipConfig::TERMINAL),
            started: Instant::now(),
            map_rect: None,
            hovered: None,
            sources: format!("{} + {}", sources.education, sources.topology),
            status,
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            // Keep redrawing while the tooltip fades.
            let fading = !self.tooltip.is_settled(self.now());
            if needs_redraw || fading {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| terminal_error("Terminal draw error", e))?;
                needs_redraw = false;
            }

            let timeout = if fading { Duration::from_millis(10) } else { Duration::from_millis(100) };
            if !event::poll(timeout).map_err(|e| terminal_error("Event poll error", e))? {
                continue;
            }

            match event::read().map_err(|e| terminal_error("Event read error", e))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                }
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Moved,
                    column,
                    row,
                    ..
                }) => {
                    self.hover(column, row)?;
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Translate a mouse cell into a tooltip event.
    fn hover(&mut self, column: u16, row: u16) -> Result<(), AppError> {
        let now = self.now();
        let hit = match (self.map_rect, self.extent) {
            (Some(rect), Some(extent)) => cell_to_map(rect, extent, column, row)
                .and_then(|(x, y)| self.locator.locate_index(&self.scene.layers.counties, x, y)),
            _ => None,
        };
        self.hovered = hit;

        let joined = hit
            .and_then(|i| self.scene.paints.get(i))
            .filter(|paint| !paint.is_missing())
            .and_then(|paint| paint.fips);

        match joined {
            Some(fips) => {
                let event = PointerEvent::Over {
                    fips,
                    x: f64::from(column),
                    y: f64::from(row),
                };
                self.tooltip.handle(event, &self.scene.index, now)?;
                self.status = self.tooltip.content().to_string();
            }
            None => {
                if self.tooltip.visibility() == Visibility::Visible {
                    self.tooltip.handle(PointerEvent::Leave, &self.scene.index, now)?;
                }
                if let Some(paint) = hit.and_then(|i| self.scene.paints.get(i)) {
                    self.status = paint.tooltip.clone();
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(4),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_map(frame, chunks[1]);
        draw_legend(frame, chunks[2], &self.scene.legend);
        self.draw_footer(frame, chunks[3]);
        self.draw_tooltip(frame, size);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("choro", Style::default().fg(Color::Cyan)),
                Span::raw(" | United States Educational Attainment | "),
                Span::styled(
                    "adults 25+ with a bachelor's degree or higher (2010-2014)",
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "records: {} | counties: {} | states: {} | {}",
                    self.scene.index.len(),
                    self.scene.layers.counties.len(),
                    self.scene.layers.states.len(),
                    self.sources,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_map(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Counties").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(extent) = self.extent else {
            self.map_rect = None;
            let msg = Paragraph::new("No geometry to draw.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let rect = fit_map_rect(inner, extent);
        self.map_rect = Some(rect);
        let MapLayers { counties, states } = &self.scene.layers;
        let widget = MapChart {
            counties,
            paints: &self.scene.paints,
            states,
            extent,
            highlight: self.hovered,
        };
        frame.render_widget(widget, rect);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled("mouse hover county  q/Esc quit", Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tooltip(&self, frame: &mut ratatui::Frame<'_>, screen: Rect) {
        let opacity = self.tooltip.opacity(self.now());
        if opacity <= 0.0 {
            return;
        }
        let (x, y) = self.tooltip.anchor();
        let Some(rect) = tooltip_rect(screen, x, y, self.tooltip.content()) else {
            return;
        };

        let mut style = Style::default().fg(Color::Black).bg(Color::LightYellow);
        if opacity < 1.0 {
            style = style.add_modifier(Modifier::DIM);
        }
        let p = Paragraph::new(self.tooltip.content())
            .style(style)
            .block(Block::default().borders(Borders::ALL).style(style));
        frame.render_widget(Clear, rect);
        frame.render_widget(p, rect);
    }
}

fn draw_legend(frame: &mut ratatui::Frame<'_>, area: Rect, legend: &LegendLayout) {
    let p = Paragraph::new(Text::from(legend_lines(legend)))
        .block(Block::default().title("Legend").borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn term_color(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Swatch row plus tick labels aligned under each swatch boundary.
fn legend_lines(legend: &LegendLayout) -> Vec<Line<'static>> {
    let swatches: Vec<Span<'static>> = legend
        .swatches
        .iter()
        .map(|s| Span::styled(" ".repeat(SWATCH_CELLS), Style::default().bg(term_color(s.color))))
        .collect();

    let mut labels = String::new();
    for (i, tick) in legend.ticks.iter().enumerate() {
        let column = i * SWATCH_CELLS;
        while labels.chars().count() < column {
            labels.push(' ');
        }
        labels.push_str(&tick.label);
    }

    vec![Line::from(swatches), Line::from(labels)]
}

/// Largest rect inside `area` with the map's aspect ratio, centered.
fn fit_map_rect(area: Rect, extent: MapExtent) -> Rect {
    if area.width == 0 || area.height == 0 || extent.width() <= 0.0 || extent.height() <= 0.0 {
        return area;
    }
    let map_aspect = extent.width() / extent.height();
    let area_aspect = f64::from(area.width) / (f64::from(area.height) * CELL_ASPECT);

    let (width, height) = if area_aspect > map_aspect {
        let w = (f64::from(area.height) * CELL_ASPECT * map_aspect).round() as u16;
        (w.clamp(1, area.width), area.height)
    } else {
        let h = (f64::from(area.width) / map_aspect / CELL_ASPECT).round() as u16;
        (area.width, h.clamp(1, area.height))
    };

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Map coordinates under the center of a terminal cell, if the cell is on the map.
fn cell_to_map(rect: Rect, extent: MapExtent, column: u16, row: u16) -> Option<(f64, f64)> {
    let inside = column >= rect.x
        && column < rect.x + rect.width
        && row >= rect.y
        && row < rect.y + rect.height;
    if !inside {
        return None;
    }
    let fx = (f64::from(column - rect.x) + 0.5) / f64::from(rect.width);
    let fy = (f64::from(row - rect.y) + 0.5) / f64::from(rect.height);
    Some((
        extent.min_x + fx * extent.width(),
        extent.min_y + fy * extent.height(),
    ))
}

/// Tooltip box at the anchor, pushed back inside the screen.
fn tooltip_rect(screen: Rect, x: f64, y: f64, content: &str) -> Option<Rect> {
    if content.is_empty() || screen.width < 4 || screen.height < 3 {
        return None;
    }
    let width = (content.chars().count() as u16 + 2).min(screen.width);
    let height = 3;
    let max_x = screen.x + screen.width - width;
    let max_y = screen.y + screen.height - height;
    let left = (x.max(0.0) as u16).clamp(screen.x, max_x);
    let top = (y.max(0.0) as u16).clamp(screen.y, max_y);
    Some(Rect {
        x: left,
        y: top,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_json;
    use crate::domain::{DataSource, EducationRecord};
    use crate::render::legend_layout;
    use crate::scale::{MISSING_FILL, QuantizeScale};

    /// Counties 1001, 1003, 1005 as 10x10 squares left to right; 1005 has no record.
    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [
            [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
            [[10, 0], [20, 0], [20, 10], [10, 10], [10, 0]],
            [[20, 0], [30, 0], [30, 10], [20, 10], [20, 0]],
            [[0, 0], [30, 0], [30, 10], [0, 10], [0, 0]]
        ],
        "objects": {
            "counties": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": 1001, "arcs": [[0]]},
                {"type": "Polygon", "id": 1003, "arcs": [[1]]},
                {"type": "Polygon", "id": 1005, "arcs": [[2]]}
            ]},
            "states": {"type": "Polygon", "id": "01", "arcs": [[3]]}
        }
    }"#;

    fn record(fips: u32, name: &str, value: f64) -> EducationRecord {
        EducationRecord {
            fips,
            area_name: name.to_string(),
            state: "AL".to_string(),
            bachelors_or_higher: value,
        }
    }

    /// One cell per map unit: cell (c, r) resolves to map point (c + 0.5, r + 0.5).
    fn preview_app() -> App {
        let records = vec![record(1001, "Autauga County", 20.0), record(1003, "Baldwin County", 40.0)];
        let topology = parse_json(TOPOLOGY, "topology").unwrap();
        let scene = Scene::build(records, &topology, JoinPolicy::Mark, MISSING_FILL).unwrap();
        let sources = Sources {
            education: DataSource::parse("edu.json"),
            topology: DataSource::parse("counties.json"),
        };
        let mut app = App::new(scene, &sources);
        app.map_rect = Some(Rect::new(0, 0, 30, 10));
        app
    }

    fn extent(w: f64, h: f64) -> MapExtent {
        MapExtent {
            min_x: 0.0,
            min_y: 0.0,
            max_x: w,
            max_y: h,
        }
    }

    #[test]
    fn map_rect_keeps_aspect_ratio() {
        let area = Rect::new(0, 0, 100, 20);
        // 2:1 map in a 100x20 cell area: 20 rows are 40 "columns" tall, so width 80.
        let rect = fit_map_rect(area, extent(200.0, 100.0));
        assert_eq!(rect, Rect::new(10, 0, 80, 20));

        let narrow = fit_map_rect(Rect::new(0, 0, 40, 40), extent(200.0, 100.0));
        assert_eq!(narrow.width, 40);
        assert_eq!(narrow.height, 10);
        assert_eq!(narrow.y, 15);
    }

    #[test]
    fn cell_centers_map_into_extent() {
        let rect = Rect::new(10, 5, 10, 10);
        let ext = extent(100.0, 100.0);
        assert_eq!(cell_to_map(rect, ext, 10, 5), Some((5.0, 5.0)));
        assert_eq!(cell_to_map(rect, ext, 19, 14), Some((95.0, 95.0)));
        assert_eq!(cell_to_map(rect, ext, 9, 5), None);
        assert_eq!(cell_to_map(rect, ext, 20, 5), None);
    }

    #[test]
    fn tooltip_stays_on_screen() {
        let screen = Rect::new(0, 0, 40, 10);
        let rect = tooltip_rect(screen, 35.0, 9.0, "Autauga County, AL: 21.3%").unwrap();
        assert_eq!(rect.width, 27);
        assert_eq!(rect.x, 13);
        assert_eq!(rect.y, 7);
        assert!(tooltip_rect(screen, 0.0, 0.0, "").is_none());
    }

    #[test]
    fn legend_strip_has_seven_swatches_and_all_ticks() {
        let legend = legend_layout(&QuantizeScale::legend_swatch());
        let lines = legend_lines(&legend);
        assert_eq!(lines[0].spans.len(), 7);
        assert_eq!(lines[0].spans[0].style.bg, Some(Color::Rgb(0xed, 0xf8, 0xe9)));

        let labels: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(labels.starts_with("3%    12%   21%"));
        assert!(labels.ends_with("66%"));
    }

    #[test]
    fn hovering_a_joined_county_shows_its_record() {
        let mut app = preview_app();
        assert_eq!(app.status, "3 counties, 1 without data");

        app.hover(5, 5).unwrap();
        assert_eq!(app.hovered, Some(0));
        assert_eq!(app.tooltip.visibility(), Visibility::Visible);
        assert_eq!(app.tooltip.content(), "Autauga County, AL: 20%");
        assert_eq!(app.tooltip.fips(), Some(1001));
        assert_eq!(app.status, "Autauga County, AL: 20%");

        app.hover(15, 2).unwrap();
        assert_eq!(app.hovered, Some(1));
        assert_eq!(app.tooltip.content(), "Baldwin County, AL: 40%");
    }

    #[test]
    fn hovering_a_marked_county_hides_the_tooltip() {
        let mut app = preview_app();
        app.hover(5, 5).unwrap();

        app.hover(25, 5).unwrap();
        assert_eq!(app.hovered, Some(2));
        assert_eq!(app.tooltip.visibility(), Visibility::Hidden);
        assert_eq!(app.status, "No data for FIPS 1005");
    }

    #[test]
    fn leaving_the_map_hides_the_tooltip() {
        let mut app = preview_app();
        app.hover(15, 5).unwrap();
        assert_eq!(app.tooltip.visibility(), Visibility::Visible);

        app.hover(50, 50).unwrap();
        assert_eq!(app.hovered, None);
        assert_eq!(app.tooltip.visibility(), Visibility::Hidden);
        // Status keeps the last county.
        assert_eq!(app.status, "Baldwin County, AL: 40%");

        // Nothing drawn yet: no hit at all.
        app.map_rect = None;
        app.hover(5, 5).unwrap();
        assert_eq!(app.hovered, None);
        assert_eq!(app.tooltip.visibility(), Visibility::Hidden);
    }
}
