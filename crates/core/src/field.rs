use std::collections::HashMap;
use std::f64::consts::TAU;

use chrono::NaiveDate;
use lifegrid_protocol::{Color, Point, Rect};

use crate::color;
use crate::config::LayoutConfig;
use crate::model::{SpanBounds, WEEKS_PER_YEAR, WeekInterval};

/// Golden angle in radians; spreads consecutive phases around the circle.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Base color category of a week, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Event,
    Past,
    Current,
    Future,
}

impl CellKind {
    pub fn of(week: &WeekInterval) -> Self {
        if week.has_events() {
            CellKind::Event
        } else if week.is_past {
            CellKind::Past
        } else if week.is_current {
            CellKind::Current
        } else {
            CellKind::Future
        }
    }

    fn color(self, layout: &LayoutConfig) -> Color {
        match self {
            CellKind::Event => layout.event_color,
            CellKind::Past => layout.past_color,
            CellKind::Current => layout.current_color,
            CellKind::Future => layout.future_color,
        }
    }
}

/// Per-frame render attributes, written by the animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRender {
    pub position: Point,
    pub scale: f64,
    pub color: Color,
    pub alpha: f32,
    pub ring_color: Color,
    pub ring_alpha: f32,
}

/// One week's visual state.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub index: usize,
    pub year: usize,
    pub week_start: NaiveDate,
    pub kind: CellKind,
    pub base_position: Point,
    pub base_color: Color,
    pub phase: f64,
    pub hover_heat: f64,
    pub year_heat: f64,
    pub focus_heat: f64,
    pub render: CellRender,
}

/// Arena of cells indexed by week index, rebuilt wholesale per snapshot.
#[derive(Debug, Clone, Default)]
pub struct CellField {
    cells: Vec<Cell>,
    pitch: f64,
    diameter: f64,
}

impl CellField {
    pub fn build(weeks: &[WeekInterval], spans: &[SpanBounds], layout: &LayoutConfig) -> Self {
        let span_colors: HashMap<&str, Color> = spans
            .iter()
            .map(|b| (b.span.id.as_str(), b.span.color))
            .collect();
        let diameter = layout.cell_diameter;
        let pitch = diameter + layout.cell_gap.max(0.0);
        let radius = diameter / 2.0;

        let cells = weeks
            .iter()
            .map(|week| {
                let kind = CellKind::of(week);
                let mut base_color = kind.color(layout);
                let tint = color::mean(
                    week.span_ids
                        .iter()
                        .filter_map(|id| span_colors.get(id.as_str()).copied()),
                );
                if let Some(tint) = tint {
                    base_color = color::mix(base_color, tint, layout.span_mix);
                }
                let base_position = Point::new(
                    week.week_in_year() as f64 * pitch + radius,
                    week.year_index() as f64 * pitch + radius,
                );
                let phase = (week.index as f64 * GOLDEN_ANGLE + layout.phase_offset).rem_euclid(TAU);

                Cell {
                    index: week.index,
                    year: week.year_index(),
                    week_start: week.start,
                    kind,
                    base_position,
                    base_color,
                    phase,
                    hover_heat: 0.0,
                    year_heat: 0.0,
                    focus_heat: 0.0,
                    render: CellRender {
                        position: base_position,
                        scale: 1.0,
                        color: base_color,
                        alpha: layout.base_alpha,
                        ring_color: base_color,
                        ring_alpha: 0.0,
                    },
                }
            })
            .collect();

        Self {
            cells,
            pitch,
            diameter,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Cells of one year. Weeks of a year occupy consecutive indices.
    pub fn year_cells(&self, year: usize) -> &[Cell] {
        let start = (year * WEEKS_PER_YEAR).min(self.cells.len());
        let end = (start + WEEKS_PER_YEAR).min(self.cells.len());
        &self.cells[start..end]
    }

    /// World-space box around every cell's base footprint.
    pub fn bounds(&self) -> Option<Rect> {
        let radius = self.diameter / 2.0;
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for cell in &self.cells {
            min.x = min.x.min(cell.base_position.x - radius);
            min.y = min.y.min(cell.base_position.y - radius);
            max.x = max.x.max(cell.base_position.x + radius);
            max.y = max.y.max(cell.base_position.y + radius);
        }
        if self.cells.is_empty() {
            return None;
        }
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, LifeProfile, Span, TemporalSnapshot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn snapshot(profile: &LifeProfile, today: NaiveDate) -> TemporalSnapshot {
        TemporalSnapshot::build(profile, today).unwrap_or_default()
    }

    #[test]
    fn one_cell_per_week_on_a_regular_grid() {
        let snap = snapshot(&LifeProfile::new(date(2000, 1, 1), 2), date(2000, 1, 1));
        let layout = LayoutConfig::default();
        let field = CellField::build(&snap.weeks, &snap.spans, &layout);
        assert_eq!(field.len(), 104);
        let pitch = layout.cell_diameter + layout.cell_gap;
        let c = &field.cells()[53];
        assert_eq!(c.year, 1);
        assert!((c.base_position.x - (pitch + 5.0)).abs() < 1e-9);
        assert!((c.base_position.y - (pitch + 5.0)).abs() < 1e-9);
        let bounds = field.bounds().unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert!((bounds.w - (51.0 * pitch + 10.0)).abs() < 1e-9);
        assert!((bounds.h - (pitch + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn neighbours_never_overlap() {
        let snap = snapshot(&LifeProfile::new(date(2000, 1, 1), 1), date(2000, 1, 1));
        let field = CellField::build(&snap.weeks, &snap.spans, &LayoutConfig::default());
        for pair in field.cells().windows(2) {
            let d = pair[0].base_position.distance_squared(pair[1].base_position).sqrt();
            assert!(d >= field.diameter());
        }
    }

    #[test]
    fn base_color_priority() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        profile.events.push(Event {
            id: "e".into(),
            title: "E".into(),
            date: date(2000, 1, 2),
        });
        let snap = snapshot(&profile, date(2000, 1, 20));
        let layout = LayoutConfig::default();
        let field = CellField::build(&snap.weeks, &snap.spans, &layout);
        assert_eq!(field.cells()[0].kind, CellKind::Event);
        assert_eq!(field.cells()[1].kind, CellKind::Past);
        assert_eq!(field.cells()[2].kind, CellKind::Current);
        assert_eq!(field.cells()[3].kind, CellKind::Future);
        assert_eq!(field.cells()[3].base_color, layout.future_color);
    }

    #[test]
    fn spans_tint_toward_their_mean_color() {
        let mut profile = LifeProfile::new(date(2000, 1, 1), 1);
        for (id, color) in [("a", Color::rgb(255, 0, 0)), ("b", Color::rgb(0, 0, 255))] {
            profile.spans.push(Span {
                id: id.into(),
                title: id.into(),
                start: date(2000, 1, 1),
                end: Some(date(2000, 1, 10)),
                color,
            });
        }
        let layout = LayoutConfig {
            future_color: Color::rgb(0, 0, 0),
            ..LayoutConfig::default()
        };
        let snap = snapshot(&profile, date(1999, 1, 1));
        let field = CellField::build(&snap.weeks, &snap.spans, &layout);
        // mean (128, 0, 128), 70% of the way from black
        assert_eq!(field.cells()[0].base_color, Color::rgb(90, 0, 90));
        assert_eq!(field.cells()[5].base_color, Color::rgb(0, 0, 0));
    }

    #[test]
    fn phases_are_deterministic_and_spread() {
        let snap = snapshot(&LifeProfile::new(date(2000, 1, 1), 1), date(2000, 1, 1));
        let layout = LayoutConfig::default();
        let a = CellField::build(&snap.weeks, &snap.spans, &layout);
        let b = CellField::build(&snap.weeks, &snap.spans, &layout);
        for (x, y) in a.cells().iter().zip(b.cells()) {
            assert_eq!(x.phase, y.phase);
            assert!((0.0..TAU).contains(&x.phase));
        }
        let gap = (a.cells()[0].phase - a.cells()[1].phase).abs();
        assert!(gap > 0.5);
    }

    #[test]
    fn year_cells_slice_one_row() {
        let snap = snapshot(&LifeProfile::new(date(2000, 1, 1), 3), date(2000, 1, 1));
        let field = CellField::build(&snap.weeks, &snap.spans, &LayoutConfig::default());
        let row = field.year_cells(2);
        assert_eq!(row.len(), 52);
        assert!(row.iter().all(|c| c.year == 2));
        assert!(field.year_cells(3).is_empty());
    }

    #[test]
    fn empty_input_gives_empty_field() {
        let field = CellField::build(&[], &[], &LayoutConfig::default());
        assert!(field.is_empty());
        assert!(field.bounds().is_none());
    }
}
