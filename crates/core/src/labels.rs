//! Hover labels for the focused year and week.

use lifegrid_protocol::Point;

use crate::animation::FrameFocus;
use crate::config::LabelConfig;
use crate::field::CellField;
use crate::viewport::Camera;

/// Labels below this opacity are not drawn.
pub const VISIBLE_HEAT: f64 = 0.01;

/// Text width in screen pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed-advance estimate: every character is `em_ratio` of the font size.
#[derive(Debug, Clone, Copy)]
pub struct ApproxMeasure {
    pub em_ratio: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { em_ratio: 0.56 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.em_ratio
    }
}

/// A label that fades in over a subject and trails its screen position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverLabel {
    key: Option<String>,
    text: String,
    width: f64,
    heat: f64,
    position: Point,
    target: Point,
}

impl HoverLabel {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Measured text width, without padding.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn heat(&self) -> f64 {
        self.heat
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.heat >= VISIBLE_HEAT && !self.text.is_empty()
    }

    /// Point the label at a subject. The text is rebuilt and measured only
    /// when `key` differs from the current one.
    fn track(
        &mut self,
        key: String,
        target: Point,
        text: impl FnOnce() -> String,
        font_size: f64,
        measurer: &dyn TextMeasure,
    ) {
        if self.key.as_deref() != Some(key.as_str()) {
            self.text = text();
            self.width = measurer.measure(&self.text, font_size);
            self.key = Some(key);
        }
        if self.heat < VISIBLE_HEAT {
            self.position = target;
        }
        self.target = target;
    }

    fn ease(&mut self, active: bool, dt: f64, follow_rate: f64) {
        let keep = (-dt * follow_rate).exp();
        let goal = if active { 1.0 } else { 0.0 };
        self.heat = (goal + (self.heat - goal) * keep).clamp(0.0, 1.0);
        self.position = Point::new(
            self.target.x + (self.position.x - self.target.x) * keep,
            self.target.y + (self.position.y - self.target.y) * keep,
        );
    }
}

/// The year and week labels of one engine.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    pub year: HoverLabel,
    pub week: HoverLabel,
}

impl LabelSet {
    pub fn update(
        &mut self,
        focus: FrameFocus,
        field: &CellField,
        camera: &Camera,
        dt: f64,
        config: &LabelConfig,
        measurer: &dyn TextMeasure,
    ) {
        let year_target = focus
            .hovered_year
            .and_then(|year| year_anchor(field, year, camera, config).map(|p| (year, p)));
        if let Some((year, target)) = year_target {
            self.year.track(
                format!("year:{year}"),
                target,
                || format!("Age {year}"),
                config.font_size,
                measurer,
            );
        }
        self.year.ease(year_target.is_some(), dt, config.follow_rate);

        let week_target = focus.focused.and_then(|i| field.cell(i));
        if let Some(cell) = week_target {
            let anchor = camera
                .world_to_screen(cell.render.position)
                .offset(config.week_offset_x, config.week_offset_y);
            let date = cell.week_start;
            self.week.track(
                date.to_string(),
                anchor,
                || date.format("%b %-d, %Y").to_string(),
                config.font_size,
                measurer,
            );
        }
        self.week.ease(week_target.is_some(), dt, config.follow_rate);
    }
}

/// Screen point just left of the middle of a year row's left edge.
fn year_anchor(field: &CellField, year: usize, camera: &Camera, config: &LabelConfig) -> Option<Point> {
    let radius = field.diameter() / 2.0;
    let mut left = f64::INFINITY;
    let mut top = f64::INFINITY;
    let mut bottom = f64::NEG_INFINITY;
    for cell in field.year_cells(year) {
        let r = radius * cell.render.scale;
        let p = cell.render.position;
        left = left.min(p.x - r);
        top = top.min(p.y - r);
        bottom = bottom.max(p.y + r);
    }
    if !left.is_finite() {
        return None;
    }
    let edge = camera.world_to_screen(Point::new(left, (top + bottom) / 2.0));
    Some(edge.offset(-config.year_gap, 0.0))
}
