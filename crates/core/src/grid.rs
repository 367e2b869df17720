//! The engine: an owned context tying the camera, cells, spans and labels
//! together behind a frame-driven API.

use std::collections::VecDeque;
use std::fmt;

use lifegrid_protocol::{Paint, Point, RenderCommand, ThemeToken};

use crate::animation::{self, FrameFocus, FrameTime};
use crate::config::GridConfig;
use crate::field::CellField;
use crate::input::InputEvent;
use crate::labels::{ApproxMeasure, LabelSet, TextMeasure};
use crate::lanes::{self, SpanLayout};
use crate::model::TemporalSnapshot;
use crate::viewport::Camera;
use crate::views;

pub struct LifeGrid {
    config: GridConfig,
    camera: Camera,
    field: CellField,
    spans: SpanLayout,
    labels: LabelSet,
    focus: FrameFocus,
    /// Last known pointer position in screen space.
    pointer: Option<Point>,
    queue: VecDeque<InputEvent>,
    elapsed: f64,
    centered: bool,
    center_pending: bool,
    measurer: Box<dyn TextMeasure>,
}

impl fmt::Debug for LifeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifeGrid")
            .field("cells", &self.field.len())
            .field("lanes", &self.spans.lane_count)
            .field("camera", &self.camera)
            .field("focus", &self.focus)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Default for LifeGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl LifeGrid {
    pub fn new(config: GridConfig) -> Self {
        Self::with_measurer(config, ApproxMeasure::default())
    }

    /// Use a renderer-provided text measurer for labels and pills.
    pub fn with_measurer(config: GridConfig, measurer: impl TextMeasure + 'static) -> Self {
        Self {
            camera: Camera::new(config.viewport.clone()),
            config,
            field: CellField::default(),
            spans: SpanLayout::default(),
            labels: LabelSet::default(),
            focus: FrameFocus::default(),
            pointer: None,
            queue: VecDeque::new(),
            elapsed: 0.0,
            centered: false,
            center_pending: false,
            measurer: Box::new(measurer),
        }
    }

    /// Replace the cells and span layout with ones built from `snapshot`.
    ///
    /// The camera is kept; it is centered on the grid only for the first
    /// non-empty snapshot.
    pub fn render(&mut self, snapshot: &TemporalSnapshot) {
        let field = CellField::build(&snapshot.weeks, &snapshot.spans, &self.config.layout);
        let spans = lanes::layout_spans(
            &snapshot.spans,
            &field,
            &self.config.lanes,
            self.measurer.as_ref(),
        );
        tracing::debug!(
            cells = field.len(),
            spans = spans.placements.len(),
            lanes = spans.lane_count,
            "rebuilt grid"
        );

        self.field = field;
        self.spans = spans;
        self.labels = LabelSet::default();
        self.focus = FrameFocus::default();

        if !self.centered && !self.field.is_empty() {
            self.center_pending = true;
            self.try_center();
        }
    }

    /// Fit the grid into the viewport again. Returns `false` when there is
    /// nothing to fit or the viewport has no size yet.
    pub fn recenter(&mut self) -> bool {
        let Some(bounds) = self.field.bounds() else {
            return false;
        };
        self.camera.center_on(bounds, self.config.layout.fit_margin)
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.push_input(InputEvent::PointerMove { x, y });
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.push_input(InputEvent::PointerDown { x, y });
    }

    pub fn on_pointer_up(&mut self) {
        self.push_input(InputEvent::PointerUp);
    }

    pub fn on_pointer_leave(&mut self) {
        self.push_input(InputEvent::PointerLeave);
    }

    pub fn on_wheel(&mut self, delta_y: f64, x: f64, y: f64) {
        self.push_input(InputEvent::Wheel { delta_y, x, y });
    }

    pub fn on_drag_move(&mut self, dx: f64, dy: f64) {
        self.push_input(InputEvent::DragMove { dx, dy });
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.push_input(InputEvent::Resize { width, height });
    }

    /// Advance one frame by `dt_ms`: apply queued input, ease the camera,
    /// animate the cells and move the labels.
    pub fn on_frame(&mut self, dt_ms: f64) {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
        }

        self.camera.advance(dt);
        self.elapsed += dt;

        let pointer = self.pointer.map(|p| self.camera.screen_to_world(p));
        let time = FrameTime {
            dt,
            elapsed: self.elapsed,
        };
        self.focus = animation::step(self.field.cells_mut(), time, pointer, &self.config);
        self.labels.update(
            self.focus,
            &self.field,
            &self.camera,
            dt,
            &self.config.labels,
            self.measurer.as_ref(),
        );
    }

    /// Render commands for the current frame.
    pub fn commands(&self) -> Vec<RenderCommand> {
        let viewport = self.camera.viewport();
        let scale = self.camera.scale();
        let mut commands = vec![RenderCommand::DrawRect {
            rect: viewport.rect(),
            fill: Paint::Theme(ThemeToken::Background),
            border: None,
            corner_radius: 0.0,
            label: None,
        }];
        if self.field.is_empty() {
            return commands;
        }

        commands.push(RenderCommand::BeginGroup {
            id: "world".into(),
            label: None,
        });
        commands.push(RenderCommand::PushTransform {
            translate: self.camera.translation(),
            scale: Point::new(scale, scale),
        });
        commands.extend(views::render_spans(&self.spans, &self.config.lanes));
        commands.extend(views::render_cells(&self.field, &self.camera, &self.config));
        commands.push(RenderCommand::PopTransform);
        commands.push(RenderCommand::EndGroup);

        commands.extend(views::render_labels(&self.labels, &self.config.labels));
        commands
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn field(&self) -> &CellField {
        &self.field
    }

    pub fn span_layout(&self) -> &SpanLayout {
        &self.spans
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn focus(&self) -> FrameFocus {
        self.focus
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of events waiting for the next frame.
    pub fn pending_input(&self) -> usize {
        self.queue.len()
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Wheel { delta_y, x, y } => self.camera.zoom_at(delta_y, Point::new(x, y)),
            InputEvent::PointerDown { x, y } => {
                let p = Point::new(x, y);
                self.pointer = Some(p);
                self.camera.begin_drag(p);
            }
            InputEvent::PointerMove { x, y } => {
                let p = Point::new(x, y);
                self.pointer = Some(p);
                self.camera.drag_to(p);
            }
            InputEvent::PointerUp => self.camera.end_drag(),
            InputEvent::PointerLeave => {
                self.pointer = None;
                self.camera.end_drag();
            }
            InputEvent::DragMove { dx, dy } => self.camera.pan_by(dx, dy),
            InputEvent::Resize { width, height } => {
                self.camera.resize(width, height);
                self.try_center();
            }
        }
    }

    fn try_center(&mut self) {
        if !self.center_pending {
            return;
        }
        if self.recenter() {
            self.centered = true;
            self.center_pending = false;
        } else {
            tracing::debug!("deferring initial centering until the viewport has a size");
        }
    }
}
