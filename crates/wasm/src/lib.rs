use chrono::NaiveDate;
use lifegrid_core::model::{LifeProfile, TemporalSnapshot};
use lifegrid_core::{GridConfig, InputEvent, LifeGrid};
use lifegrid_protocol::RenderCommand;
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// `YYYY-MM-DD`, or the local date when absent.
fn parse_today(today: Option<&str>) -> Result<NaiveDate, JsError> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(js_err),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn commands_json(commands: &[RenderCommand]) -> Result<String, JsError> {
    serde_json::to_string(commands).map_err(js_err)
}

/// A grid owned by JavaScript. The host drives it with input callbacks
/// and one `on_frame` per animation frame.
#[wasm_bindgen]
pub struct LifeGridHandle {
    grid: LifeGrid,
    snapshot: TemporalSnapshot,
}

#[wasm_bindgen]
impl LifeGridHandle {
    /// Create an empty grid. `config_json` may override any subset of the
    /// default tunables.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<LifeGridHandle, JsError> {
        let config = match config_json {
            Some(json) => GridConfig::from_json(&json).map_err(js_err)?,
            None => GridConfig::default(),
        };
        Ok(Self {
            grid: LifeGrid::new(config),
            snapshot: TemporalSnapshot::default(),
        })
    }

    /// Load a profile (JSON) and rebuild the grid.
    pub fn render(&mut self, profile_json: &str, today: Option<String>) -> Result<(), JsError> {
        let profile = LifeProfile::from_json(profile_json).map_err(js_err)?;
        let snapshot = TemporalSnapshot::build(&profile, parse_today(today.as_deref())?).map_err(js_err)?;
        self.grid.render(&snapshot);
        self.snapshot = snapshot;
        Ok(())
    }

    pub fn render_demo(&mut self, today: Option<String>) -> Result<(), JsError> {
        let snapshot =
            TemporalSnapshot::build(&LifeProfile::demo(), parse_today(today.as_deref())?).map_err(js_err)?;
        self.grid.render(&snapshot);
        self.snapshot = snapshot;
        Ok(())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.grid.resize(width, height);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.grid.on_pointer_move(x, y);
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        self.grid.on_pointer_down(x, y);
    }

    pub fn on_pointer_up(&mut self) {
        self.grid.on_pointer_up();
    }

    pub fn on_pointer_leave(&mut self) {
        self.grid.on_pointer_leave();
    }

    pub fn on_wheel(&mut self, delta_y: f64, x: f64, y: f64) {
        self.grid.on_wheel(delta_y, x, y);
    }

    pub fn on_drag_move(&mut self, dx: f64, dy: f64) {
        self.grid.on_drag_move(dx, dy);
    }

    /// Queue an input event in its tagged JSON form, e.g.
    /// `{"type":"wheel","delta_y":-1,"x":10,"y":20}`.
    pub fn push_input_json(&mut self, event_json: &str) -> Result<(), JsError> {
        let event: InputEvent = serde_json::from_str(event_json).map_err(js_err)?;
        self.grid.push_input(event);
        Ok(())
    }

    pub fn recenter(&mut self) -> bool {
        self.grid.recenter()
    }

    /// Advance by `dt_ms` and return this frame's render commands as JSON.
    pub fn on_frame(&mut self, dt_ms: f64) -> Result<String, JsError> {
        self.grid.on_frame(dt_ms);
        commands_json(&self.grid.commands())
    }

    /// Render commands for the current state without advancing time.
    pub fn commands(&self) -> Result<String, JsError> {
        commands_json(&self.grid.commands())
    }

    /// Index of the focused week, if any.
    pub fn focused_week(&self) -> Option<usize> {
        self.grid.focus().focused
    }

    pub fn total_weeks(&self) -> usize {
        self.snapshot.total_weeks()
    }

    pub fn lived_fraction(&self) -> f64 {
        self.snapshot.lived_fraction()
    }

    pub fn zoom(&self) -> f64 {
        self.grid.camera().scale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Error paths construct a JsError, which needs a JS host; only the
    // success paths run natively.
    #[test]
    fn demo_frame_produces_commands() {
        let Ok(mut handle) = LifeGridHandle::new(None) else {
            return;
        };
        assert!(handle.render_demo(Some("2024-01-01".into())).is_ok());
        handle.resize(800.0, 600.0);
        handle.push_input_json(r#"{"type":"pointer_move","x":400,"y":300}"#).ok();
        let json = handle.on_frame(16.0).unwrap_or_default();
        let commands: Vec<RenderCommand> = serde_json::from_str(&json).unwrap_or_default();
        assert!(commands.len() > handle.total_weeks());
        assert!(handle.zoom() > 0.0);
    }
}
