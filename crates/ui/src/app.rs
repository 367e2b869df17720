use chrono::{Local, NaiveDate};
use eframe::egui;
use lifegrid_core::model::{LifeProfile, TemporalSnapshot};
use lifegrid_core::{GridConfig, LifeGrid};

use crate::renderer;
use crate::theme::{self, ThemeMode};

/// Main application state.
pub struct LifeGridApp {
    grid: LifeGrid,
    snapshot: TemporalSnapshot,
    today: NaiveDate,
    theme_mode: ThemeMode,
    /// Error message to display.
    error: Option<String>,
    /// Whether the pointer was over the canvas last frame.
    pointer_inside: bool,
}

impl LifeGridApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme_mode.visuals());
        theme::apply_typography(&cc.egui_ctx);

        let mut app = Self {
            grid: LifeGrid::new(GridConfig::default()),
            snapshot: TemporalSnapshot::default(),
            today: Local::now().date_naive(),
            theme_mode,
            error: None,
            pointer_inside: false,
        };
        app.show_profile(&LifeProfile::demo());
        app
    }

    fn load_profile(&mut self, data: &[u8]) {
        let parsed = std::str::from_utf8(data)
            .map_err(anyhow::Error::from)
            .and_then(|text| LifeProfile::from_json(text).map_err(anyhow::Error::from));
        match parsed {
            Ok(profile) => self.show_profile(&profile),
            Err(e) => {
                tracing::warn!("failed to load profile: {e}");
                self.error = Some(format!("Failed to load profile: {e}"));
            }
        }
    }

    fn show_profile(&mut self, profile: &LifeProfile) {
        match TemporalSnapshot::build(profile, self.today) {
            Ok(snapshot) => {
                self.grid.render(&snapshot);
                self.snapshot = snapshot;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("invalid profile: {e}");
                self.error = Some(format!("Invalid profile: {e}"));
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Life profile", &["json"])
            .pick_file()
        {
            match std::fs::read(&path) {
                Ok(data) => self.load_profile(&data),
                Err(e) => {
                    self.error = Some(format!("Failed to read file: {e}"));
                }
            }
        }
    }

    /// Forward this frame's pointer and wheel input on the canvas to the engine.
    fn forward_input(&mut self, ui: &egui::Ui, rect: egui::Rect, response: &egui::Response) {
        let latest = ui.input(|i| i.pointer.latest_pos());
        let local = |p: egui::Pos2| {
            let v = p - rect.min;
            (f64::from(v.x), f64::from(v.y))
        };

        if response.drag_started() {
            if let Some((x, y)) = latest.map(local) {
                self.grid.on_pointer_down(x, y);
            }
        }

        match latest.filter(|p| rect.contains(*p) || response.dragged()) {
            Some(p) => {
                let (x, y) = local(p);
                self.grid.on_pointer_move(x, y);
                self.pointer_inside = true;
            }
            None if self.pointer_inside => {
                self.grid.on_pointer_leave();
                self.pointer_inside = false;
            }
            None => {}
        }

        if response.drag_stopped() {
            self.grid.on_pointer_up();
        }

        if response.hovered() {
            let wheel: Vec<f32> = ui.input(|i| {
                i.events
                    .iter()
                    .filter_map(|e| match e {
                        egui::Event::MouseWheel { delta, .. } if delta.y != 0.0 => Some(delta.y),
                        _ => None,
                    })
                    .collect()
            });
            if let Some((x, y)) = latest.map(local) {
                for dy in wheel {
                    // egui reports wheel-up as positive
                    self.grid.on_wheel(-f64::from(dy), x, y);
                }
            }
        }

        ui.input(|i| {
            let center = rect.size() / 2.0;
            let (cx, cy) = (f64::from(center.x), f64::from(center.y));
            if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                self.grid.on_wheel(-1.0, cx, cy);
            }
            if i.key_pressed(egui::Key::Minus) {
                self.grid.on_wheel(1.0, cx, cy);
            }
        });
    }

    fn take_dropped_file(ctx: &egui::Context) -> Option<Vec<u8>> {
        ctx.input(|i| {
            let file = i.raw.dropped_files.first()?;
            if let Some(bytes) = &file.bytes {
                return Some(bytes.to_vec());
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                if let Some(path) = &file.path {
                    return std::fs::read(path).ok();
                }
            }
            None
        })
    }
}

impl eframe::App for LifeGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(data) = Self::take_dropped_file(ctx) {
            self.load_profile(&data);
        }

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("lifegrid");
                ui.separator();

                #[cfg(not(target_arch = "wasm32"))]
                {
                    if ui.button("Open").clicked() {
                        self.open_dialog();
                    }
                }

                let theme_label = match self.theme_mode {
                    ThemeMode::Dark => "Dark",
                    ThemeMode::Light => "Light",
                };
                if ui.button(theme_label).clicked() {
                    self.theme_mode = self.theme_mode.toggled();
                    ctx.set_visuals(self.theme_mode.visuals());
                }

                if ui.button("Reset view").clicked() {
                    self.grid.recenter();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{:.0}%", self.grid.camera().scale() * 100.0));
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(err) = &self.error {
                    ui.colored_label(ui.visuals().error_fg_color, err);
                } else {
                    ui.label(format!(
                        "Weeks: {} | Lived: {:.1}% | Spans: {} | Lanes: {}",
                        self.snapshot.total_weeks(),
                        self.snapshot.lived_fraction() * 100.0,
                        self.snapshot.spans.len(),
                        self.grid.span_layout().lane_count,
                    ));
                }
            });
        });

        // Central panel: the grid
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let available = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(available, egui::Sense::click_and_drag());

                let size = self.grid.camera().viewport();
                let (w, h) = (f64::from(available.width()), f64::from(available.height()));
                if size.width != w || size.height != h {
                    self.grid.resize(w, h);
                }
                self.forward_input(ui, available, &response);
                if ui.input(|i| i.key_pressed(egui::Key::Num0)) {
                    self.grid.recenter();
                }

                let dt = ui.input(|i| i.stable_dt);
                self.grid.on_frame(f64::from(dt) * 1000.0);

                let mut painter = ui.painter_at(available);
                renderer::render_commands(
                    &mut painter,
                    &self.grid.commands(),
                    available.min,
                    self.theme_mode,
                );
            });

        ctx.request_repaint();
    }
}
