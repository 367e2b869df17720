use lifegrid_protocol::{Color, Paint, ThemeToken};

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            ThemeMode::Dark => dark_visuals(),
            ThemeMode::Light => light_visuals(),
        }
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
    .to_color32()
}

/// Theme tokens go through the palette; concrete colors pass straight through.
pub fn resolve_paint(paint: Paint, mode: ThemeMode) -> egui::Color32 {
    match paint {
        Paint::Theme(token) => resolve(token, mode),
        Paint::Rgba(color) => to_color32(color),
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, alpha)
}

fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x11, 0x11, 0x1b), // Crust
        Surface => ResolvedColor::rgb(0x18, 0x18, 0x25),    // Mantle
        Border => ResolvedColor::rgb(0x31, 0x32, 0x44),     // Surface0

        TextPrimary => ResolvedColor::rgb(0xcd, 0xd6, 0xf4), // Text
        TextSecondary => ResolvedColor::rgb(0xba, 0xc2, 0xde), // Subtext1
        TextMuted => ResolvedColor::rgb(0xa6, 0xad, 0xc8),   // Subtext0

        PillBackground => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
        PillText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),

        ToolbarBackground => ResolvedColor::rgb(0x18, 0x18, 0x25),
        ToolbarText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0xef, 0xf1, 0xf5),
        Surface => ResolvedColor::rgb(245, 245, 248),
        Border => ResolvedColor::rgb(210, 210, 220),

        TextPrimary => ResolvedColor::rgb(20, 20, 30),
        TextSecondary => ResolvedColor::rgb(80, 80, 100),
        TextMuted => ResolvedColor::rgb(100, 100, 110),

        PillBackground => ResolvedColor::rgb(255, 255, 255),
        PillText => ResolvedColor::rgb(40, 40, 50),

        ToolbarBackground => ResolvedColor::rgb(248, 248, 250),
        ToolbarText => ResolvedColor::rgb(40, 40, 50),
    }
}

// ── Typography scale ───────────────────────────────────────────────────────

pub const FONT_TITLE: f32 = 18.0;
pub const FONT_BODY: f32 = 12.0;
pub const FONT_CAPTION: f32 = 11.0;

// ── egui visual presets ────────────────────────────────────────────────────

/// Catppuccin Mocha dark visuals for egui widgets.
pub fn dark_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::dark();
    v.panel_fill = egui::Color32::from_rgb(0x18, 0x18, 0x25);
    v.window_fill = egui::Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.extreme_bg_color = egui::Color32::from_rgb(0x11, 0x11, 0x1b);
    v.faint_bg_color = egui::Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(0x31, 0x32, 0x44);
    v.widgets.noninteractive.fg_stroke =
        egui::Stroke::new(1.0, egui::Color32::from_rgb(0xba, 0xc2, 0xde));
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(0x45, 0x47, 0x5a);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(0x58, 0x5b, 0x70);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(0x89, 0xb4, 0xfa);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(0x89, 0xb4, 0xfa, 60);
    v.window_corner_radius = egui::CornerRadius::same(6);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(5);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(5);
    v.widgets.active.corner_radius = egui::CornerRadius::same(5);
    v.error_fg_color = egui::Color32::from_rgb(0xf3, 0x8b, 0xa8);
    v
}

/// Catppuccin Latte light visuals for egui widgets.
pub fn light_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::light();
    v.panel_fill = egui::Color32::from_rgb(0xe6, 0xe9, 0xef);
    v.window_fill = egui::Color32::from_rgb(0xef, 0xf1, 0xf5);
    v.extreme_bg_color = egui::Color32::from_rgb(255, 255, 255);
    v.faint_bg_color = egui::Color32::from_rgb(245, 245, 248);
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(230, 230, 235);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(220, 220, 228);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(50, 110, 220);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(50, 110, 220, 50);
    v.window_corner_radius = egui::CornerRadius::same(6);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(5);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(5);
    v.widgets.active.corner_radius = egui::CornerRadius::same(5);
    v.error_fg_color = egui::Color32::from_rgb(211, 47, 47);
    v
}

/// Apply the project's typography scale to egui styles.
pub fn apply_typography(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::proportional(FONT_TITLE),
    );
    style
        .text_styles
        .insert(egui::TextStyle::Body, egui::FontId::proportional(FONT_BODY));
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::proportional(FONT_BODY),
    );
    style.text_styles.insert(
        egui::TextStyle::Small,
        egui::FontId::proportional(FONT_CAPTION),
    );
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
