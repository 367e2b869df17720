//! Tunable constants for the grid, its animation, and the camera.
//!
//! Every field has a default and can be overridden on its own from JSON:
//!
//! ```json
//! { "hover": { "radius": 120.0 }, "viewport": { "max_scale": 12.0 } }
//! ```
//!
//! Rates are per millisecond and feed `exp(-dt * rate)` smoothing.
//! Distances are world units (one unit = one pixel at scale 1).

use lifegrid_protocol::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub layout: LayoutConfig,
    pub idle: IdleConfig,
    pub hover: HoverConfig,
    pub highlight: HighlightConfig,
    pub labels: LabelConfig,
    pub viewport: ViewportConfig,
    pub lanes: LaneConfig,
}

impl GridConfig {
    /// Parse a (possibly partial) config and validate it.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, requirement: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, requirement })
            }
        }

        let v = &self.viewport;
        check(self.layout.cell_diameter > 0.0, "layout.cell_diameter", "positive")?;
        check(self.layout.cell_gap >= 0.0, "layout.cell_gap", "non-negative")?;
        check(v.min_scale > 0.0, "viewport.min_scale", "positive")?;
        check(v.max_scale >= v.min_scale, "viewport.max_scale", "at least min_scale")?;
        check(v.zoom_factor > 1.0, "viewport.zoom_factor", "greater than 1")?;
        check(
            v.scale_blend > 0.0 && v.scale_blend < 1.0,
            "viewport.scale_blend",
            "inside (0, 1)",
        )?;
        check(
            v.position_blend > 0.0 && v.position_blend < 1.0,
            "viewport.position_blend",
            "inside (0, 1)",
        )?;
        check(self.hover.radius >= 0.0, "hover.radius", "non-negative")?;
        check(self.hover.detect_radius >= 0.0, "hover.detect_radius", "non-negative")?;
        check(self.hover.heat_decay_rate >= 0.0, "hover.heat_decay_rate", "non-negative")?;
        check(self.highlight.follow_rate >= 0.0, "highlight.follow_rate", "non-negative")?;
        check(self.labels.follow_rate >= 0.0, "labels.follow_rate", "non-negative")?;
        Ok(())
    }
}

/// Grid geometry and base palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Cell diameter. Default 10.
    pub cell_diameter: f64,
    /// Space between neighbouring cells. Default 4.
    pub cell_gap: f64,
    /// Opacity of a cell at rest. Default 0.82.
    pub base_alpha: f32,
    /// How far a week is tinted toward the mean color of its spans. Default 0.7.
    pub span_mix: f64,
    /// Offset added to every cell's idle phase. Default 0.
    pub phase_offset: f64,
    /// Screen margin kept around the grid when first centered. Default 48.
    pub fit_margin: f64,
    pub past_color: Color,
    pub current_color: Color,
    pub future_color: Color,
    pub event_color: Color,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_diameter: 10.0,
            cell_gap: 4.0,
            base_alpha: 0.82,
            span_mix: 0.7,
            phase_offset: 0.0,
            fit_margin: 48.0,
            past_color: Color::rgb(0x6c, 0x70, 0x86),
            current_color: Color::rgb(0xf3, 0x8b, 0xa8),
            future_color: Color::rgb(0x31, 0x32, 0x44),
            event_color: Color::rgb(0xf9, 0xe2, 0xaf),
        }
    }
}

/// Input-independent wander and breathing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Positional wander, world units. Default 0.6.
    pub jitter_amplitude: f64,
    /// Radians per ms. Default 0.0011.
    pub jitter_speed: f64,
    /// Relative scale swing. Default 0.035.
    pub breathing_amplitude: f64,
    /// Radians per ms. Default 0.0017.
    pub breathing_speed: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            jitter_amplitude: 0.6,
            jitter_speed: 0.0011,
            breathing_amplitude: 0.035,
            breathing_speed: 0.0017,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Pointer influence radius, world units. Default 90.
    pub radius: f64,
    /// Radius inside which the nearest cell becomes focused. Default 10.
    pub detect_radius: f64,
    /// Decay rate of hover heat. Default 0.0035.
    pub heat_decay_rate: f64,
    /// Extra scale at full hover heat. Default 0.85.
    pub magnify_strength: f64,
    /// Exponent > 1 concentrates magnification near the pointer. Default 2.2.
    pub magnify_exponent: f64,
    /// Alpha added at full hover heat. Default 0.1.
    pub alpha_bonus: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            radius: 90.0,
            detect_radius: 10.0,
            heat_decay_rate: 0.0035,
            magnify_strength: 0.85,
            magnify_exponent: 2.2,
            alpha_bonus: 0.1,
        }
    }
}

/// Year and selection emphasis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub year_color: Color,
    /// Blend weight toward `year_color` at full year heat. Default 0.45.
    pub year_mix: f64,
    /// Scale lift at full year heat. Default 0.12.
    pub year_scale: f64,
    pub year_alpha_bonus: f32,
    pub selection_color: Color,
    /// Scale lift at full focus heat. Default 0.4.
    pub focus_scale: f64,
    pub focus_alpha_bonus: f32,
    /// Follow rate of year and focus heat. Default 0.012.
    pub follow_rate: f64,
    /// Radians per ms. Default 0.006.
    pub pulse_speed: f64,
    /// Relative pulse swing at full focus heat. Default 0.07.
    pub pulse_amount: f64,
    pub ring_year_alpha: f32,
    pub ring_focus_alpha: f32,
    pub ring_width: f64,
    /// Distance between the cell edge and its ring. Default 2.5.
    pub ring_gap: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            year_color: Color::rgb(0x89, 0xdc, 0xeb),
            year_mix: 0.45,
            year_scale: 0.12,
            year_alpha_bonus: 0.06,
            selection_color: Color::rgb(0xff, 0xff, 0xff),
            focus_scale: 0.4,
            focus_alpha_bonus: 0.15,
            follow_rate: 0.012,
            pulse_speed: 0.006,
            pulse_amount: 0.07,
            ring_year_alpha: 0.3,
            ring_focus_alpha: 0.9,
            ring_width: 1.5,
            ring_gap: 2.5,
        }
    }
}

/// Hover labels, in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub padding: f64,
    pub corner_radius: f64,
    pub font_size: f64,
    pub background: Color,
    pub text: Color,
    /// Follow rate of label opacity and position. Default 0.018.
    pub follow_rate: f64,
    /// Distance between the year label and its row. Default 12.
    pub year_gap: f64,
    /// Week label offset from its cell. Default (14, -18).
    pub week_offset_x: f64,
    pub week_offset_y: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            padding: 6.0,
            corner_radius: 4.0,
            font_size: 12.0,
            background: Color::rgba(0x18, 0x18, 0x25, 0.92),
            text: Color::rgb(0xcd, 0xd6, 0xf4),
            follow_rate: 0.018,
            year_gap: 12.0,
            week_offset_x: 14.0,
            week_offset_y: -18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Geometric zoom per wheel notch. Default 1.03.
    pub zoom_factor: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Fraction of the remaining scale distance covered per 60 Hz frame. Default 0.18.
    pub scale_blend: f64,
    /// Fraction of the remaining pan distance covered per 60 Hz frame. Default 0.22.
    pub position_blend: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.03,
            min_scale: 0.2,
            max_scale: 8.0,
            scale_blend: 0.18,
            position_blend: 0.22,
        }
    }
}

/// Span annotation lanes, in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Distance from the grid's left edge to lane 0's rail. Default 18.
    pub inset: f64,
    /// Distance between neighbouring lanes. Default 140.
    pub spacing: f64,
    pub pill_min_width: f64,
    pub pill_height: f64,
    pub pill_padding: f64,
    /// Gap between a pill and its rail. Default 10.
    pub pill_gap: f64,
    pub font_size: f64,
    pub rail_width: f64,
    pub cap_radius: f64,
    /// Length of the dashed tail marking an ongoing span. Default 24.
    pub tail_length: f64,
    pub dash_on: f64,
    pub dash_off: f64,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            inset: 18.0,
            spacing: 140.0,
            pill_min_width: 64.0,
            pill_height: 20.0,
            pill_padding: 8.0,
            pill_gap: 10.0,
            font_size: 11.0,
            rail_width: 2.0,
            cap_radius: 3.0,
            tail_length: 24.0,
            dash_on: 4.0,
            dash_off: 3.0,
        }
    }
}
