//! Per-frame procedural animation of the cell field.
//!
//! Every smoothed quantity uses `v = target + (v - target) * exp(-dt * rate)`,
//! so the result depends on elapsed time rather than on the frame count.

use lifegrid_protocol::Point;

use crate::color;
use crate::config::GridConfig;
use crate::field::Cell;

/// Result of one animation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFocus {
    /// Week index of the cell under the pointer.
    pub focused: Option<usize>,
    /// Year-index of the focused cell.
    pub hovered_year: Option<usize>,
}

/// Clock handed to [`step`].
#[derive(Debug, Clone, Copy)]
pub struct FrameTime {
    /// Time since the previous frame, ms.
    pub dt: f64,
    /// Time since the engine started, ms.
    pub elapsed: f64,
}

/// Advance every cell by one frame.
///
/// `pointer` is the pointer in world space, `None` when it is outside the
/// canvas. With no cells this does nothing and reports no focus.
pub fn step(
    cells: &mut [Cell],
    time: FrameTime,
    pointer: Option<Point>,
    config: &GridConfig,
) -> FrameFocus {
    if cells.is_empty() {
        return FrameFocus::default();
    }
    let dt = if time.dt.is_finite() { time.dt.max(0.0) } else { 0.0 };
    let t = time.elapsed;

    let focused = pointer.and_then(|p| nearest_cell(cells, p, config.hover.detect_radius));
    let hovered_year = focused.map(|i| cells[i].year);

    let hover_keep = (-dt * config.hover.heat_decay_rate).exp();
    let follow_keep = (-dt * config.highlight.follow_rate).exp();

    let idle = &config.idle;
    let hover = &config.hover;
    let hl = &config.highlight;
    let base_alpha = config.layout.base_alpha;

    for (i, cell) in cells.iter_mut().enumerate() {
        let phase = cell.phase;

        let offset_x = (t * idle.jitter_speed + phase).sin() * idle.jitter_amplitude;
        let offset_y = (t * idle.jitter_speed * 1.31 + phase * 1.7).sin() * idle.jitter_amplitude;
        let breathing = (t * idle.breathing_speed + phase).sin() * idle.breathing_amplitude;

        let influence = pointer.map_or(0.0, |p| hover_influence(cell.base_position, p, hover.radius));
        cell.hover_heat = influence.max(cell.hover_heat * hover_keep).clamp(0.0, 1.0);

        let year_target = if hovered_year == Some(cell.year) { 1.0 } else { 0.0 };
        let focus_target = if focused == Some(i) { 1.0 } else { 0.0 };
        cell.year_heat = follow(cell.year_heat, year_target, follow_keep);
        cell.focus_heat = follow(cell.focus_heat, focus_target, follow_keep);

        let magnify = cell.hover_heat.powf(hover.magnify_exponent) * hover.magnify_strength;
        let pulse = 1.0 + (t * hl.pulse_speed + phase).sin() * hl.pulse_amount * cell.focus_heat;
        let scale = (1.0
            + breathing
            + magnify
            + cell.year_heat * hl.year_scale
            + cell.focus_heat * hl.focus_scale)
            * pulse;

        let tinted = color::mix(cell.base_color, hl.year_color, cell.year_heat * hl.year_mix);
        let color = color::mix(tinted, hl.selection_color, cell.focus_heat);
        let alpha = base_alpha
            + cell.hover_heat as f32 * hover.alpha_bonus
            + cell.year_heat as f32 * hl.year_alpha_bonus
            + cell.focus_heat as f32 * hl.focus_alpha_bonus;

        let ring_alpha = cell.year_heat as f32 * hl.ring_year_alpha
            + cell.focus_heat as f32 * hl.ring_focus_alpha;

        cell.render.position = cell.base_position.offset(offset_x, offset_y);
        cell.render.scale = scale.max(0.0);
        cell.render.color = color;
        cell.render.alpha = alpha.clamp(0.0, 1.0);
        cell.render.ring_color = color::mix(hl.year_color, hl.selection_color, cell.focus_heat);
        cell.render.ring_alpha = ring_alpha.clamp(0.0, 1.0);
    }

    FrameFocus {
        focused,
        hovered_year,
    }
}

/// Nearest cell whose base position lies within `radius` of `pointer`.
/// The first minimum in scan order wins ties.
pub fn nearest_cell(cells: &[Cell], pointer: Point, radius: f64) -> Option<usize> {
    let limit = radius * radius;
    let mut best: Option<(usize, f64)> = None;
    for (i, cell) in cells.iter().enumerate() {
        let d2 = cell.base_position.distance_squared(pointer);
        if d2 > limit {
            continue;
        }
        if best.is_none_or(|(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

/// `1 - d / r` inside the radius, 0 outside.
pub fn hover_influence(position: Point, pointer: Point, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let d = position.distance_squared(pointer).sqrt();
    if d >= radius { 0.0 } else { 1.0 - d / radius }
}

fn follow(value: f64, target: f64, keep: f64) -> f64 {
    (target + (value - target) * keep).clamp(0.0, 1.0)
}
