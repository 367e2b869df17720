use lifegrid_protocol::{Paint, Rect, RenderCommand, Stroke};

use crate::config::GridConfig;
use crate::field::CellField;
use crate::labels::VISIBLE_HEAT;
use crate::viewport::Camera;

/// Cells and their highlight rings, in world space.
///
/// Cells whose footprint lies outside the camera's visible rectangle are
/// culled. Rings are emitted after every cell so they are never covered.
pub fn render_cells(field: &CellField, camera: &Camera, config: &GridConfig) -> Vec<RenderCommand> {
    if field.is_empty() {
        return Vec::new();
    }
    let hl = &config.highlight;
    let base_radius = field.diameter() / 2.0;
    let visible = camera.visible_world_rect();

    let mut cells = Vec::with_capacity(field.len() + 2);
    let mut rings = Vec::new();
    cells.push(RenderCommand::BeginGroup {
        id: "cells".into(),
        label: None,
    });

    for cell in field.cells() {
        let r = cell.render;
        let radius = base_radius * r.scale;
        let reach = radius + hl.ring_gap + hl.ring_width;
        let footprint = Rect::new(
            r.position.x - reach,
            r.position.y - reach,
            reach * 2.0,
            reach * 2.0,
        );
        if !footprint.intersects(&visible) {
            continue;
        }

        cells.push(RenderCommand::DrawCircle {
            center: r.position,
            radius,
            fill: Some(Paint::Rgba(r.color.with_alpha(r.alpha))),
            stroke: None,
        });

        if f64::from(r.ring_alpha) >= VISIBLE_HEAT {
            rings.push(RenderCommand::DrawCircle {
                center: r.position,
                radius: radius + hl.ring_gap,
                fill: None,
                stroke: Some(Stroke::new(r.ring_color.with_alpha(r.ring_alpha), hl.ring_width)),
            });
        }
    }
    cells.push(RenderCommand::EndGroup);

    if !rings.is_empty() {
        cells.push(RenderCommand::BeginGroup {
            id: "rings".into(),
            label: None,
        });
        cells.append(&mut rings);
        cells.push(RenderCommand::EndGroup);
    }
    cells
}
