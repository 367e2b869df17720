use lifegrid_protocol::{Dash, Paint, RenderCommand, Stroke, TextAlign, ThemeToken};

use crate::config::LaneConfig;
use crate::lanes::SpanLayout;

/// Span rails, connectors, caps and title pills, in world space.
pub fn render_spans(layout: &SpanLayout, config: &LaneConfig) -> Vec<RenderCommand> {
    if layout.placements.is_empty() {
        return Vec::new();
    }
    let mut commands = Vec::with_capacity(layout.placements.len() * 7 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "spans".into(),
        label: Some(format!("{} lanes", layout.lane_count)),
    });

    for p in &layout.placements {
        let paint = Paint::Rgba(p.color);

        commands.push(RenderCommand::DrawLine {
            from: p.rail_top,
            to: p.rail_bottom,
            color: paint,
            width: config.rail_width,
            dash: None,
        });
        commands.push(RenderCommand::DrawLine {
            from: p.connector.0,
            to: p.connector.1,
            color: paint,
            width: config.rail_width / 2.0,
            dash: None,
        });
        if let Some((from, to)) = p.tail {
            commands.push(RenderCommand::DrawLine {
                from,
                to,
                color: paint,
                width: config.rail_width,
                dash: Some(Dash {
                    on: config.dash_on,
                    off: config.dash_off,
                }),
            });
        }

        for cap in std::iter::once(p.start_cap).chain(p.end_cap) {
            commands.push(RenderCommand::DrawCircle {
                center: cap,
                radius: config.cap_radius,
                fill: Some(paint),
                stroke: None,
            });
        }

        commands.push(RenderCommand::DrawRect {
            rect: p.pill,
            fill: ThemeToken::PillBackground.into(),
            border: Some(Stroke::new(p.color, 1.0)),
            corner_radius: p.pill.h / 2.0,
            label: Some(p.title.clone()),
        });
        commands.push(RenderCommand::DrawText {
            position: p.pill.center(),
            text: p.pill_text.clone(),
            color: ThemeToken::PillText.into(),
            font_size: config.font_size,
            align: TextAlign::Center,
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
