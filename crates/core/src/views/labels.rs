use lifegrid_protocol::{Paint, Point, Rect, RenderCommand, TextAlign};

use crate::config::LabelConfig;
use crate::labels::{HoverLabel, LabelSet};

/// Screen-space hover labels. The year label's box ends at its anchor, the
/// week label's box starts at its anchor.
pub fn render_labels(labels: &LabelSet, config: &LabelConfig) -> Vec<RenderCommand> {
    let mut commands = Vec::new();
    for (label, right_aligned) in [(&labels.year, true), (&labels.week, false)] {
        if label.is_visible() {
            push_label(&mut commands, label, right_aligned, config);
        }
    }
    if commands.is_empty() {
        return commands;
    }
    commands.insert(
        0,
        RenderCommand::BeginGroup {
            id: "labels".into(),
            label: None,
        },
    );
    commands.push(RenderCommand::EndGroup);
    commands
}

fn push_label(out: &mut Vec<RenderCommand>, label: &HoverLabel, right_aligned: bool, config: &LabelConfig) {
    let heat = label.heat() as f32;
    let anchor = label.position();
    let w = label.width() + 2.0 * config.padding;
    let h = config.font_size + 2.0 * config.padding;
    let x = if right_aligned { anchor.x - w } else { anchor.x };
    let rect = Rect::new(x, anchor.y - h / 2.0, w, h);

    out.push(RenderCommand::DrawRect {
        rect,
        fill: Paint::Rgba(config.background.with_alpha(config.background.a * heat)),
        border: None,
        corner_radius: config.corner_radius,
        label: None,
    });
    out.push(RenderCommand::DrawText {
        position: Point::new(rect.x + config.padding, anchor.y),
        text: label.text().to_string(),
        color: Paint::Rgba(config.text.with_alpha(config.text.a * heat)),
        font_size: config.font_size,
        align: TextAlign::Left,
    });
}
