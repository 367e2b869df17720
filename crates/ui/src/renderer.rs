use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Shape, Stroke, StrokeKind};
use lifegrid_protocol::{RenderCommand, TextAlign};

use crate::theme::{self, ThemeMode};

/// Transform state for PushTransform/PopTransform.
#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    sx: f64,
    sy: f64,
}

impl Transform {
    fn identity() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            sx: 1.0,
            sy: 1.0,
        }
    }

    fn point(&self, p: lifegrid_protocol::Point, offset: Pos2) -> Pos2 {
        Pos2::new(
            (p.x * self.sx + self.tx) as f32 + offset.x,
            (p.y * self.sy + self.ty) as f32 + offset.y,
        )
    }

    /// Uniform length scale, for radii, stroke widths and font sizes.
    fn length(&self, l: f64) -> f32 {
        (l * self.sx.abs().min(self.sy.abs())) as f32
    }
}

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the rendering area.
pub fn render_commands(
    painter: &mut egui::Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    mode: ThemeMode,
) {
    let mut transform_stack: Vec<Transform> = vec![Transform::identity()];
    let mut clip_stack: Vec<Rect> = Vec::new();

    for cmd in commands {
        let tf = transform_stack
            .last()
            .copied()
            .unwrap_or(Transform::identity());
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                border,
                corner_radius,
                ..
            } => {
                let min = tf.point(lifegrid_protocol::Point::new(rect.x, rect.y), offset);
                let max = tf.point(lifegrid_protocol::Point::new(rect.right(), rect.bottom()), offset);
                let egui_rect = Rect::from_two_pos(min, max);
                if egui_rect.width() < 0.5 || egui_rect.height() < 0.5 {
                    continue;
                }
                if !painter.clip_rect().intersects(egui_rect) {
                    continue;
                }

                let radius = CornerRadius::same(tf.length(*corner_radius).round().clamp(0.0, 255.0) as u8);
                painter.rect_filled(egui_rect, radius, theme::resolve_paint(*fill, mode));
                if let Some(border) = border {
                    painter.rect_stroke(
                        egui_rect,
                        radius,
                        Stroke::new(tf.length(border.width), theme::resolve_paint(border.paint, mode)),
                        StrokeKind::Outside,
                    );
                }
            }

            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let c = tf.point(*center, offset);
                let r = tf.length(*radius);
                if r < 0.25 {
                    continue;
                }
                let bounds = Rect::from_center_size(c, egui::vec2(r * 2.0, r * 2.0));
                if !painter.clip_rect().intersects(bounds) {
                    continue;
                }
                if let Some(fill) = fill {
                    painter.circle_filled(c, r, theme::resolve_paint(*fill, mode));
                }
                if let Some(stroke) = stroke {
                    painter.circle_stroke(
                        c,
                        r,
                        Stroke::new(tf.length(stroke.width), theme::resolve_paint(stroke.paint, mode)),
                    );
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let size = tf.length(*font_size);
                if size < 4.0 {
                    continue;
                }
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_CENTER,
                    TextAlign::Center => Align2::CENTER_CENTER,
                    TextAlign::Right => Align2::RIGHT_CENTER,
                };
                painter.text(
                    tf.point(*position, offset),
                    anchor,
                    text,
                    FontId::proportional(size),
                    theme::resolve_paint(*color, mode),
                );
            }

            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
                dash,
            } => {
                let p1 = tf.point(*from, offset);
                let p2 = tf.point(*to, offset);
                let stroke = Stroke::new(tf.length(*width), theme::resolve_paint(*color, mode));
                match dash {
                    Some(dash) => painter.extend(Shape::dashed_line(
                        &[p1, p2],
                        stroke,
                        tf.length(dash.on),
                        tf.length(dash.off),
                    )),
                    None => {
                        painter.line_segment([p1, p2], stroke);
                    }
                }
            }

            RenderCommand::SetClip { rect } => {
                let min = tf.point(lifegrid_protocol::Point::new(rect.x, rect.y), offset);
                let max = tf.point(lifegrid_protocol::Point::new(rect.right(), rect.bottom()), offset);
                clip_stack.push(painter.clip_rect());
                let intersected = painter.clip_rect().intersect(Rect::from_two_pos(min, max));
                painter.set_clip_rect(intersected);
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = clip_stack.pop() {
                    painter.set_clip_rect(prev);
                }
            }

            RenderCommand::PushTransform { translate, scale } => {
                let parent = tf;
                transform_stack.push(Transform {
                    tx: parent.tx + translate.x * parent.sx,
                    ty: parent.ty + translate.y * parent.sy,
                    sx: parent.sx * scale.x,
                    sy: parent.sy * scale.y,
                });
            }

            RenderCommand::PopTransform => {
                if transform_stack.len() > 1 {
                    transform_stack.pop();
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // groups carry no visual effect in egui
            }
        }
    }
}
