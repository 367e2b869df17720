//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write as _;

use lifegrid_protocol::{Paint, RenderCommand, Stroke, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the palette for theme tokens. Transforms, groups and
/// clips map onto nested `<g>` elements.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    );

    // Elements opened by PushTransform / BeginGroup / SetClip, closed in reverse.
    let mut open: Vec<Open> = Vec::new();
    let mut clip_id = 0usize;

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                border,
                corner_radius,
                label,
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{corner_radius}"{}{}>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    fill_attrs(Some(*fill), dark),
                    stroke_attrs(*border, dark),
                );
                if let Some(label) = label {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(label));
                }
                svg.push_str("</rect>");
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let _ = write!(
                    svg,
                    r#"<circle cx="{}" cy="{}" r="{radius}"{}{}/>"#,
                    center.x,
                    center.y,
                    fill_attrs(*fill, dark),
                    stroke_attrs(*stroke, dark),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
                dash,
            } => {
                let dash = dash
                    .map(|d| format!(r#" stroke-dasharray="{} {}""#, d.on, d.off))
                    .unwrap_or_default();
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}{dash}/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    stroke_attrs(Some(Stroke::new(*color, *line_width)), dark),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="central"{}>{}</text>"#,
                    position.x,
                    position.y,
                    fill_attrs(Some(*color), dark),
                    escape_xml(text),
                );
            }
            RenderCommand::PushTransform { translate, scale } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({} {}) scale({} {})">"#,
                    translate.x, translate.y, scale.x, scale.y,
                );
                open.push(Open::Transform);
            }
            RenderCommand::PopTransform => close_until(&mut svg, &mut open, Open::Transform),
            RenderCommand::BeginGroup { id, .. } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
                open.push(Open::Group);
            }
            RenderCommand::EndGroup => close_until(&mut svg, &mut open, Open::Group),
            RenderCommand::SetClip { rect } => {
                clip_id += 1;
                let _ = write!(
                    svg,
                    r#"<clipPath id="clip{clip_id}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip{clip_id})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                open.push(Open::Clip);
            }
            RenderCommand::ClearClip => close_until(&mut svg, &mut open, Open::Clip),
        }
    }

    for _ in open.drain(..) {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Transform,
    Group,
    Clip,
}

/// Close open elements up to and including the most recent `kind`.
/// Unmatched pops are ignored.
fn close_until(svg: &mut String, open: &mut Vec<Open>, kind: Open) {
    let Some(pos) = open.iter().rposition(|o| *o == kind) else {
        return;
    };
    for _ in pos..open.len() {
        svg.push_str("</g>");
    }
    open.truncate(pos);
}

fn fill_attrs(paint: Option<Paint>, dark: bool) -> String {
    match paint {
        None => r#" fill="none""#.to_string(),
        Some(paint) => {
            let (hex, alpha) = resolve_paint(paint, dark);
            if alpha < 1.0 {
                format!(r#" fill="{hex}" fill-opacity="{alpha:.3}""#)
            } else {
                format!(r#" fill="{hex}""#)
            }
        }
    }
}

fn stroke_attrs(stroke: Option<Stroke>, dark: bool) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let (hex, alpha) = resolve_paint(stroke.paint, dark);
    let mut attrs = format!(r#" stroke="{hex}" stroke-width="{}""#, stroke.width);
    if alpha < 1.0 {
        let _ = write!(attrs, r#" stroke-opacity="{alpha:.3}""#);
    }
    attrs
}

fn resolve_paint(paint: Paint, dark: bool) -> (String, f32) {
    match paint {
        Paint::Rgba(color) => (color.to_hex(), color.a.clamp(0.0, 1.0)),
        Paint::Theme(token) => (resolve_color(token, dark).to_string(), 1.0),
    }
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#11111b",
            ThemeToken::Surface | ThemeToken::ToolbarBackground => "#181825",
            ThemeToken::PillBackground => "#1e1e2e",
            ThemeToken::Border => "#313244",
            ThemeToken::TextPrimary | ThemeToken::ToolbarText | ThemeToken::PillText => "#cdd6f4",
            ThemeToken::TextSecondary => "#a6adc8",
            ThemeToken::TextMuted => "#6c7086",
        }
    } else {
        match token {
            ThemeToken::Background => "#eff1f5",
            ThemeToken::Surface | ThemeToken::ToolbarBackground => "#e6e9ef",
            ThemeToken::PillBackground => "#ffffff",
            ThemeToken::Border => "#ccd0da",
            ThemeToken::TextPrimary | ThemeToken::ToolbarText | ThemeToken::PillText => "#4c4f69",
            ThemeToken::TextSecondary => "#5c5f77",
            ThemeToken::TextMuted => "#8c8fa1",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_protocol::{Color, Dash, Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::DrawRect {
                rect: Rect::new(0.0, 0.0, 800.0, 400.0),
                fill: ThemeToken::Background.into(),
                border: None,
                corner_radius: 0.0,
                label: None,
            },
            RenderCommand::DrawCircle {
                center: Point::new(5.0, 5.0),
                radius: 5.0,
                fill: Some(Color::rgba(255, 0, 0, 0.5).into()),
                stroke: None,
            },
        ];
        let svg = render_svg(&commands, 800.0, 400.0, true);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("#11111b"));
        assert!(svg.contains(r##"fill="#ff0000" fill-opacity="0.500""##));
    }

    #[test]
    fn transforms_become_nested_groups() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "world".into(),
                label: None,
            },
            RenderCommand::PushTransform {
                translate: Point::new(10.0, 20.0),
                scale: Point::new(2.0, 2.0),
            },
            RenderCommand::DrawLine {
                from: Point::ZERO,
                to: Point::new(0.0, 10.0),
                color: Color::rgb(0, 0, 0).into(),
                width: 1.0,
                dash: Some(Dash { on: 4.0, off: 3.0 }),
            },
            RenderCommand::PopTransform,
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 100.0, 100.0, false);
        assert!(svg.contains(r#"<g transform="translate(10 20) scale(2 2)">"#));
        assert!(svg.contains(r#"stroke-dasharray="4 3""#));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn unbalanced_groups_are_closed() {
        let commands = vec![RenderCommand::PushTransform {
            translate: Point::ZERO,
            scale: Point::new(1.0, 1.0),
        }];
        let svg = render_svg(&commands, 10.0, 10.0, true);
        assert!(svg.ends_with("</g></svg>"));
        let svg = render_svg(&[RenderCommand::PopTransform], 10.0, 10.0, true);
        assert!(!svg.contains("</g>"));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Tom & Jerry <3".into(),
            color: ThemeToken::TextPrimary.into(),
            font_size: 12.0,
            align: TextAlign::Left,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
    }
}
