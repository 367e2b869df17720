use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lifegrid_core::LifeGrid;
use lifegrid_core::model::TemporalSnapshot;
use lifegrid_protocol::{Paint, Point, RenderCommand, ThemeToken};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        Block,
        canvas::{Canvas, Circle, Line, Points, Rectangle},
    },
};

/// Engine pixels covered by one terminal column / row.
const PX_PER_COL: f64 = 8.0;
const PX_PER_ROW: f64 = 16.0;

fn theme_to_color(token: ThemeToken, dark: bool) -> Color {
    match (token, dark) {
        (ThemeToken::Background | ThemeToken::Surface, true) => Color::Black,
        (ThemeToken::Background | ThemeToken::Surface, false) => Color::White,
        (ThemeToken::PillBackground | ThemeToken::ToolbarBackground, _) => Color::DarkGray,
        (ThemeToken::Border | ThemeToken::TextMuted, _) => Color::DarkGray,
        (ThemeToken::TextSecondary, _) => Color::Gray,
        (
            ThemeToken::TextPrimary | ThemeToken::PillText | ThemeToken::ToolbarText,
            true,
        ) => Color::White,
        (
            ThemeToken::TextPrimary | ThemeToken::PillText | ThemeToken::ToolbarText,
            false,
        ) => Color::Black,
    }
}

/// Terminals have no alpha: blend concrete colors onto the background.
fn paint_to_color(paint: Paint, dark: bool) -> Color {
    match paint {
        Paint::Theme(token) => theme_to_color(token, dark),
        Paint::Rgba(c) => {
            let bg = if dark { 0.0 } else { 255.0 };
            let a = f64::from(c.a.clamp(0.0, 1.0));
            let blend = |v: u8| (f64::from(v) * a + bg * (1.0 - a)).round() as u8;
            Color::Rgb(blend(c.r), blend(c.g), blend(c.b))
        }
    }
}

/// A drawable in canvas coordinates (y grows upward).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Dot { x: f64, y: f64, color: Color },
    Circle { x: f64, y: f64, radius: f64, color: Color },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, color: Color },
    Rect { x: f64, y: f64, w: f64, h: f64, color: Color },
    Text { x: f64, y: f64, text: String, color: Color },
}

#[derive(Debug, Clone, Copy)]
struct Transform {
    tx: f64,
    ty: f64,
    s: f64,
}

/// Flatten commands into canvas shapes for a surface `height` pixels tall.
///
/// Circles smaller than a terminal column collapse to dots and dashed
/// lines are split into their "on" segments.
pub fn to_shapes(commands: &[RenderCommand], height: f64, dark: bool) -> Vec<Shape> {
    let mut stack = vec![Transform {
        tx: 0.0,
        ty: 0.0,
        s: 1.0,
    }];
    let mut shapes = Vec::with_capacity(commands.len());

    for cmd in commands {
        let Some(tf) = stack.last().copied() else {
            break;
        };
        let map = |p: Point| (p.x * tf.s + tf.tx, height - (p.y * tf.s + tf.ty));
        match cmd {
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let Some(paint) = fill.or(stroke.map(|s| s.paint)) else {
                    continue;
                };
                let (x, y) = map(*center);
                let r = radius * tf.s;
                let color = paint_to_color(paint, dark);
                if r * 2.0 < PX_PER_COL {
                    // filled cells only; rings would cover their cell's dot
                    if fill.is_some() {
                        shapes.push(Shape::Dot { x, y, color });
                    }
                } else {
                    shapes.push(Shape::Circle {
                        x,
                        y,
                        radius: r,
                        color,
                    });
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                dash,
                ..
            } => {
                let color = paint_to_color(*color, dark);
                let (x1, y1) = map(*from);
                let (x2, y2) = map(*to);
                match dash {
                    Some(dash) if dash.on > 0.0 => {
                        let len = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
                        let period = (dash.on + dash.off) * tf.s;
                        let mut t = 0.0;
                        while len > 0.0 && t < len {
                            let end = (t + dash.on * tf.s).min(len);
                            let lerp = |d: f64| (x1 + (x2 - x1) * d / len, y1 + (y2 - y1) * d / len);
                            let (ax, ay) = lerp(t);
                            let (bx, by) = lerp(end);
                            shapes.push(Shape::Line {
                                x1: ax,
                                y1: ay,
                                x2: bx,
                                y2: by,
                                color,
                            });
                            t += period.max(1.0);
                        }
                    }
                    _ => shapes.push(Shape::Line {
                        x1,
                        y1,
                        x2,
                        y2,
                        color,
                    }),
                }
            }
            RenderCommand::DrawRect { rect, border, fill, .. } => {
                let (x, top) = map(Point::new(rect.x, rect.y));
                let w = rect.w * tf.s;
                let h = rect.h * tf.s;
                // the full-screen background is handled by the canvas itself
                if matches!(fill, Paint::Theme(ThemeToken::Background)) {
                    continue;
                }
                let paint = border.map_or(*fill, |b| b.paint);
                shapes.push(Shape::Rect {
                    x,
                    y: top - h,
                    w,
                    h,
                    color: paint_to_color(paint, dark),
                });
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => {
                let (x, y) = map(*position);
                shapes.push(Shape::Text {
                    x,
                    y,
                    text: text.clone(),
                    color: paint_to_color(*color, dark),
                });
            }
            RenderCommand::PushTransform { translate, scale } => {
                stack.push(Transform {
                    tx: tf.tx + translate.x * tf.s,
                    ty: tf.ty + translate.y * tf.s,
                    s: tf.s * scale.x.min(scale.y),
                });
            }
            RenderCommand::PopTransform => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            RenderCommand::SetClip { .. }
            | RenderCommand::ClearClip
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup => {}
        }
    }
    shapes
}

/// Map a terminal cell to engine pixels, relative to the canvas area.
fn cell_to_px(area: Rect, column: u16, row: u16) -> (f64, f64) {
    let col = f64::from(column.saturating_sub(area.x));
    let row = f64::from(row.saturating_sub(area.y));
    (
        col * PX_PER_COL + PX_PER_COL / 2.0,
        row * PX_PER_ROW + PX_PER_ROW / 2.0,
    )
}

fn forward_mouse(grid: &mut LifeGrid, area: Rect, mouse: MouseEvent) {
    let (x, y) = cell_to_px(area, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => grid.on_pointer_move(x, y),
        MouseEventKind::Down(MouseButton::Left) => grid.on_pointer_down(x, y),
        MouseEventKind::Up(MouseButton::Left) => grid.on_pointer_up(),
        MouseEventKind::ScrollUp => grid.on_wheel(-1.0, x, y),
        MouseEventKind::ScrollDown => grid.on_wheel(1.0, x, y),
        _ => {}
    }
}

/// Puts the terminal back into cooked mode on every exit path, `?` and
/// panics included.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            crossterm::cursor::Show
        );
    }
}

pub fn run_tui(
    grid: &mut LifeGrid,
    snapshot: &TemporalSnapshot,
    dark: bool,
    frame_budget: Duration,
) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let bg = theme_to_color(ThemeToken::Background, dark);
    let mut last = Instant::now();
    let mut size = (0.0, 0.0);

    loop {
        let term_size = terminal.size()?;
        let canvas_area = Rect::new(0, 1, term_size.width, term_size.height.saturating_sub(1));
        let px = (
            f64::from(canvas_area.width) * PX_PER_COL,
            f64::from(canvas_area.height) * PX_PER_ROW,
        );
        if px != size {
            grid.resize(px.0, px.1);
            size = px;
        }

        let now = Instant::now();
        grid.on_frame(now.duration_since(last).as_secs_f64() * 1000.0);
        last = now;
        let shapes = to_shapes(&grid.commands(), px.1, dark);

        terminal.draw(|frame| {
            let area = frame.area();
            let header = Block::default()
                .title(format!(
                    " lifegrid | {} weeks, {:.1}% lived | {:.0}% zoom | drag pan | scroll/+/- zoom | 0 reset | q quit ",
                    snapshot.total_weeks(),
                    snapshot.lived_fraction() * 100.0,
                    grid.camera().scale() * 100.0,
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, Rect::new(0, 0, area.width, 1));

            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .background_color(bg)
                .x_bounds([0.0, px.0])
                .y_bounds([0.0, px.1])
                .paint(|ctx| {
                    for shape in &shapes {
                        match shape {
                            Shape::Dot { x, y, color } => ctx.draw(&Points {
                                coords: &[(*x, *y)],
                                color: *color,
                            }),
                            Shape::Circle {
                                x,
                                y,
                                radius,
                                color,
                            } => ctx.draw(&Circle {
                                x: *x,
                                y: *y,
                                radius: *radius,
                                color: *color,
                            }),
                            Shape::Line {
                                x1,
                                y1,
                                x2,
                                y2,
                                color,
                            } => ctx.draw(&Line {
                                x1: *x1,
                                y1: *y1,
                                x2: *x2,
                                y2: *y2,
                                color: *color,
                            }),
                            Shape::Rect { x, y, w, h, color } => ctx.draw(&Rectangle {
                                x: *x,
                                y: *y,
                                width: *w,
                                height: *h,
                                color: *color,
                            }),
                            Shape::Text { x, y, text, color } => ctx.print(
                                *x,
                                *y,
                                Span::styled(text.clone(), Style::default().fg(*color)),
                            ),
                        }
                    }
                });
            frame.render_widget(canvas, canvas_area);
        })?;

        let timeout = frame_budget.saturating_sub(last.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let (cx, cy) = (px.0 / 2.0, px.1 / 2.0);
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('+') | KeyCode::Char('=') => grid.on_wheel(-1.0, cx, cy),
                        KeyCode::Char('-') => grid.on_wheel(1.0, cx, cy),
                        KeyCode::Char('0') => {
                            grid.recenter();
                        }
                        KeyCode::Left => grid.on_drag_move(PX_PER_COL * 4.0, 0.0),
                        KeyCode::Right => grid.on_drag_move(-PX_PER_COL * 4.0, 0.0),
                        KeyCode::Up => grid.on_drag_move(0.0, PX_PER_ROW * 2.0),
                        KeyCode::Down => grid.on_drag_move(0.0, -PX_PER_ROW * 2.0),
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => forward_mouse(grid, canvas_area, mouse),
                Event::FocusLost => grid.on_pointer_leave(),
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifegrid_protocol::{Color as Rgba, Dash};

    #[test]
    fn transform_and_flip() {
        let cmds = vec![
            RenderCommand::PushTransform {
                translate: Point::new(10.0, 20.0),
                scale: Point::new(2.0, 2.0),
            },
            RenderCommand::DrawCircle {
                center: Point::new(5.0, 5.0),
                radius: 1.0,
                fill: Some(Rgba::rgb(255, 0, 0).into()),
                stroke: None,
            },
            RenderCommand::PopTransform,
            RenderCommand::DrawCircle {
                center: Point::new(5.0, 5.0),
                radius: 20.0,
                fill: Some(Rgba::rgb(0, 255, 0).into()),
                stroke: None,
            },
        ];
        let shapes = to_shapes(&cmds, 100.0, true);
        assert_eq!(
            shapes[0],
            Shape::Dot {
                x: 20.0,
                y: 70.0,
                color: Color::Rgb(255, 0, 0)
            }
        );
        assert!(matches!(shapes[1], Shape::Circle { x, y, radius, .. } if x == 5.0 && y == 95.0 && radius == 20.0));
    }

    #[test]
    fn alpha_blends_onto_background() {
        let half = Rgba::rgba(200, 100, 0, 0.5);
        assert_eq!(paint_to_color(half.into(), true), Color::Rgb(100, 50, 0));
        assert_eq!(paint_to_color(half.into(), false), Color::Rgb(228, 178, 128));
    }

    #[test]
    fn dashed_lines_split_into_segments() {
        let cmds = vec![RenderCommand::DrawLine {
            from: Point::new(0.0, 0.0),
            to: Point::new(0.0, 20.0),
            color: Rgba::rgb(1, 1, 1).into(),
            width: 1.0,
            dash: Some(Dash { on: 4.0, off: 6.0 }),
        }];
        let shapes = to_shapes(&cmds, 20.0, true);
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn guard_drop_is_harmless_outside_raw_mode() {
        drop(TerminalGuard);
        assert!(!crossterm::terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[test]
    fn mouse_cells_map_to_pixel_centers() {
        let area = Rect::new(0, 1, 80, 24);
        assert_eq!(cell_to_px(area, 0, 1), (4.0, 8.0));
        assert_eq!(cell_to_px(area, 10, 3), (84.0, 40.0));
    }
}
