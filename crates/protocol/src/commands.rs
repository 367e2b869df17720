use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per frame. Renderers consume
/// this list sequentially and each command carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally rounded and bordered, with an
    /// optional label used for hover tooltips.
    DrawRect {
        rect: Rect,
        fill: Paint,
        border: Option<Stroke>,
        corner_radius: f64,
        label: Option<String>,
    },

    /// Draw a circle. Either `fill` or `stroke` (or both) is set.
    DrawCircle {
        center: Point,
        radius: f64,
        fill: Option<Paint>,
        stroke: Option<Stroke>,
    },

    /// Draw a text string anchored at a position (vertically centered).
    DrawText {
        position: Point,
        text: String,
        color: Paint,
        font_size: f64,
        align: TextAlign,
    },

    /// Draw a line segment, solid unless `dash` is set.
    DrawLine {
        from: Point,
        to: Point,
        color: Paint,
        width: f64,
        dash: Option<Dash>,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Push an affine transform (applied to all subsequent commands until
    /// the matching `PopTransform`). Points map as `p * scale + translate`.
    PushTransform { translate: Point, scale: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group (e.g. the cell layer). Renderers may use this
    /// for batching or layer separation.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

/// Fill or stroke color: a theme token resolved by the renderer, or a
/// concrete color computed by the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    Theme(ThemeToken),
    Rgba(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Theme(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Rgba(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
}

impl Stroke {
    pub fn new(paint: impl Into<Paint>, width: f64) -> Self {
        Self {
            paint: paint.into(),
            width,
        }
    }
}

/// Dash pattern in the same units as the line coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    pub on: f64,
    pub off: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
