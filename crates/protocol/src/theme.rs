use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
///
/// Data-driven colors (cells, spans, highlights) travel as concrete
/// [`Color`](crate::Color) values; tokens cover the surrounding chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Surface,
    Border,

    TextPrimary,
    TextSecondary,
    TextMuted,

    // Span annotations
    PillBackground,
    PillText,

    // Toolbar / status bar
    ToolbarBackground,
    ToolbarText,
}
