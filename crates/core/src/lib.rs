//! Animation and interaction core for a life-in-weeks grid.
//!
//! [`grid::LifeGrid`] owns all state. Hosts feed it a
//! [`model::TemporalSnapshot`], forward input events, call
//! [`grid::LifeGrid::on_frame`] once per display frame and paint the
//! [`lifegrid_protocol::RenderCommand`]s it returns.

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod grid;
pub mod input;
pub mod labels;
pub mod lanes;
pub mod model;
pub mod svg;
pub mod viewport;
pub mod views;

pub use config::GridConfig;
pub use error::{ConfigError, ModelError};
pub use grid::LifeGrid;
pub use input::InputEvent;
