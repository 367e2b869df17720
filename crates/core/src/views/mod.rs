pub mod cells;
pub mod labels;
pub mod spans;

pub use cells::render_cells;
pub use labels::render_labels;
pub use spans::render_spans;
