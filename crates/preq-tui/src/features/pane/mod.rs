//! Scrollable read-only text panes (input data and result).

mod render;
mod state;

pub use render::render_pane;
pub use state::{Navigation, PaneState};
