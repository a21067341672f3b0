//! Query line: editable buffer and its single-row view.

mod render;
mod text_buffer;

pub use render::render_query;
pub use text_buffer::{CursorMove, TextBuffer};
