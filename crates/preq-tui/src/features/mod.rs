pub mod pane;
pub mod query;
