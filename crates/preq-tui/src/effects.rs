//! Effects returned by the reducer for the runtime to execute.
//!
//! The reducer only mutates state; spawning previews and stopping the
//! engine happen in the runtime.

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Preview `query` against `data`.
    Evaluate { query: String, data: Bytes },
    /// Leave the event loop and stop the engine.
    Quit,
}
