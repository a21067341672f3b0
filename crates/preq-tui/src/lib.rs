//! Full-screen query editor for preq.
//!
//! Elm-style layout: `update` is the only place state changes, `render` only
//! reads it, and `runtime` executes the effects the reducer returns.

pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use anyhow::Result;
use preq_core::engine::{Completion, Engine};
use preq_core::ingest::{DataBuffer, IngestEvent};
pub use runtime::TuiRuntime;
pub use state::Outcome;
use tokio::sync::mpsc;

/// Everything an interactive session is wired to.
pub struct Session {
    /// Initial query text.
    pub query: String,
    /// Buffer the feeder appends stdin to.
    pub data: DataBuffer,
    pub ingest: mpsc::UnboundedReceiver<IngestEvent>,
    /// Engine whose completions arrive on `completions`.
    pub engine: Engine,
    pub completions: mpsc::UnboundedReceiver<Completion>,
}

/// Runs the interactive session until the user commits or cancels.
///
/// Blocks the calling thread; must be called from within a tokio runtime so
/// previews can be spawned. The terminal is restored before this returns.
///
/// # Errors
/// Terminal failures and fatal ingestion errors.
pub fn run_session(session: Session) -> Result<Outcome> {
    let mut runtime = TuiRuntime::new(session)?;
    runtime.run()?;
    runtime.outcome()
}
