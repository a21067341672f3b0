//! Events consumed by the reducer.
//!
//! Terminal input, ingestion progress and preview results all arrive here;
//! background tasks never touch state directly.

use bytes::Bytes;
use crossterm::event::Event;
use preq_core::engine::Preview;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Terminal size changed (also sent once at startup).
    Frame { width: u16, height: u16 },
    Terminal(Event),
    /// One or more chunks were appended to the data buffer.
    DataAppended { snapshot: Bytes },
    IngestFinished { total: usize },
    IngestFailed(String),
    /// A preview newer than anything shown so far.
    Preview(Preview),
    /// SIGINT delivered from outside the terminal.
    Interrupted,
}
