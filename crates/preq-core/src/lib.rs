//! Core of preq: invoking the external query tool, buffering piped input,
//! and keeping the live preview in step with the latest edits.

pub mod engine;
pub mod ingest;
pub mod interrupt;
pub mod invocation;
pub mod logging;
