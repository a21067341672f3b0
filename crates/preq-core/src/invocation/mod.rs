//! External query tool invocation.
//!
//! - `builder`: argument templating (`{+q}` substitution), never executes anything
//! - `runner`: spawns a built invocation and captures its output
//! - `profile`: the preview and commit templates used by a session

mod builder;
mod profile;
mod runner;

pub use builder::{Invocation, QUERY_PLACEHOLDER, Template};
pub use profile::{DEFAULT_PROGRAM, IDENTITY_QUERY, Profiles};
pub use runner::{RunError, run};
