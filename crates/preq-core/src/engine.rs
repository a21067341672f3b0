//! Re-evaluation engine.
//!
//! Every edit of the query or the data calls [`Engine::trigger`]. Triggers
//! are numbered with a monotonically increasing [`Generation`].
//!
//! ## Scheduling
//!
//! At most one preview process runs at a time. A trigger that arrives while a
//! run is in flight replaces the pending request, so a burst of keystrokes or
//! input chunks collapses into a single follow-up run with the newest snapshot.
//!
//! ## Publishing
//!
//! Preview tasks never touch the display. They post a [`Completion`] on a
//! channel; the UI loop hands it to [`Engine::complete`], which only returns a
//! [`Preview`] when the completion is newer than everything already published.
//! An earlier trigger can therefore never overwrite a later one.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::invocation::{self, Profiles, RunError, Template};

/// Recency tag of a trigger. Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one preview run, posted back to the UI loop.
#[derive(Debug)]
pub struct Completion {
    pub generation: Generation,
    pub result: Result<String, RunError>,
}

/// A result accepted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub generation: Generation,
    pub text: String,
    /// The text is a diagnostic rather than a transformed document.
    pub failed: bool,
}

#[derive(Debug)]
struct Request {
    generation: Generation,
    query: String,
    data: Bytes,
}

/// Keeps the preview consistent with the latest query and data.
#[derive(Debug)]
pub struct Engine {
    profiles: Profiles,
    timeout: Duration,
    /// Parent of every preview's cancellation token.
    scope: CancellationToken,
    completions: mpsc::UnboundedSender<Completion>,
    last_generation: u64,
    /// Generation of the running preview, if any.
    in_flight: Option<Generation>,
    pending: Option<Request>,
    published: Option<Generation>,
}

impl Engine {
    pub fn new(
        profiles: Profiles,
        timeout: Duration,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            profiles,
            timeout,
            scope: CancellationToken::new(),
            completions,
            last_generation: 0,
            in_flight: None,
            pending: None,
            published: None,
        }
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    /// Schedules a preview of `query` against `data`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&mut self, query: &str, data: Bytes) -> Generation {
        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        let request = Request {
            generation,
            query: query.to_owned(),
            data,
        };

        if self.in_flight.is_some() {
            if let Some(superseded) = self.pending.replace(request) {
                tracing::debug!(superseded = %superseded.generation, %generation, "coalesced preview request");
            }
        } else {
            self.launch(request);
        }
        generation
    }

    /// Accepts a completion posted by a preview task.
    ///
    /// Returns the preview to display, or `None` when the completion is stale
    /// or was cancelled.
    pub fn complete(&mut self, completion: Completion) -> Option<Preview> {
        let Completion { generation, result } = completion;

        if self.in_flight == Some(generation) {
            self.in_flight = None;
            if let Some(next) = self.pending.take() {
                self.launch(next);
            }
        }

        if self.published.is_some_and(|newest| generation <= newest) {
            tracing::debug!(%generation, "discarding stale preview");
            return None;
        }

        let preview = match result {
            Ok(text) => Preview {
                generation,
                text,
                failed: false,
            },
            Err(RunError::Cancelled) => return None,
            Err(err) => {
                tracing::debug!(%generation, error = %err, "preview failed");
                Preview {
                    generation,
                    text: err.display_text(),
                    failed: true,
                }
            }
        };
        self.published = Some(generation);
        Some(preview)
    }

    /// Kills the running preview and stops scheduling new ones.
    pub fn shutdown(&mut self) {
        self.scope.cancel();
        self.pending = None;
    }

    /// Whether a preview process is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Generation of the most recently published preview.
    #[cfg(test)]
    fn published(&self) -> Option<Generation> {
        self.published
    }

    fn launch(&mut self, request: Request) {
        if self.scope.is_cancelled() {
            return;
        }

        let Request {
            generation,
            query,
            data,
        } = request;
        let invocation = self.profiles.preview.build(&query, data);
        let token = self.scope.child_token();
        let timeout = self.timeout;
        let tx = self.completions.clone();

        tracing::debug!(%generation, query = %query, "starting preview");
        tokio::spawn(async move {
            let result = invocation::run(&invocation, &token, Some(timeout)).await;
            let _ = tx.send(Completion { generation, result });
        });

        self.in_flight = Some(generation);
    }
}

/// Runs the commit profile once, for the final output.
///
/// Uses its own cancellation scope so that session shutdown cannot abort it;
/// only `timeout` bounds it.
///
/// # Errors
/// Any run failure, including a non-zero exit of the tool.
pub async fn finalize(
    commit: &Template,
    query: &str,
    data: Bytes,
    timeout: Duration,
) -> Result<String, RunError> {
    let invocation = commit.build(query, data);
    invocation::run(&invocation, &CancellationToken::new(), Some(timeout)).await
}
