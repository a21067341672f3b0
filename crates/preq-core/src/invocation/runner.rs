use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::builder::Invocation;

/// Why an invocation did not produce a successful result.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` failed ({status}): {}", .output.trim())]
    Failed {
        program: String,
        status: ExitStatus,
        /// Combined output captured before the non-zero exit.
        output: String,
    },

    #[error("`{program}` timed out after {}s", .timeout.as_secs_f32())]
    TimedOut { program: String, timeout: Duration },

    #[error("invocation cancelled")]
    Cancelled,

    #[error("I/O error while running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Text to show in place of a result.
    ///
    /// Prefers the tool's own diagnostic output over our error message.
    pub fn display_text(&self) -> String {
        match self {
            Self::Failed { output, .. } if !output.trim().is_empty() => output.clone(),
            other => other.to_string(),
        }
    }
}

/// Runs `invocation` to completion and returns stdout followed by stderr.
///
/// The child is killed when `cancel` fires or `timeout` elapses.
///
/// # Errors
/// Returns an error if the program cannot be spawned, exits non-zero
/// (the captured text is kept in [`RunError::Failed`]), is cancelled, or times out.
pub async fn run(
    invocation: &Invocation,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Result<String, RunError> {
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, execute(invocation))
                .await
                .unwrap_or_else(|_| {
                    Err(RunError::TimedOut {
                        program: invocation.program.clone(),
                        timeout: limit,
                    })
                }),
            None => execute(invocation).await,
        }
    };

    // Dropping `bounded` drops the child, and `kill_on_drop` reaps it.
    tokio::select! {
        () = cancel.cancelled() => Err(RunError::Cancelled),
        result = bounded => result,
    }
}

async fn execute(invocation: &Invocation) -> Result<String, RunError> {
    let program = &invocation.program;
    let mut child = invocation
        .command()
        .spawn()
        .map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdin = child.stdin.take();
    let input = invocation.input.clone();
    let feed = async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(&input).await {
            // The tool may exit without reading all of its input.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output.map_err(|source| RunError::Io {
        program: program.clone(),
        source,
    })?;
    fed.map_err(|source| RunError::Io {
        program: program.clone(),
        source,
    })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(text)
    } else {
        Err(RunError::Failed {
            program: program.clone(),
            status: output.status,
            output: text,
        })
    }
}
