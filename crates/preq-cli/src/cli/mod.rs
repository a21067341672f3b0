//! CLI entry: argument parsing, the stdin check, and the final output.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use preq_core::engine::{self, Engine};
use preq_core::ingest::{self, DataBuffer};
use preq_core::invocation::{IDENTITY_QUERY, Profiles, Template};
use preq_core::{interrupt, logging};
use preq_tui::{Outcome, Session};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "preq")]
#[command(version)]
#[command(about = "Edit a yq query live against piped input")]
#[command(
    after_help = "On Enter the result is printed to stdout and the query to stderr.\n\
                  Esc, Ctrl-C or Ctrl-D exit without output."
)]
struct Cli {
    /// Seconds a single yq run may take
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 5,
        env = "PREQ_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Write diagnostic logs to this file (filter with PREQ_LOG)
    #[arg(long, value_name = "PATH", env = "PREQ_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Initial query; words are joined with spaces (default: `.`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    query: Vec<String>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    ensure_piped_stdin()?;

    let _log_guard = logging::init(cli.log_file.as_deref())?;
    interrupt::init().context("install SIGINT handler")?;

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let result = rt.block_on(async move { session(cli).await });
    // The stdin reader may still be blocked on an open pipe.
    rt.shutdown_background();
    result
}

async fn session(cli: Cli) -> Result<()> {
    let timeout = Duration::from_secs(cli.timeout);
    let profiles = Profiles::default();

    let data = DataBuffer::new();
    let (ingest_tx, ingest_rx) = mpsc::unbounded_channel();
    ingest::spawn_feeder(tokio::io::stdin(), data.clone(), ingest_tx);

    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let engine = Engine::new(profiles.clone(), timeout, completions_tx);

    let outcome = preq_tui::run_session(Session {
        query: initial_query(&cli.query),
        data,
        ingest: ingest_rx,
        engine,
        completions: completions_rx,
    })?;

    emit(
        outcome,
        &profiles.commit,
        timeout,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}

/// Writes the committed result to `out` and the query to `err`.
///
/// A cancelled session writes nothing. When the final run fails nothing is
/// written and the error is returned.
async fn emit(
    outcome: Outcome,
    commit: &Template,
    timeout: Duration,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let Outcome::Committed { query, data } = outcome else {
        return Ok(());
    };

    let result = engine::finalize(commit, &query, data, timeout)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "final run failed"))
        .context("final yq run failed")?;

    writeln!(out, "{result}").context("write result")?;
    writeln!(err, "{query}").context("write query")?;
    Ok(())
}

fn initial_query(words: &[String]) -> String {
    if words.is_empty() {
        IDENTITY_QUERY.to_string()
    } else {
        words.join(" ")
    }
}

/// Refuses to start unless stdin is a pipe or a file.
fn ensure_piped_stdin() -> Result<()> {
    if stdin_is_char_device()? {
        bail!("stdin must be a pipe");
    }
    Ok(())
}

#[cfg(unix)]
fn stdin_is_char_device() -> Result<bool> {
    use std::fs::File;
    use std::os::fd::AsFd;
    use std::os::unix::fs::FileTypeExt;

    let fd = io::stdin()
        .as_fd()
        .try_clone_to_owned()
        .context("duplicate stdin")?;
    let metadata = File::from(fd).metadata().context("inspect stdin")?;
    Ok(metadata.file_type().is_char_device())
}

#[cfg(not(unix))]
fn stdin_is_char_device() -> Result<bool> {
    use std::io::IsTerminal;

    Ok(io::stdin().is_terminal())
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    const WAIT: Duration = Duration::from_secs(10);

    /// Stands in for the commit profile: prints `<query>` then the input.
    fn echo_commit() -> Template {
        Template::new("sh", ["-c", r#"printf '<%s>' "$0"; cat"#, "{+q}"])
    }

    async fn emit_to_buffers(outcome: Outcome, commit: &Template) -> (Result<()>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = emit(outcome, commit, WAIT, &mut out, &mut err).await;
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_commit_prints_result_and_query() {
        let outcome = Outcome::Committed {
            query: ".".into(),
            data: Bytes::from_static(b"{\"a\":1}"),
        };

        let (result, out, err) = emit_to_buffers(outcome, &echo_commit()).await;

        result.unwrap();
        assert_eq!(out, "<.>{\"a\":1}\n");
        assert_eq!(err, ".\n");
    }

    #[tokio::test]
    async fn test_cancel_prints_nothing() {
        let (result, out, err) = emit_to_buffers(Outcome::Cancelled, &echo_commit()).await;

        result.unwrap();
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_final_run_failure_prints_nothing() {
        let commit = Template::new("sh", ["-c", "echo 'Error: bad query' >&2; exit 1"]);
        let outcome = Outcome::Committed {
            query: ".[".into(),
            data: Bytes::new(),
        };

        let (result, out, err) = emit_to_buffers(outcome, &commit).await;

        let error = format!("{:#}", result.unwrap_err());
        assert!(error.starts_with("final yq run failed"));
        assert!(error.contains("Error: bad query"));
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    fn words(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_initial_query_defaults_to_identity() {
        assert_eq!(initial_query(&[]), ".");
    }

    #[test]
    fn test_initial_query_joins_words() {
        assert_eq!(initial_query(&words(&[".items[]", "|", ".name"])), ".items[] | .name");
    }

    #[test]
    fn test_query_words_may_look_like_flags() {
        let cli = Cli::try_parse_from(["preq", "--timeout", "2", ".a", "-", "1"]).unwrap();

        assert_eq!(cli.timeout, 2);
        assert_eq!(initial_query(&cli.query), ".a - 1");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["preq", "--timeout", "0"]).is_err());
    }
}
