use std::process::Stdio;

use bytes::Bytes;
use tokio::process::Command;

/// Token replaced by the query text in every argument of a [`Template`].
pub const QUERY_PLACEHOLDER: &str = "{+q}";

/// A program plus argument patterns for one invocation style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    program: String,
    args: Vec<String>,
}

impl Template {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Substitutes `query` for every placeholder and attaches `input` as stdin.
    ///
    /// The query is inserted verbatim: no quoting, no validation. Anything the
    /// tool rejects shows up later as a run failure.
    pub fn build(&self, query: &str, input: Bytes) -> Invocation {
        let args = self
            .args
            .iter()
            .map(|pattern| pattern.replace(QUERY_PLACEHOLDER, query))
            .collect();

        Invocation {
            program: self.program.clone(),
            args,
            input,
        }
    }
}

/// A fully substituted process description, ready to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Written to the child's stdin.
    pub input: Bytes,
}

impl Invocation {
    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_substitutes_every_placeholder() {
        let template = Template::new("yq", ["-P", "{+q}", "--arg={+q}|{+q}"]);

        let invocation = template.build(".a.b", Bytes::new());

        assert_eq!(invocation.program, "yq");
        assert_eq!(invocation.args, vec!["-P", ".a.b", "--arg=.a.b|.a.b"]);
        assert!(
            invocation
                .args
                .iter()
                .all(|arg| !arg.contains(QUERY_PLACEHOLDER))
        );
    }

    #[test]
    fn test_build_keeps_query_verbatim() {
        let template = Template::new("yq", ["{+q}"]);
        let query = r#".items[] | select(.name == "a b") | "$HOME; rm -rf /""#;

        let invocation = template.build(query, Bytes::new());

        assert_eq!(invocation.args, vec![query.to_string()]);
    }

    #[test]
    fn test_build_with_empty_query_and_no_placeholder() {
        let template = Template::new("yq", ["--version"]);

        let invocation = template.build("", Bytes::from_static(b"a: 1"));

        assert_eq!(invocation.args, vec!["--version"]);
        assert_eq!(invocation.input, Bytes::from_static(b"a: 1"));
    }

    #[test]
    fn test_build_leaves_surrounding_text() {
        let template = Template::new("sh", ["-c", "echo pre-{+q}-post"]);

        let invocation = template.build("mid", Bytes::new());

        assert_eq!(invocation.args, vec!["-c", "echo pre-mid-post"]);
    }

    #[test]
    fn test_build_does_not_mutate_template() {
        let template = Template::new("yq", ["{+q}"]);

        let first = template.build(".a", Bytes::new());
        let second = template.build(".b", Bytes::new());

        assert_eq!(first.args, vec![".a"]);
        assert_eq!(second.args, vec![".b"]);
        assert_eq!(template.args(), ["{+q}"]);
    }
}
