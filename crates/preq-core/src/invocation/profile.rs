use super::builder::{QUERY_PLACEHOLDER, Template};

/// The query tool driven by preq.
pub const DEFAULT_PROGRAM: &str = "yq";

/// Query used when no launch arguments are given.
pub const IDENTITY_QUERY: &str = ".";

/// Templates for the two invocation styles of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profiles {
    /// Plain output for the live preview.
    pub preview: Template,
    /// Colorized output for the committed result.
    pub commit: Template,
}

impl Profiles {
    pub fn new(preview: Template, commit: Template) -> Self {
        Self { preview, commit }
    }
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            preview: Template::new(DEFAULT_PROGRAM, ["-P", QUERY_PLACEHOLDER]),
            commit: Template::new(DEFAULT_PROGRAM, ["-C", "-P", QUERY_PLACEHOLDER]),
        }
    }
}
