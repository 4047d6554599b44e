use std::fmt;

/// Opaque credential handed to the GitHub API or forwarded to the pipeline.
///
/// The value never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Secrets shared read-only by every dispatch site of an invocation.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Coverage-reporting credential, exported as `CODECOV_TOKEN`.
    pub codecov_token: Option<Token>,
}

impl Secrets {
    pub fn new(codecov_token: Option<Token>) -> Self {
        Self { codecov_token }
    }
}
