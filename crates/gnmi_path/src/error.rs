use thiserror::Error;

/// Failure to scan a path string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Non-empty input that does not begin with `/`.
    #[error("path must start with '/': {0}")]
    MissingLeadingSlash(String),

    /// A key bracket was left open, or a bracket, `=` or `]` appeared where
    /// it cannot continue the current span.
    #[error("invalid path: {0}")]
    Invalid(String),
}

impl PathError {
    /// The path string that failed to parse.
    pub fn path(&self) -> &str {
        match self {
            PathError::MissingLeadingSlash(p) | PathError::Invalid(p) => p,
        }
    }
}

/// Result of parsing a path string.
pub type PathResult<T> = Result<T, PathError>;
