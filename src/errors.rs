use thiserror::Error;

/// The result type for the `descan` crate.
pub type Result<T> = std::result::Result<T, DescanError>;

/// The error type for the `descan` crate.
#[derive(Error, Debug)]
pub struct DescanError {
    /// The source of the error.
    pub source: Box<DescanErrorKind>,
}

impl DescanError {
    /// Create a new `DescanError`.
    pub fn new(kind: DescanErrorKind) -> Self {
        DescanError {
            source: Box::new(kind),
        }
    }
}

impl std::fmt::Display for DescanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// The error kind type.
#[derive(Error, Debug)]
pub enum DescanErrorKind {
    /// The surface syntax of a pattern is malformed.
    #[error("'{pattern}' {message}")]
    RegexParse {
        /// The offending pattern source.
        pattern: String,
        /// What went wrong.
        message: String,
    },

    /// A character range or counted repetition with invalid bounds.
    #[error("invalid range: {0}")]
    Range(String),

    /// The pattern definition file is malformed.
    #[error("pattern file error: {0}")]
    PatternFile(String),

    /// A serialized context could not be restored.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A std::io error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<std::io::Error> for DescanError {
    fn from(error: std::io::Error) -> Self {
        DescanError::new(DescanErrorKind::Io(error))
    }
}
