//! Error types for table/JSON conversion.

use thiserror::Error;

/// Errors that can occur while converting between tables and JSON.
#[derive(Error, Debug)]
pub enum Error {
    /// A host-facing entry point received an argument of the wrong type.
    /// Rendered the way the host reports argument errors.
    #[error("bad argument #{position} to '{function}' ({message})")]
    InvalidArgument {
        function: &'static str,
        position: usize,
        message: String,
    },

    /// The input text was not valid JSON (strict decoding path).
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The input was not a valid table-constructor literal.
    /// Positions are 1-based.
    #[error("literal parse error at line {line}, column {column}: {message}")]
    Literal {
        line: usize,
        column: usize,
        message: String,
    },

    /// Tables nested deeper than [`MAX_DEPTH`](crate::value::MAX_DEPTH) levels,
    /// on either side of the conversion.
    #[error("nesting exceeds {limit} levels")]
    TooDeep { limit: usize },

    /// `module::call` was asked for a function the module does not export.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}

impl Error {
    pub(crate) fn invalid_argument(
        function: &'static str,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            function,
            position,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout tablejson-core.
pub type Result<T> = std::result::Result<T, Error>;
