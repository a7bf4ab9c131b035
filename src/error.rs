use crate::ParseError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All error variants an engine operation can return to its caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required option is missing or malformed (namespace, name, node, settings value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested version is not one of 1, 3, 4, 5, 6, or 7.
    #[error("unsupported UUID version: {0}")]
    UnsupportedVersion(u8),

    /// A bulk request exceeded the configured cap. Nothing was generated.
    #[error("cannot generate more than {limit} UUIDs at once (requested {requested})")]
    LimitExceeded { requested: usize, limit: usize },

    /// The input is not a valid identifier in any supported format.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A record could not be rendered as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::InvalidIdentifier(err.to_string())
    }
}
