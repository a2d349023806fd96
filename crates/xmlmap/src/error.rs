//! Error types for XML data binding.

use thiserror::Error;

/// Errors that abort a binding run.
///
/// None of these are recovered internally. A destination that was being
/// populated when the error was raised is left partially written.
#[derive(Debug, Error)]
pub enum Error {
    /// Text could not be converted to the declared scalar type.
    #[error("cannot parse {value:?} as {expected}: {reason}")]
    TypeMismatch {
        expected: String,
        value: String,
        reason: String,
    },

    /// Text does not name any value of the declared enum.
    #[error("unknown value {value:?} for enum {enum_name}")]
    UnknownEnumValue { enum_name: String, value: String },

    /// A namespace URI was referenced before any alias was declared for it.
    #[error("no alias declared for namespace URI {uri:?}")]
    UnknownNamespace { uri: String },

    /// The token source rejected the document.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] xmlmap_pull::Error),

    /// Internal consistency check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Element nesting exceeded the configured maximum.
    #[error("element nesting exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

/// Result type for binding operations.
pub type Result<T> = std::result::Result<T, Error>;
