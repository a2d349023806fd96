//! Error types for the XML token cursor.

use thiserror::Error;

/// Errors reported while pulling tokens from an XML document.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying reader rejected the document (ill-formed markup, bad escapes, ...).
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// A prefixed element or attribute name uses a prefix with no namespace declaration in scope.
    #[error("namespace prefix `{prefix}` is not bound at byte {position}")]
    UnboundPrefix { prefix: String, position: u64 },

    /// The input ended while elements were still open.
    #[error("unexpected end of document: {open} element(s) still open")]
    UnexpectedEof { open: usize },

    /// Non-whitespace character data outside of the root element.
    #[error("text content outside of the root element at byte {position}")]
    TextOutsideRoot { position: u64 },

    /// UTF-8 decoding error in a name.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for token cursor operations.
pub type Result<T> = std::result::Result<T, Error>;
