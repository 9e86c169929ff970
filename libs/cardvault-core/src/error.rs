//! Error types for cardvault-core.

use thiserror::Error;

/// Errors from parsing values produced by the presentation layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown collection status: {0}")]
    UnknownStatus(String),

    #[error("malformed artwork key: {0}")]
    MalformedKey(String),
}
