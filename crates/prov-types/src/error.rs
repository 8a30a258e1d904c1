use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("field `{field}` expects an integer, got {value:?}")]
    NotAnInteger { field: &'static str, value: String },

    #[error("field `{field}` has unsupported JSON value: {value}")]
    UnsupportedValue { field: &'static str, value: String },

    #[error("payload is missing field `{0}`")]
    MissingField(&'static str),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("serialization error: {0}")]
    Serialization(String),
}
