use thiserror::Error;

use crate::delegates::DelegateSignature;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read file '{0}': {1}")]
    IoError(String, #[source] std::io::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Schema validation failed: {0}")]
    ValidationError(String),
}

/// Raised when a delegate handed to a definition has the wrong call shape.
///
/// This is an integration bug between cooperating mods and must not be swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegateError {
    #[error("Delegate {key} type mismatch! [MapDelegate: {found} | ApiDelegate: {expected}]")]
    SignatureMismatch {
        key: String,
        expected: DelegateSignature,
        found: DelegateSignature,
    },
}
