//! Error types for AgenticSST operations

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Cache key derivation errors.
///
/// Key derivation fails only when the filter parameters cannot be serialized
/// into their canonical form. There is no fallback key in that case: a wrong
/// key would silently address someone else's cached result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Failed to serialize filter parameters: {reason}")]
    Serialization { reason: String },
}

/// Master error type for all AgenticSST errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SstError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// Result type alias for AgenticSST operations.
pub type SstResult<T> = Result<T, SstError>;

// =============================================================================
// TESTS
// =============================================================================
