/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 *
 * Ordinary map conditions (absent key, empty map) are never errors; they are
 * reported through `Option` and `bool`. The types below cover the bounded
 * lock waits, configuration loading and annotation model validation.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use thiserror::Error;

/// Lock acquisition errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LockError {
    #[error("Timed out after {waited_ms}ms waiting for lock domain")]
    #[diagnostic(
        code(lock::timeout),
        help("Another thread holds the lock domain. Check for long-running critical sections.")
    )]
    Timeout { waited_ms: u64 },
}

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    #[diagnostic(
        code(config::parse),
        help("Configuration must be a JSON object with known fields.")
    )]
    Parse(SmartString),

    #[error("Invalid value {value:?} for {key}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the environment variable or configuration field.")
    )]
    InvalidValue { key: SmartString, value: SmartString },

    #[error("Initial capacity {requested} exceeds maximum {max}")]
    #[diagnostic(
        code(config::capacity_too_large),
        help("The capacity is only a hint; the map grows on demand.")
    )]
    CapacityTooLarge { requested: usize, max: usize },
}

/// Annotation model errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ModelError {
    #[error("Position {offset}+{length} lies outside document of length {document_length}")]
    #[diagnostic(
        code(model::bad_location),
        help("Positions must satisfy offset + length <= document length.")
    )]
    BadLocation {
        offset: usize,
        length: usize,
        document_length: usize,
    },

    #[error("Annotation is not part of the model")]
    #[diagnostic(
        code(model::unknown_annotation),
        help("Add the annotation before modifying its position.")
    )]
    UnknownAnnotation,
}

/// Unified error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("Lock error: {0}")]
    #[diagnostic(transparent)]
    Lock(#[from] LockError),

    #[error("Config error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
}

pub type LockResult<T> = Result<T, LockError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ModelResult<T> = Result<T, ModelError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = LockError::Timeout { waited_ms: 25 };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"error_type\":\"timeout\""));
        assert!(json.contains("25"));
    }

    #[test]
    fn test_unified_conversion() {
        let err: StoreError = ModelError::UnknownAnnotation.into();
        assert!(matches!(err, StoreError::Model(ModelError::UnknownAnnotation)));
        assert_eq!(
            err.to_string(),
            "Model error: Annotation is not part of the model"
        );
    }

    #[test]
    fn test_bad_location_message() {
        let err = ModelError::BadLocation {
            offset: 10,
            length: 5,
            document_length: 12,
        };
        assert_eq!(
            err.to_string(),
            "Position 10+5 lies outside document of length 12"
        );
    }
}
