//! Error types for orca-gate
//!
//! One `thiserror` enum per subsystem: configuration, the resource control
//! registry, and proxied response bodies.
//! Access denial is not an error here: it is a decision carried by
//! [`AccessDecision`](crate::access_control::AccessDecision).

use crate::access_control::ResourceKind;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Resource control registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate resource control for {kind} '{resource_id}'")]
    Duplicate {
        kind: ResourceKind,
        resource_id: String,
    },

    #[error("Resource control has an empty identifier (kind {kind})")]
    EmptyIdentifier { kind: ResourceKind },

    #[error("Unsupported registry file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Failed to read registry file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Errors raised while reading or rewriting a proxied response body
#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Invalid JSON in upstream response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected upstream response shape: expected {expected}, got {actual}")]
    UnexpectedShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Failed to serialize rewritten response: {0}")]
    Serialization(serde_json::Error),

    #[error("Invalid HTTP header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

/// Result type alias for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Result type alias for response operations
pub type ResponseResult<T> = std::result::Result<T, ResponseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_kind_and_id() {
        let err = RegistryError::Duplicate {
            kind: ResourceKind::Stack,
            resource_id: "st1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("stack"));
        assert!(msg.contains("st1"));
    }

    #[test]
    fn test_invalid_json_converts_into_parse_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ResponseError = parse.into();
        assert!(matches!(err, ResponseError::Parse(_)));
    }

    #[test]
    fn test_unexpected_shape_message() {
        let err = ResponseError::UnexpectedShape {
            expected: "array",
            actual: "object",
        };
        assert_eq!(
            err.to_string(),
            "Unexpected upstream response shape: expected array, got object"
        );
    }
}
