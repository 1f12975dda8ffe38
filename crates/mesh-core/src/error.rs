//! Error types for the Mesh core library
//!
//! Validation failures are *not* errors in this sense: a rule or format that
//! rejects a value is recorded on the field and reported through
//! `Field::errors` / `Form::message`. The types here cover the cases that must
//! surface to the caller instead, chiefly misconfigured pipelines.

use thiserror::Error;

use crate::types::StepKind;

/// Main error type for Mesh operations
#[derive(Error, Debug)]
pub enum Error {
    /// Pipeline configuration errors (unknown identifiers, malformed parameters)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        identifier: Option<String>,
    },

    /// A filter could not produce a value.
    ///
    /// Raised by filter functions and caught by the pipeline, which records it
    /// as a validation error under the filter's identifier.
    #[error("Conversion failed in '{identifier}': {message}")]
    Conversion { identifier: String, message: String },

    /// Lookup of a field that was never registered
    #[error("Field not found: {name}")]
    FieldNotFound { name: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error tied to a step identifier
    pub fn configuration(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            identifier: Some(identifier.into()),
        }
    }

    /// Create the error reported for an identifier the registry cannot resolve
    pub fn unknown_identifier(kind: StepKind, identifier: &str) -> Self {
        Error::Configuration {
            message: format!("unknown {} '{}'", kind, identifier),
            identifier: Some(identifier.to_string()),
        }
    }

    /// Create a conversion failure for a filter
    pub fn conversion(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Conversion {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a configuration problem rather than a data problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::configuration("range", "expects 2 parameters");
        assert_eq!(err.to_string(), "Configuration error: expects 2 parameters");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_identifier() {
        let err = Error::unknown_identifier(StepKind::Format, "postcode");
        assert_eq!(err.to_string(), "Configuration error: unknown format 'postcode'");
        match err {
            Error::Configuration { identifier, .. } => {
                assert_eq!(identifier.as_deref(), Some("postcode"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conversion_is_not_configuration() {
        let err = Error::conversion("to_number", "'abc' is not numeric");
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("to_number"));
    }
}
