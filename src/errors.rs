//! Custom error types for the threatloom analysis core.
//!
//! Provides a structured error hierarchy for model integrity problems,
//! rule failures and the surrounding I/O of the binary.

use std::path::PathBuf;

/// The main error type for threatloom operations.
#[derive(Debug, thiserror::Error)]
pub enum ThreatloomError {
    /// A referenced id does not exist in the model
    #[error("{kind} '{id}' referenced by '{referenced_by}' does not exist")]
    ModelReference {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },

    /// Two entities share the same id
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// An id contains the character that joins synthetic risk ids
    #[error("{kind} id '{id}' must not contain '{reserved}'")]
    ReservedIdCharacter {
        kind: &'static str,
        id: String,
        reserved: char,
    },

    /// Broken containment of trust boundaries or technical assets
    #[error("invalid nesting at '{id}': {message}")]
    InvalidNesting { id: String, message: String },

    /// A risk rule failed or produced inconsistent findings
    #[error("risk rule '{rule}' failed: {message}")]
    RuleEvaluation { rule: String, message: String },

    /// Evaluation was cancelled between two rules
    #[error("rule evaluation cancelled")]
    Cancelled,

    /// Thread pool initialization error
    #[error("Failed to initialize thread pool: {0}")]
    ThreadPool(String),

    /// I/O error (model read, risk export)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ThreatloomError
pub type ThreatloomResult<T> = Result<T, ThreatloomError>;

impl ThreatloomError {
    /// Create a dangling-reference error
    pub fn model_reference(
        kind: &'static str,
        id: impl Into<String>,
        referenced_by: impl Into<String>,
    ) -> Self {
        Self::ModelReference {
            kind,
            id: id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create a nesting error for the given entity
    pub fn nesting(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNesting {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a rule evaluation error
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleEvaluation {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for ThreatloomError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_reference_display() {
        let err = ThreatloomError::model_reference("data asset", "pii", "web-app");
        let text = err.to_string();
        assert!(text.contains("'pii'"));
        assert!(text.contains("'web-app'"));
    }

    #[test]
    fn test_rule_error_display() {
        let err = ThreatloomError::rule("unencrypted-asset", "boom");
        assert_eq!(err.to_string(), "risk rule 'unencrypted-asset' failed: boom");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ThreatloomError = io_err.into();
        assert!(matches!(err, ThreatloomError::Io { path: None, .. }));
    }
}
