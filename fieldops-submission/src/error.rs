//! Error types for submissions

use fieldops_fields::{FieldsError, ValidationErrors};
use fieldops_timesheet::TimesheetError;
use thiserror::Error;

/// Result type for submission operations
pub type Result<T> = std::result::Result<T, SubmissionError>;

/// Errors that can occur editing, validating, storing or exporting a submission
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Field name not declared by the bound template
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// Edit attempted after the submission was stored
    #[error("submission is {status} and can no longer be edited")]
    NotEditable { status: String },

    /// One or more fields failed validation
    #[error("validation failed for {} field(s)", .errors.len())]
    ValidationFailed { errors: ValidationErrors },

    /// Persist attempted before a successful validation
    #[error("submission is {status}, validate before persisting")]
    NotValidated { status: String },

    /// Export attempted before the submission was persisted
    #[error("submission is {status}, persist before exporting")]
    NotPersisted { status: String },

    /// Lifecycle action not allowed from the current state
    #[error("cannot {action} a submission that is {from}")]
    InvalidTransition { from: String, action: String },

    /// Snapshot belongs to another form type
    #[error("snapshot is a {actual} submission, expected {expected}")]
    FormTypeMismatch { expected: String, actual: String },

    /// Timesheet operation on a submission without a timesheet
    #[error("{form_type} submissions have no timesheet")]
    NoTimesheet { form_type: String },

    /// No stored submission with this id
    #[error("submission not found: {id}")]
    NotFound { id: String },

    /// Storage backend failure other than IO
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Export renderer failure
    #[error("render error: {message}")]
    Render { message: String },

    /// Invalid engine configuration value
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Template model error
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// Timesheet computation error
    #[error(transparent)]
    Timesheet(#[from] TimesheetError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SubmissionError {
    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }

    /// Check if this is a collaborator failure the host may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage { .. } | Self::Render { .. })
    }

    /// The per-field validation messages, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::ValidationFailed { errors } => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubmissionError::unknown_field("colour");
        assert_eq!(err.to_string(), "unknown field: colour");

        let err = SubmissionError::NotPersisted {
            status: "draft".into(),
        };
        assert_eq!(err.to_string(), "submission is draft, persist before exporting");
    }

    #[test]
    fn test_validation_failed_counts_fields() {
        let mut errors = ValidationErrors::new();
        errors.insert("a".into(), "A is required".into());
        errors.insert("b".into(), "B must be a number".into());
        let err = SubmissionError::ValidationFailed { errors };
        assert_eq!(err.to_string(), "validation failed for 2 field(s)");
        assert_eq!(err.validation_errors().unwrap().len(), 2);
    }

    #[test]
    fn test_retryable() {
        assert!(SubmissionError::render("printer on fire").is_retryable());
        assert!(SubmissionError::storage("quota").is_retryable());
        assert!(SubmissionError::Io(std::io::Error::other("disk")).is_retryable());
        assert!(!SubmissionError::unknown_field("x").is_retryable());
        assert!(!SubmissionError::NotPersisted {
            status: "draft".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_wraps_lower_errors() {
        let err: SubmissionError = FieldsError::template_not_found("permit").into();
        assert_eq!(err.to_string(), "template not found: permit");
    }
}
