//! Error types for the form template model

use thiserror::Error;

use crate::types::FieldType;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur loading or checking form templates
#[derive(Debug, Error)]
pub enum FieldsError {
    /// No template is registered for the form type
    #[error("template not found: {form_type}")]
    TemplateNotFound { form_type: String },

    /// Two fields in one template share a name
    #[error("duplicate field name '{name}' in template {form_type}")]
    DuplicateFieldName { form_type: String, name: String },

    /// Options present on a kind that takes none, or missing on Radio/Dropdown
    #[error("field '{field}' of type {field_type} has invalid options")]
    InvalidOptions {
        field: String,
        field_type: FieldType,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldsError {
    /// Create a template-not-found error
    pub fn template_not_found(form_type: impl Into<String>) -> Self {
        Self::TemplateNotFound {
            form_type: form_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::template_not_found("permit");
        assert_eq!(err.to_string(), "template not found: permit");
    }

    #[test]
    fn test_duplicate_field_error() {
        let err = FieldsError::DuplicateFieldName {
            form_type: "inspection".into(),
            name: "date".into(),
        };
        assert!(err.to_string().contains("date"));
        assert!(err.to_string().contains("inspection"));
    }
}
