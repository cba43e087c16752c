//! Submission lifecycle status.

use serde::{Deserialize, Serialize};

/// Progress of a submission from first edit to export.
///
/// ```text
/// Draft --validate--> Validated --persist--> Persisted --export--> Exported
///   ^                    |
///   +------ edit --------+
/// ```
///
/// A failed persist or export moves to `Failed`; only a fresh validate leaves it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LifecycleStatus {
    #[default]
    Draft,
    Validated,
    Persisted,
    Exported,
    Failed {
        reason: String,
    },
}

impl LifecycleStatus {
    /// Short lowercase name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleStatus::Draft => "draft",
            LifecycleStatus::Validated => "validated",
            LifecycleStatus::Persisted => "persisted",
            LifecycleStatus::Exported => "exported",
            LifecycleStatus::Failed { .. } => "failed",
        }
    }

    /// Whether field values may still change.
    pub fn is_editable(&self) -> bool {
        !matches!(self, LifecycleStatus::Persisted | LifecycleStatus::Exported)
    }

    /// Whether the submission has been stored and may be rendered.
    pub fn can_export(&self) -> bool {
        matches!(self, LifecycleStatus::Persisted | LifecycleStatus::Exported)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LifecycleStatus::Failed { .. })
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleStatus::Failed { reason } => write!(f, "failed: {reason}"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editability() {
        assert!(LifecycleStatus::Draft.is_editable());
        assert!(LifecycleStatus::Validated.is_editable());
        assert!(LifecycleStatus::Failed { reason: "x".into() }.is_editable());
        assert!(!LifecycleStatus::Persisted.is_editable());
        assert!(!LifecycleStatus::Exported.is_editable());
    }

    #[test]
    fn exportability() {
        assert!(!LifecycleStatus::Draft.can_export());
        assert!(!LifecycleStatus::Validated.can_export());
        assert!(LifecycleStatus::Persisted.can_export());
        assert!(LifecycleStatus::Exported.can_export());
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(LifecycleStatus::Failed {
            reason: "disk full".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "disk full");

        let parsed: LifecycleStatus = serde_json::from_str(r#"{"state":"persisted"}"#).unwrap();
        assert_eq!(parsed, LifecycleStatus::Persisted);
    }

    #[test]
    fn display() {
        assert_eq!(LifecycleStatus::Validated.to_string(), "validated");
        assert_eq!(
            LifecycleStatus::Failed { reason: "boom".into() }.to_string(),
            "failed: boom"
        );
    }
}
