//! Directory lookups for reference fields.
//!
//! Equipment, site and employee pickers are populated from external
//! directories. The engine never checks membership during validation; these
//! lookups only feed selection lists.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{DirectoryKind, FormField};

/// One selectable directory entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub display_label: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_label: display_label.into(),
        }
    }
}

/// Source of picker candidates for reference fields.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Ordered candidates for a directory.
    async fn list_candidates(&self, kind: DirectoryKind) -> Vec<Candidate>;

    /// Candidates for a reference field, or nothing for other field kinds.
    async fn candidates_for(&self, field: &FormField) -> Vec<Candidate> {
        match field.field_type.directory_kind() {
            Some(kind) => self.list_candidates(kind).await,
            None => Vec::new(),
        }
    }
}

/// In-memory directory, e.g. an offline cache of the last sync.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<DirectoryKind, Vec<Candidate>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate to a directory.
    pub fn with(mut self, kind: DirectoryKind, candidate: Candidate) -> Self {
        self.entries.entry(kind).or_default().push(candidate);
        self
    }

    /// Replace a directory's candidates.
    pub fn set(&mut self, kind: DirectoryKind, candidates: Vec<Candidate>) {
        self.entries.insert(kind, candidates);
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn list_candidates(&self, kind: DirectoryKind) -> Vec<Candidate> {
        self.entries.get(&kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    fn directory() -> StaticDirectory {
        StaticDirectory::new()
            .with(DirectoryKind::Equipment, Candidate::new("P-1", "Pump 1"))
            .with(DirectoryKind::Equipment, Candidate::new("C-7", "Compressor 7"))
            .with(DirectoryKind::Site, Candidate::new("S-1", "North Yard"))
    }

    #[tokio::test]
    async fn lists_in_insertion_order() {
        let ids: Vec<_> = directory()
            .list_candidates(DirectoryKind::Equipment)
            .await
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["P-1", "C-7"]);
    }

    #[test]
    fn unknown_directory_is_empty() {
        let candidates = tokio_test::block_on(directory().list_candidates(DirectoryKind::Employee));
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn candidates_for_field() {
        let dir = directory();
        let site = FormField::new("site", "Site", FieldType::SiteRef);
        assert_eq!(dir.candidates_for(&site).await.len(), 1);
        let text = FormField::new("notes", "Notes", FieldType::Text);
        assert!(dir.candidates_for(&text).await.is_empty());
    }

    #[tokio::test]
    async fn set_replaces_directory() {
        let mut dir = directory();
        dir.set(DirectoryKind::Site, vec![]);
        assert!(dir.list_candidates(DirectoryKind::Site).await.is_empty());
    }
}
