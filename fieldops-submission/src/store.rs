//! Durable storage for submission snapshots.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::capture::SubmissionSnapshot;
use crate::error::{Result, SubmissionError};
use crate::id::SubmissionId;

/// Storage collaborator for the submission lifecycle.
///
/// Saving under an existing id replaces the earlier snapshot, so a retried
/// persist never produces a duplicate.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, id: SubmissionId, snapshot: &SubmissionSnapshot) -> Result<()>;

    async fn load(&self, id: SubmissionId) -> Result<SubmissionSnapshot>;

    /// Ids of every stored submission, oldest first.
    async fn list_ids(&self) -> Result<Vec<SubmissionId>>;
}

/// File-backed store with one JSON document per submission.
///
/// ```text
/// submissions/
///   01HV3K8Z9Q2M4N6P8R0S2T4V6W.json
///   01HV3K9A1B3C5D7E9F1G3H5J7K.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the JSON document for a submission.
    pub fn snapshot_path(&self, id: SubmissionId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SubmissionStore for FileStore {
    async fn save(&self, id: SubmissionId, snapshot: &SubmissionSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let path = self.snapshot_path(id);
        atomic_write(&path, &json).await?;
        debug!(%id, path = %path.display(), "saved submission");
        Ok(())
    }

    async fn load(&self, id: SubmissionId) -> Result<SubmissionSnapshot> {
        let path = self.snapshot_path(id);
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SubmissionError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: SubmissionSnapshot = serde_json::from_slice(&content)?;
        if snapshot.id != id {
            return Err(SubmissionError::storage(format!(
                "{} holds submission {}",
                path.display(),
                snapshot.id
            )));
        }
        Ok(snapshot)
    }

    async fn list_ids(&self) -> Result<Vec<SubmissionId>> {
        let mut ids = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<SubmissionId>() {
                Ok(id) => ids.push(id),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unrecognised file"),
            }
        }

        // ULIDs sort by creation time
        ids.sort();
        Ok(ids)
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}
