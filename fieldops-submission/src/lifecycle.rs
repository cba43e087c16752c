//! Submission lifecycle: validate, persist, export.
//!
//! The manager holds the collaborators and is shared across submissions; each
//! submission's [`FormCaptureState`] is passed in by `&mut`. Status changes
//! happen only after a collaborator call resolves, so dropping a pending
//! `persist` or `export` future leaves the submission where it was.

use std::sync::Arc;

use fieldops_fields::{FormTemplate, ValidationEngine};
use tracing::{debug, info, warn};

use crate::capture::FormCaptureState;
use crate::config::EngineConfig;
use crate::error::{Result, SubmissionError};
use crate::export::{CsvRenderer, ExportFormat, ExportHandle, ExportRenderer};
use crate::id::SubmissionId;
use crate::status::LifecycleStatus;
use crate::store::{FileStore, SubmissionStore};

/// Drives submissions through `Draft → Validated → Persisted → Exported`.
pub struct SubmissionLifecycle<S, R> {
    store: S,
    renderer: R,
    engine: ValidationEngine,
}

impl SubmissionLifecycle<FileStore, CsvRenderer> {
    /// File store and CSV renderer rooted at the configured directories.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            FileStore::new(config.store_dir.clone()),
            CsvRenderer::new(config.export_dir.clone()),
            ValidationEngine::new(config.validation_options()),
        )
    }
}

impl<S, R> SubmissionLifecycle<S, R>
where
    S: SubmissionStore,
    R: ExportRenderer,
{
    pub fn new(store: S, renderer: R, engine: ValidationEngine) -> Self {
        Self {
            store,
            renderer,
            engine,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Validate the current values and record the errors on the submission.
    ///
    /// Success moves to `Validated`. On failure a draft stays `Draft`, a failed
    /// submission stays `Failed`, and the error map is returned.
    pub fn validate(&self, state: &mut FormCaptureState) -> Result<()> {
        if !state.status().is_editable() {
            return Err(SubmissionError::invalid_transition(
                state.status().name(),
                "validate",
            ));
        }

        let errors = self.engine.validate(state.template(), state.values());
        state.set_errors(errors.clone());

        if !errors.is_empty() {
            debug!(id = %state.id(), errors = errors.len(), "validation failed");
            self.fall_back_to_draft(state);
            return Err(SubmissionError::ValidationFailed { errors });
        }

        let timesheet = state.timesheet().map_or(Ok(()), |week| week.check());
        if let Err(e) = timesheet {
            debug!(id = %state.id(), error = %e, "timesheet has an invalid entry");
            self.fall_back_to_draft(state);
            return Err(e.into());
        }

        state.set_status(LifecycleStatus::Validated);
        info!(id = %state.id(), form_type = %state.template().form_type, "submission validated");
        Ok(())
    }

    /// Save a validated submission. Re-persisting overwrites the stored copy.
    pub async fn persist(&self, state: &mut FormCaptureState) -> Result<SubmissionId> {
        match state.status() {
            LifecycleStatus::Validated | LifecycleStatus::Persisted => {}
            LifecycleStatus::Exported => {
                return Err(SubmissionError::invalid_transition("exported", "persist"));
            }
            other => {
                return Err(SubmissionError::NotValidated {
                    status: other.name().to_string(),
                });
            }
        }

        let id = state.id();
        let mut snapshot = state.snapshot();
        snapshot.status = LifecycleStatus::Persisted;

        match self.store.save(id, &snapshot).await {
            Ok(()) => {
                state.set_status(LifecycleStatus::Persisted);
                info!(%id, "submission persisted");
                Ok(id)
            }
            Err(e) => {
                warn!(%id, error = %e, "persist failed");
                state.set_status(LifecycleStatus::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Render a persisted submission. Exporting again is allowed.
    pub async fn export(
        &self,
        state: &mut FormCaptureState,
        format: ExportFormat,
    ) -> Result<ExportHandle> {
        if !state.status().can_export() {
            return Err(SubmissionError::NotPersisted {
                status: state.status().name().to_string(),
            });
        }

        let id = state.id();
        let snapshot = state.snapshot();

        match self.renderer.render(&snapshot, format).await {
            Ok(handle) => {
                state.set_status(LifecycleStatus::Exported);
                info!(%id, %format, path = %handle.path.display(), "submission exported");
                Ok(handle)
            }
            Err(e) => {
                warn!(%id, %format, error = %e, "export failed");
                state.set_status(LifecycleStatus::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Load a stored submission and bind it to its template.
    pub async fn open(
        &self,
        template: impl Into<Arc<FormTemplate>>,
        id: SubmissionId,
    ) -> Result<FormCaptureState> {
        let snapshot = self.store.load(id).await?;
        let state = FormCaptureState::restore(template, snapshot)?;
        debug!(%id, status = %state.status(), "opened stored submission");
        Ok(state)
    }

    fn fall_back_to_draft(&self, state: &mut FormCaptureState) {
        if !state.status().is_failed() {
            state.set_status(LifecycleStatus::Draft);
        }
    }
}
