//! Capture state for one in-progress submission.
//!
//! A `FormCaptureState` binds a template to a string value bag, the latest
//! validation errors and the lifecycle status. Values change only through
//! [`FormCaptureState::set_value`], which enforces the template's field set
//! and drops a prior validation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fieldops_fields::{FormTemplate, ValidationErrors, TIMESHEET_FORM_TYPE};
use fieldops_timesheet::{DayHours, TimesheetWeek, WeekPeriod};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::{Result, SubmissionError};
use crate::id::SubmissionId;
use crate::status::LifecycleStatus;

/// Capacity of the field change channel per capture state.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A successful field edit, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field_name: String,
    pub value: String,
}

/// Immutable copy of a submission, the unit of persistence and export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    pub id: SubmissionId,
    pub form_type: String,
    pub values: BTreeMap<String, String>,
    pub status: LifecycleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timesheet: Option<TimesheetWeek>,
    pub captured_at: DateTime<Utc>,
}

impl SubmissionSnapshot {
    /// Weekly hour totals for timesheet submissions.
    pub fn timesheet_summary(&self) -> Option<DayHours> {
        self.timesheet.as_ref().map(TimesheetWeek::summary)
    }
}

/// Live values, errors and status of one submission.
#[derive(Debug)]
pub struct FormCaptureState {
    id: SubmissionId,
    template: Arc<FormTemplate>,
    values: BTreeMap<String, String>,
    errors: ValidationErrors,
    status: LifecycleStatus,
    timesheet: Option<TimesheetWeek>,
    changes: broadcast::Sender<FieldChange>,
}

impl FormCaptureState {
    /// A fresh draft with every field at its kind's default value.
    ///
    /// Timesheet templates also get a week of empty entries for the current week.
    pub fn initialize(template: impl Into<Arc<FormTemplate>>) -> Self {
        let template = template.into();
        let timesheet = (template.form_type == TIMESHEET_FORM_TYPE)
            .then(|| TimesheetWeek::new(WeekPeriod::for_date(Utc::now().date_naive())));
        Self::build(SubmissionId::new(), template, timesheet)
    }

    /// Rebuild a capture state from a stored snapshot.
    ///
    /// Fields missing from the snapshot take their defaults; snapshot keys the
    /// template doesn't declare are rejected.
    pub fn restore(
        template: impl Into<Arc<FormTemplate>>,
        snapshot: SubmissionSnapshot,
    ) -> Result<Self> {
        let template = template.into();
        if snapshot.form_type != template.form_type {
            return Err(SubmissionError::FormTypeMismatch {
                expected: template.form_type.clone(),
                actual: snapshot.form_type,
            });
        }
        if let Some(unknown) = snapshot.values.keys().find(|k| !template.has_field(k)) {
            return Err(SubmissionError::unknown_field(unknown.as_str()));
        }

        let mut state = Self::build(snapshot.id, template, snapshot.timesheet);
        state.values.extend(snapshot.values);
        state.status = snapshot.status;
        Ok(state)
    }

    fn build(
        id: SubmissionId,
        template: Arc<FormTemplate>,
        timesheet: Option<TimesheetWeek>,
    ) -> Self {
        let values = template
            .fields_in_order()
            .map(|f| (f.field_name.clone(), f.field_type.default_value().to_string()))
            .collect();
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            id,
            template,
            values,
            errors: ValidationErrors::new(),
            status: LifecycleStatus::Draft,
            timesheet,
            changes,
        }
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, field_name: &str) -> Option<&str> {
        self.values.get(field_name).map(String::as_str)
    }

    /// Errors from the most recent validation, cleared per field on edit.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn status(&self) -> &LifecycleStatus {
        &self.status
    }

    pub fn timesheet(&self) -> Option<&TimesheetWeek> {
        self.timesheet.as_ref()
    }

    /// Subscribe to successful field edits.
    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.changes.subscribe()
    }

    /// Overwrite one field's value.
    ///
    /// Clears that field's error and demotes `Validated` back to `Draft`.
    pub fn set_value(&mut self, field_name: &str, value: impl Into<String>) -> Result<()> {
        if !self.template.has_field(field_name) {
            return Err(SubmissionError::unknown_field(field_name));
        }
        self.ensure_editable()?;

        let value = value.into();
        self.values.insert(field_name.to_string(), value.clone());
        self.errors.shift_remove(field_name);
        self.invalidate();
        trace!(id = %self.id, field = field_name, "field value set");

        let _ = self.changes.send(FieldChange {
            field_name: field_name.to_string(),
            value,
        });
        Ok(())
    }

    /// Apply several edits in order, stopping at the first failure.
    pub fn set_values<I, K, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        values
            .into_iter()
            .try_for_each(|(k, v)| self.set_value(k.as_ref(), v))
    }

    /// Mutable access to the timesheet week for editing entries.
    ///
    /// Taking the week counts as an edit: a validated submission returns to draft.
    pub fn timesheet_mut(&mut self) -> Result<&mut TimesheetWeek> {
        if self.timesheet.is_none() {
            return Err(SubmissionError::NoTimesheet {
                form_type: self.template.form_type.clone(),
            });
        }
        self.ensure_editable()?;
        self.invalidate();
        self.timesheet.as_mut().ok_or_else(|| SubmissionError::NoTimesheet {
            form_type: self.template.form_type.clone(),
        })
    }

    /// Replace the timesheet with seven empty entries for `period`.
    pub fn select_week(&mut self, period: WeekPeriod) -> Result<()> {
        *self.timesheet_mut()? = TimesheetWeek::new(period);
        Ok(())
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            id: self.id,
            form_type: self.template.form_type.clone(),
            values: self.values.clone(),
            status: self.status.clone(),
            timesheet: self.timesheet.clone(),
            captured_at: Utc::now(),
        }
    }

    pub(crate) fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    pub(crate) fn set_status(&mut self, status: LifecycleStatus) {
        self.status = status;
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(SubmissionError::NotEditable {
                status: self.status.name().to_string(),
            })
        }
    }

    fn invalidate(&mut self) {
        if self.status == LifecycleStatus::Validated {
            self.status = LifecycleStatus::Draft;
        }
    }
}
