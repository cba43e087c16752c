//! Validation engine for captured form values.
//!
//! Validation is a pure function of a template and a string value bag. Every
//! field is checked in template order and at most one message is reported per
//! field: the required check runs first, then the type-specific check. The
//! engine never fails; an empty error map means the values are valid.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{FieldType, FormField, FormTemplate};

/// Canonical date format: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical clock time format: `HH:MM`.
pub const TIME_FORMAT: &str = "%H:%M";

/// Default maximum number of photos per Photo field.
pub const DEFAULT_MAX_PHOTOS: usize = 5;

/// Message reported for a Radio/Dropdown value outside its options.
pub const INVALID_SELECTION: &str = "invalid selection";

/// Field name → error message, in template field order.
pub type ValidationErrors = IndexMap<String, String>;

/// Read access to a captured value bag.
pub trait FieldValues {
    /// The raw value for a field, if one was captured.
    fn value(&self, field_name: &str) -> Option<&str>;
}

impl FieldValues for HashMap<String, String> {
    fn value(&self, field_name: &str) -> Option<&str> {
        self.get(field_name).map(String::as_str)
    }
}

impl FieldValues for BTreeMap<String, String> {
    fn value(&self, field_name: &str) -> Option<&str> {
        self.get(field_name).map(String::as_str)
    }
}

impl FieldValues for IndexMap<String, String> {
    fn value(&self, field_name: &str) -> Option<&str> {
        self.get(field_name).map(String::as_str)
    }
}

/// Tunables for the validation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Maximum number of comma-separated locators in a Photo field.
    pub max_photos: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }
}

/// Validates captured values against a form template.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    options: ValidationOptions,
}

impl ValidationEngine {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate every field of `template` against `values`.
    ///
    /// Fields with no captured value are treated as empty.
    pub fn validate<V>(&self, template: &FormTemplate, values: &V) -> ValidationErrors
    where
        V: FieldValues + ?Sized,
    {
        let mut errors = ValidationErrors::new();
        for field in template.fields_in_order() {
            let value = values.value(&field.field_name).unwrap_or("");
            if let Some(message) = self.validate_field(field, value) {
                errors.insert(field.field_name.clone(), message);
            }
        }
        trace!(
            form_type = %template.form_type,
            errors = errors.len(),
            "validated form values"
        );
        errors
    }

    /// Validate a single value. Returns the first failing rule's message.
    pub fn validate_field(&self, field: &FormField, value: &str) -> Option<String> {
        if is_empty_value(field.field_type, value) {
            return field
                .is_required
                .then(|| format!("{} is required", field.label));
        }
        self.check_type(field, value)
    }

    fn check_type(&self, field: &FormField, value: &str) -> Option<String> {
        let label = &field.label;
        let trimmed = value.trim();
        match field.field_type {
            FieldType::Text
            | FieldType::MultilineText
            | FieldType::Signature
            | FieldType::Barcode => None,
            FieldType::Number => (!is_number(trimmed)).then(|| format!("{label} must be a number")),
            FieldType::Integer => trimmed
                .parse::<i64>()
                .is_err()
                .then(|| format!("{label} must be a whole number")),
            FieldType::Date => parse_date(trimmed)
                .is_none()
                .then(|| format!("{label} must be a date (YYYY-MM-DD)")),
            FieldType::Time => parse_time(trimmed)
                .is_none()
                .then(|| format!("{label} must be a time (HH:MM)")),
            FieldType::DateTime => parse_date_time(trimmed)
                .is_none()
                .then(|| format!("{label} must be an ISO-8601 date and time")),
            FieldType::Radio | FieldType::Dropdown => (!field.options().iter().any(|o| o == value))
                .then(|| INVALID_SELECTION.to_string()),
            FieldType::Checkbox | FieldType::Boolean => (value != "true" && value != "false")
                .then(|| format!("{label} must be true or false")),
            FieldType::Photo => {
                let count = split_list(value).count();
                (count > self.options.max_photos).then(|| {
                    format!(
                        "{label} allows at most {} photos",
                        self.options.max_photos
                    )
                })
            }
            FieldType::EquipmentRef | FieldType::SiteRef | FieldType::EmployeeRef => {
                (value != trimmed || value.contains(','))
                    .then(|| format!("{label} must reference a single entry"))
            }
        }
    }
}

/// Whether a value counts as empty for the required check.
///
/// Whitespace-only strings are empty; a Photo list is empty when every
/// comma-separated segment is blank.
pub fn is_empty_value(field_type: FieldType, value: &str) -> bool {
    if field_type.is_list() {
        split_list(value).next().is_none()
    } else {
        value.trim().is_empty()
    }
}

/// Split a comma-joined list value into its non-blank segments.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Join list segments into the wire encoding.
pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn is_number(value: &str) -> bool {
    value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Parse an `HH:MM` clock time.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

/// Parse an ISO-8601 combined date and time, with or without an offset.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
