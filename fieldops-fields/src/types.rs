//! Core field and template types for the form engine.
//!
//! All types serialize to/from YAML and JSON via serde. A template is an
//! ordered list of sections, each an ordered list of typed fields. Field
//! values never appear here; they live in the capture state as strings.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FieldsError, Result};

/// The kind of a form field. Determines the shape a valid value takes.
///
/// Values are always transported as strings. List-valued kinds (`Photo`)
/// are comma-joined; boolean kinds use the literals `"true"` / `"false"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    MultilineText,
    Number,
    Integer,
    Date,
    Time,
    DateTime,
    Checkbox,
    Boolean,
    Radio,
    Dropdown,
    /// Locator of a captured signature image.
    Signature,
    /// Comma-joined photo locators.
    Photo,
    Barcode,
    EquipmentRef,
    SiteRef,
    EmployeeRef,
}

impl FieldType {
    /// Every supported field kind, in declaration order.
    pub const ALL: [FieldType; 17] = [
        FieldType::Text,
        FieldType::MultilineText,
        FieldType::Number,
        FieldType::Integer,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Checkbox,
        FieldType::Boolean,
        FieldType::Radio,
        FieldType::Dropdown,
        FieldType::Signature,
        FieldType::Photo,
        FieldType::Barcode,
        FieldType::EquipmentRef,
        FieldType::SiteRef,
        FieldType::EmployeeRef,
    ];

    /// Whether this kind selects from a fixed list of options.
    pub fn requires_options(self) -> bool {
        matches!(self, FieldType::Radio | FieldType::Dropdown)
    }

    /// Whether values are the literals `"true"` / `"false"`.
    pub fn is_boolean(self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Boolean)
    }

    /// Whether values are comma-joined lists.
    pub fn is_list(self) -> bool {
        matches!(self, FieldType::Photo)
    }

    /// The external directory a reference field points into, if any.
    pub fn directory_kind(self) -> Option<DirectoryKind> {
        match self {
            FieldType::EquipmentRef => Some(DirectoryKind::Equipment),
            FieldType::SiteRef => Some(DirectoryKind::Site),
            FieldType::EmployeeRef => Some(DirectoryKind::Employee),
            _ => None,
        }
    }

    /// The value a freshly initialized capture state holds for this kind.
    pub fn default_value(self) -> &'static str {
        if self.is_boolean() {
            "false"
        } else {
            ""
        }
    }

    /// The camelCase name used in template files.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::MultilineText => "multilineText",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "dateTime",
            FieldType::Checkbox => "checkbox",
            FieldType::Boolean => "boolean",
            FieldType::Radio => "radio",
            FieldType::Dropdown => "dropdown",
            FieldType::Signature => "signature",
            FieldType::Photo => "photo",
            FieldType::Barcode => "barcode",
            FieldType::EquipmentRef => "equipmentRef",
            FieldType::SiteRef => "siteRef",
            FieldType::EmployeeRef => "employeeRef",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Directories that reference fields resolve against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DirectoryKind {
    Equipment,
    Site,
    Employee,
}

/// A single field in a form template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_name: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Ordered choices; present exactly for Radio and Dropdown fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FormField {
    /// Create an optional field with no placeholder or options.
    pub fn new(field_name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            field_type,
            is_required: false,
            placeholder: None,
            options: None,
        }
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Set the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the selectable options.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Options as a slice; empty for kinds without options.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Check the options invariant for this field.
    fn check_options(&self) -> Result<()> {
        let has_options = self.options.as_ref().is_some_and(|o| !o.is_empty());
        if self.field_type.requires_options() != has_options {
            return Err(FieldsError::InvalidOptions {
                field: self.field_name.clone(),
                field_type: self.field_type,
            });
        }
        Ok(())
    }
}

/// A titled group of fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSection {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field to the section.
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A form template, the immutable schema for one kind of submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    pub form_type: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

impl FormTemplate {
    pub fn new(form_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            form_type: form_type.into(),
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section to the template.
    pub fn section(mut self, section: FormSection) -> Self {
        self.sections.push(section);
        self
    }

    /// All fields across sections, in template order.
    pub fn fields_in_order(&self) -> impl Iterator<Item = &FormField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Look up a field by its name.
    pub fn field_by_name(&self, name: &str) -> Option<&FormField> {
        self.fields_in_order().find(|f| f.field_name == name)
    }

    /// Whether the template declares a field with this name.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_by_name(name).is_some()
    }

    /// Number of fields across all sections.
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    /// Enforce template invariants: unique field names across sections and
    /// options present exactly for Radio/Dropdown fields.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in self.fields_in_order() {
            if !seen.insert(field.field_name.as_str()) {
                return Err(FieldsError::DuplicateFieldName {
                    form_type: self.form_type.clone(),
                    name: field.field_name.clone(),
                });
            }
            field.check_options()?;
        }
        Ok(())
    }
}
