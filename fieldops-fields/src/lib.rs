//! Form template model and validation engine
//!
//! `fieldops-fields` is the schema half of the form engine. It owns the
//! closed set of field kinds, the immutable template model, the file-backed
//! template directory and the pure validation engine. It knows nothing about
//! submissions or their lifecycle; those live in `fieldops-submission`.
//!
//! # Architecture
//!
//! - **Schema-only**: Owns templates and validation rules, not captured values
//! - **YAML on disk**: One `.yaml` (or `.json`) file per form type
//! - **Strings at the boundary**: Every value is a string; parsing happens in validation
//! - **Default seeding**: `with_defaults()` writes built-ins that don't exist, preserves customizations

pub mod context;
pub mod defaults;
pub mod error;
pub mod lookup;
pub mod types;
pub mod validation;

pub use context::{TemplateContext, TemplateContextBuilder, TemplateDefaults, TemplateSource};
pub use defaults::{builtin_defaults, TIMESHEET_FORM_TYPE};
pub use error::{FieldsError, Result};
pub use lookup::{Candidate, DirectoryLookup, StaticDirectory};
pub use types::{DirectoryKind, FieldType, FormField, FormSection, FormTemplate};
pub use validation::{
    FieldValues, ValidationEngine, ValidationErrors, ValidationOptions, DEFAULT_MAX_PHOTOS,
};
