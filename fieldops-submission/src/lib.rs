//! Submission capture and lifecycle
//!
//! `fieldops-submission` holds the mutable half of the form engine: the live
//! capture state bound to a template, and the lifecycle manager that moves a
//! submission from draft to a stored, exported record.
//!
//! # Architecture
//!
//! - **Explicit state**: A `FormCaptureState` is an ordinary value owned by the caller
//! - **Collaborators behind traits**: `SubmissionStore` and `ExportRenderer` are async traits
//! - **File-backed defaults**: `FileStore` keeps one JSON document per submission, `CsvRenderer` writes CSV
//! - **Layered config**: `EngineConfig` merges defaults, `fieldops.*` files and `FIELDOPS_*` env vars
//!
//! ```rust,ignore
//! let config = EngineConfig::load(Path::new("."))?;
//! let lifecycle = SubmissionLifecycle::from_config(&config);
//!
//! let mut state = FormCaptureState::initialize(template);
//! state.set_value("jobNumber", "JC-1042")?;
//! lifecycle.validate(&mut state)?;
//! lifecycle.persist(&mut state).await?;
//! lifecycle.export(&mut state, ExportFormat::Csv).await?;
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod id;
pub mod lifecycle;
pub mod status;
pub mod store;

pub use capture::{FieldChange, FormCaptureState, SubmissionSnapshot};
pub use config::{EngineConfig, CONFIG_FILE_STEM, ENV_PREFIX};
pub use error::{Result, SubmissionError};
pub use export::{render_csv, CsvRenderer, ExportFormat, ExportHandle, ExportRenderer};
pub use id::SubmissionId;
pub use lifecycle::SubmissionLifecycle;
pub use status::LifecycleStatus;
pub use store::{FileStore, SubmissionStore};
