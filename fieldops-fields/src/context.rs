//! TemplateContext: file-backed source of form templates.
//!
//! Manages form templates as YAML (or JSON) files under a templates
//! directory, one file per form type. Templates are checked on load and
//! indexed by form type for lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{FieldsError, Result};
use crate::types::FormTemplate;

/// File extensions recognized as templates, in the order a new file is named.
const TEMPLATE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Supplies form templates by form type.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Load the template for `form_type`, or fail with `TemplateNotFound`.
    async fn load_template(&self, form_type: &str) -> Result<FormTemplate>;
}

/// A collection of default templates seeded into a templates directory.
///
/// Consumers build this to pass to `TemplateContextBuilder::with_defaults()`.
/// On open, defaults that don't already exist on disk are written.
#[derive(Debug, Clone, Default)]
pub struct TemplateDefaults {
    templates: Vec<FormTemplate>,
}

impl TemplateDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default template.
    pub fn template(mut self, template: FormTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Access the default templates.
    pub fn templates(&self) -> &[FormTemplate] {
        &self.templates
    }
}

/// Builder for `TemplateContext`. Created by `TemplateContext::open()`.
pub struct TemplateContextBuilder {
    root: PathBuf,
    defaults: Option<TemplateDefaults>,
}

impl TemplateContextBuilder {
    /// Provide default templates. Defaults are seeded on first open;
    /// existing templates with the same form type are preserved.
    pub fn with_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Build the context: create the directory, seed defaults, load from disk.
    pub async fn build(self) -> Result<TemplateContext> {
        let root = self.root;
        fs::create_dir_all(&root).await?;

        if let Some(defaults) = self.defaults {
            seed_defaults(&root, &defaults).await?;
        }

        let mut ctx = TemplateContext {
            root,
            templates: Vec::new(),
            index: HashMap::new(),
            sources: HashMap::new(),
        };
        ctx.load_templates().await?;

        debug!(templates = ctx.templates.len(), "template context opened");
        Ok(ctx)
    }
}

/// Seed default templates whose form type has no file on disk yet.
async fn seed_defaults(root: &Path, defaults: &TemplateDefaults) -> Result<()> {
    for template in &defaults.templates {
        template.check()?;
        let existing = TEMPLATE_EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{}.{ext}", template.form_type)))
            .find(|path| path.exists());
        if let Some(path) = existing {
            debug!(?path, "keeping existing template over default");
            continue;
        }
        let path = root.join(format!("{}.{}", template.form_type, TEMPLATE_EXTENSIONS[0]));
        atomic_write(&path, &encode_template(&path, template)?).await?;
        debug!(form_type = %template.form_type, "seeded default template");
    }
    Ok(())
}

/// Context for form templates.
///
/// Owns a directory on disk with the structure:
/// ```text
/// templates/
///   maintenance_log.yaml
///   inspection.yaml
///   site_survey.json
/// ```
pub struct TemplateContext {
    root: PathBuf,
    templates: Vec<FormTemplate>,
    index: HashMap<String, usize>,
    /// File each form type was loaded from or last written to.
    sources: HashMap<String, PathBuf>,
}

impl TemplateContext {
    /// Open or create a templates directory. Returns a builder for optional configuration.
    ///
    /// ```rust,ignore
    /// let ctx = TemplateContext::open(path)
    ///     .with_defaults(builtin_defaults()?)
    ///     .build()
    ///     .await?;
    /// let template = ctx.load_template("inspection").await?;
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> TemplateContextBuilder {
        TemplateContextBuilder {
            root: root.into(),
            defaults: None,
        }
    }

    /// Get a template by form type.
    pub fn get(&self, form_type: &str) -> Option<&FormTemplate> {
        self.index.get(form_type).map(|&i| &self.templates[i])
    }

    /// All loaded templates.
    pub fn all_templates(&self) -> &[FormTemplate] {
        &self.templates
    }

    /// Form types of all loaded templates, sorted.
    pub fn form_types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.index.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Write (create or update) a template and persist it immediately.
    ///
    /// An existing template is rewritten in place, keeping its file name and
    /// format. New templates are written as `<form_type>.yaml`.
    pub async fn write_template(&mut self, template: &FormTemplate) -> Result<()> {
        template.check()?;
        let path = self.template_path(&template.form_type);
        atomic_write(&path, &encode_template(&path, template)?).await?;
        self.sources.insert(template.form_type.clone(), path);

        match self.index.get(&template.form_type) {
            Some(&idx) => self.templates[idx] = template.clone(),
            None => {
                self.index
                    .insert(template.form_type.clone(), self.templates.len());
                self.templates.push(template.clone());
            }
        }
        Ok(())
    }

    /// The root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn template_path(&self, form_type: &str) -> PathBuf {
        match self.sources.get(form_type) {
            Some(path) => path.clone(),
            None => self
                .root
                .join(format!("{form_type}.{}", TEMPLATE_EXTENSIONS[0])),
        }
    }

    async fn load_templates(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        // Stable load order so a duplicate form type resolves the same way every time.
        paths.sort();

        for path in paths {
            let parsed = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => {
                    let content = fs::read_to_string(&path).await?;
                    serde_yaml::from_str::<FormTemplate>(&content).map_err(FieldsError::from)
                }
                Some("json") => {
                    let content = fs::read_to_string(&path).await?;
                    serde_json::from_str::<FormTemplate>(&content).map_err(FieldsError::from)
                }
                _ => continue,
            };
            match parsed.and_then(|t| t.check().map(|_| t)) {
                Ok(template) => {
                    if self.index.contains_key(&template.form_type) {
                        warn!(?path, form_type = %template.form_type, "skipping duplicate template");
                        continue;
                    }
                    self.index
                        .insert(template.form_type.clone(), self.templates.len());
                    self.sources.insert(template.form_type.clone(), path);
                    self.templates.push(template);
                }
                Err(e) => {
                    warn!(?path, %e, "skipping invalid template");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateSource for TemplateContext {
    async fn load_template(&self, form_type: &str) -> Result<FormTemplate> {
        self.get(form_type)
            .cloned()
            .ok_or_else(|| FieldsError::template_not_found(form_type))
    }
}

/// Serialize a template in the format its file extension names.
fn encode_template(path: &Path, template: &FormTemplate) -> Result<Vec<u8>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::to_vec_pretty(template)?),
        _ => Ok(serde_yaml::to_string(template)?.into_bytes()),
    }
}

/// Write to a temp file then rename for atomic persistence.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
