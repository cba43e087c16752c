//! Command handlers.
//!
//! Handlers return the text to print so they can be exercised without a
//! terminal. `main` decides where it goes and which exit code to use.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Table};
use fieldops_fields::validation::join_list;
use fieldops_fields::{builtin_defaults, FormTemplate, TemplateContext, ValidationEngine, ValidationErrors};
use fieldops_submission::{EngineConfig, FormCaptureState};
use fieldops_timesheet::{compute_day_str, DayHours, WeekPeriod};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Loaded configuration and template directory for one invocation.
pub struct Workspace {
    pub config: EngineConfig,
    pub templates: TemplateContext,
}

impl Workspace {
    /// Load `fieldops.*` config from `dir` and open its template directory,
    /// seeding the built-in templates that are missing.
    pub async fn open(dir: &Path) -> Result<Self> {
        let config = EngineConfig::load(dir)
            .with_context(|| format!("loading configuration from {}", dir.display()))?;
        let templates = TemplateContext::open(config.templates_dir.clone())
            .with_defaults(builtin_defaults()?)
            .build()
            .await
            .with_context(|| {
                format!("opening templates in {}", config.templates_dir.display())
            })?;
        debug!(
            templates = templates.all_templates().len(),
            dir = %config.templates_dir.display(),
            "workspace ready"
        );
        Ok(Self { config, templates })
    }

    fn template(&self, form_type: &str) -> Result<&FormTemplate> {
        self.templates
            .get(form_type)
            .with_context(|| format!("template not found: {form_type}"))
    }
}

/// Outcome of `fieldops validate`.
#[derive(Debug)]
pub struct ValidateReport {
    pub output: String,
    pub errors: ValidationErrors,
}

impl ValidateReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn templates_list(ws: &Workspace, json: bool) -> Result<String> {
    let mut templates: Vec<&FormTemplate> = ws.templates.all_templates().iter().collect();
    templates.sort_by(|a, b| a.form_type.cmp(&b.form_type));

    if json {
        let list: Vec<Value> = templates
            .iter()
            .map(|t| {
                json!({
                    "formType": t.form_type,
                    "title": t.title,
                    "sections": t.sections.len(),
                    "fields": t.field_count(),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&list)?);
    }

    if templates.is_empty() {
        return Ok("No templates found.".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Form Type", "Title", "Sections", "Fields"]);
    for t in templates {
        table.add_row(vec![
            t.form_type.clone(),
            t.title.clone(),
            t.sections.len().to_string(),
            t.field_count().to_string(),
        ]);
    }
    Ok(table.to_string())
}

pub fn templates_show(ws: &Workspace, form_type: &str, json: bool) -> Result<String> {
    let template = ws.template(form_type)?;
    if json {
        return Ok(serde_json::to_string_pretty(template)?);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Section", "Field", "Label", "Type", "Required", "Options"]);
    for section in &template.sections {
        for field in &section.fields {
            table.add_row(vec![
                section.title.clone(),
                field.field_name.clone(),
                field.label.clone(),
                field.field_type.to_string(),
                if field.is_required { "yes" } else { "" }.to_string(),
                field.options().join(", "),
            ]);
        }
    }
    Ok(format!("{} ({})\n{table}", template.title, template.form_type))
}

/// Validate the values in a JSON file against a template.
///
/// The file holds one object of field name to value. Strings pass through,
/// booleans are written as text, arrays become comma-joined lists and `null`
/// is empty. Numbers must be quoted so their text is kept exactly as typed.
pub fn validate(ws: &Workspace, form_type: &str, values_path: &Path, json: bool) -> Result<ValidateReport> {
    let template = ws.template(form_type)?;
    let content = std::fs::read_to_string(values_path)
        .with_context(|| format!("reading {}", values_path.display()))?;
    let raw: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("{} must hold a JSON object", values_path.display()))?;

    let mut state = FormCaptureState::initialize(template.clone());
    for (name, value) in raw {
        let text = value_to_text(&name, value)?;
        state.set_value(&name, text)?;
    }

    let engine = ValidationEngine::new(ws.config.validation_options());
    let errors = engine.validate(state.template(), state.values());

    let output = if json {
        serde_json::to_string_pretty(&json!({
            "formType": form_type,
            "valid": errors.is_empty(),
            "errors": errors,
        }))?
    } else if errors.is_empty() {
        format!("{form_type}: all {} fields valid", template.field_count())
    } else {
        let mut lines = vec![format!("{form_type}: {} field(s) invalid", errors.len())];
        lines.extend(errors.iter().map(|(field, message)| format!("  {field}: {message}")));
        lines.join("\n")
    };

    Ok(ValidateReport { output, errors })
}

fn value_to_text(name: &str, value: Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            bail!("{name}: numbers must be given as strings to keep their exact text, e.g. \"{n}\"")
        }
        Value::Array(items) => {
            let parts = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => bail!("{name}: list items must be strings, got {other}"),
                })
                .collect::<Result<Vec<_>>>()?;
            join_list(parts)
        }
        Value::Object(_) => bail!("{name}: objects are not valid field values"),
    })
}

pub fn hours(clock_in: &str, clock_out: &str, json: bool) -> Result<String> {
    let day = compute_day_str(Some(clock_in), Some(clock_out))?;
    if json {
        return Ok(serde_json::to_string_pretty(&day)?);
    }
    let mut out = format_hours(&day);
    if day.is_short_shift() {
        out.push_str("\nwarning: shift is shorter than the unpaid break");
    }
    Ok(out)
}

fn format_hours(day: &DayHours) -> String {
    format!(
        "total {:.2}h  regular {:.2}h  overtime {:.2}h",
        day.total_hours, day.regular_hours, day.overtime_hours
    )
}

pub fn week(date: NaiveDate, json: bool) -> Result<String> {
    let period = WeekPeriod::for_date(date);
    if json {
        return Ok(serde_json::to_string_pretty(&json!({
            "year": period.year(),
            "week": period.week(),
            "start": period.start(),
            "end": period.end(),
            "days": period.days(),
        }))?);
    }

    let days = period
        .days()
        .iter()
        .map(|d| d.format("%a %Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join("\n  ");
    Ok(format!(
        "{} week {} ({} to {})\n  {days}",
        period.year(),
        period.week(),
        period.start(),
        period.end()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn workspace(temp: &TempDir) -> Workspace {
        Workspace::open(temp.path()).await.unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_templates() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        assert!(temp.path().join("templates").join("job_card.yaml").exists());
        assert!(ws.templates.get("timesheet").is_some());
    }

    #[tokio::test]
    async fn test_templates_list_json() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        let out = templates_list(&ws, true).unwrap();
        let list: Vec<Value> = serde_json::from_str(&out).unwrap();
        let types: Vec<&str> = list.iter().map(|t| t["formType"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["inspection", "job_card", "maintenance_log", "timesheet"]);
    }

    #[tokio::test]
    async fn test_templates_show() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        let out = templates_show(&ws, "job_card", false).unwrap();
        assert!(out.starts_with("Job Card (job_card)"));
        assert!(out.contains("customerSignature"));
        assert!(out.contains("Low, Normal, High, Critical"));
        assert!(templates_show(&ws, "permit", false).is_err());
    }

    #[tokio::test]
    async fn test_validate_reports_errors() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        let values = temp.path().join("values.json");
        std::fs::write(
            &values,
            r#"{"jobNumber": "JC-1", "priority": "urgent", "travelKm": "12.50", "photos": ["a.jpg", "b.jpg"]}"#,
        )
        .unwrap();

        let report = validate(&ws, "job_card", &values, false).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors["priority"], "invalid selection");
        assert!(!report.errors.contains_key("travelKm"));
        assert!(!report.errors.contains_key("photos"));
        assert!(report.output.contains("customer: Customer is required"));
    }

    #[tokio::test]
    async fn test_validate_rejects_bare_numbers() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        let values = temp.path().join("values.json");
        std::fs::write(&values, r#"{"jobNumber": "JC-1", "travelKm": 12.50}"#).unwrap();
        let err = validate(&ws, "job_card", &values, false).unwrap_err();
        assert!(err.to_string().contains("travelKm: numbers must be given as strings"));
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_field() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp).await;
        let values = temp.path().join("values.json");
        std::fs::write(&values, r#"{"colour": "red"}"#).unwrap();
        let err = validate(&ws, "job_card", &values, false).unwrap_err();
        assert!(err.to_string().contains("unknown field: colour"));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text("a", json!(null)).unwrap(), "");
        assert_eq!(value_to_text("a", json!(true)).unwrap(), "true");
        assert_eq!(value_to_text("a", json!("12.50")).unwrap(), "12.50");
        assert!(value_to_text("a", json!(12.50)).is_err());
        assert_eq!(value_to_text("a", json!(["x", "y"])).unwrap(), "x,y");
        assert!(value_to_text("a", json!({"k": 1})).is_err());
        assert!(value_to_text("a", json!([1])).is_err());
    }

    #[test]
    fn test_hours_output() {
        assert_eq!(
            hours("07:00", "19:00", false).unwrap(),
            "total 11.50h  regular 8.00h  overtime 3.50h"
        );
        assert!(hours("09:00", "09:10", false).unwrap().contains("warning"));
        assert!(hours("17:00", "09:00", false).is_err());
        assert!(hours("9am", "17:00", false).is_err());

        let day: DayHours = serde_json::from_str(&hours("09:00", "17:00", true).unwrap()).unwrap();
        assert_eq!(day.total_hours, 7.5);
    }

    #[test]
    fn test_week_output() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let out = week(date, false).unwrap();
        assert!(out.starts_with("2024 week 11 (2024-03-11 to 2024-03-17)"));

        let value: Value = serde_json::from_str(&week(date, true).unwrap()).unwrap();
        assert_eq!(value["week"], 11);
        assert_eq!(value["days"].as_array().unwrap().len(), 7);
    }
}
