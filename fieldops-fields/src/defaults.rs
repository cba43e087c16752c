//! Built-in form templates.
//!
//! `builtin_defaults()` provides the templates every installation starts
//! with. They are passed to `TemplateContext::open().with_defaults()` so new
//! built-ins appear on upgrade while customized files on disk are kept.

use crate::context::TemplateDefaults;
use crate::error::Result;
use crate::types::FormTemplate;

/// Form type of the weekly timesheet template.
pub const TIMESHEET_FORM_TYPE: &str = "timesheet";

const MAINTENANCE_LOG_YAML: &str = include_str!("../builtin/maintenance_log.yaml");
const INSPECTION_YAML: &str = include_str!("../builtin/inspection.yaml");
const TIMESHEET_YAML: &str = include_str!("../builtin/timesheet.yaml");
const JOB_CARD_YAML: &str = include_str!("../builtin/job_card.yaml");

/// All built-in form templates, checked against template invariants.
pub fn builtin_defaults() -> Result<TemplateDefaults> {
    let mut defaults = TemplateDefaults::new();
    for source in [
        MAINTENANCE_LOG_YAML,
        INSPECTION_YAML,
        TIMESHEET_YAML,
        JOB_CARD_YAML,
    ] {
        let template: FormTemplate = serde_yaml::from_str(source)?;
        template.check()?;
        defaults = defaults.template(template);
    }
    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn builtins_parse_and_check() {
        let defaults = builtin_defaults().unwrap();
        let types: Vec<_> = defaults
            .templates()
            .iter()
            .map(|t| t.form_type.as_str())
            .collect();
        assert_eq!(
            types,
            vec!["maintenance_log", "inspection", TIMESHEET_FORM_TYPE, "job_card"]
        );
    }

    #[test]
    fn maintenance_log_shape() {
        let defaults = builtin_defaults().unwrap();
        let log = &defaults.templates()[0];
        let kind = log.field_by_name("maintenanceType").unwrap();
        assert_eq!(kind.field_type, FieldType::Dropdown);
        assert!(kind.options().contains(&"Preventive".to_string()));
        assert_eq!(
            log.field_by_name("followUpRequired").unwrap().field_type,
            FieldType::Checkbox
        );
    }

    #[test]
    fn every_field_kind_used_by_some_builtin() {
        let defaults = builtin_defaults().unwrap();
        for kind in FieldType::ALL {
            let used = defaults
                .templates()
                .iter()
                .any(|t| t.fields_in_order().any(|f| f.field_type == kind));
            assert!(used, "{kind:?} unused by built-in templates");
        }
    }
}
