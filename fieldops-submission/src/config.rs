//! Engine configuration loaded with figment.

use std::path::{Path, PathBuf};

use fieldops_fields::{ValidationOptions, DEFAULT_MAX_PHOTOS};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, SubmissionError};

/// Prefix for environment overrides, e.g. `FIELDOPS_MAX_PHOTOS=8`.
pub const ENV_PREFIX: &str = "FIELDOPS_";

/// Base name of configuration files, searched as `.toml`, `.yaml`, `.yml` and `.json`.
pub const CONFIG_FILE_STEM: &str = "fieldops";

/// Settings shared by the capture engine and its file-backed collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on photos per Photo field
    pub max_photos: usize,
    /// Directory holding one JSON document per stored submission
    pub store_dir: PathBuf,
    /// Directory that receives rendered exports
    pub export_dir: PathBuf,
    /// Directory of form template files
    pub templates_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            store_dir: PathBuf::from("submissions"),
            export_dir: PathBuf::from("exports"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl EngineConfig {
    /// Load configuration for a working directory.
    ///
    /// Sources in precedence order (later sources override earlier ones):
    /// 1. Default values
    /// 2. `fieldops.toml`, `fieldops.yaml`, `fieldops.yml`, `fieldops.json` in `dir`
    /// 3. `FIELDOPS_*` environment variables
    ///
    /// Relative directories are resolved against `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        debug!(dir = %dir.display(), "loading engine configuration");
        let config: EngineConfig = Self::figment(dir).extract()?;
        config.check()?;
        Ok(config.resolved(dir))
    }

    /// The merged provider chain without extracting it.
    pub fn figment(dir: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));

        for ext in ["toml", "yaml", "yml", "json"] {
            let path = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
            if !path.is_file() {
                continue;
            }
            trace!(path = %path.display(), "merging config file");
            figment = match ext {
                "toml" => figment.merge(Toml::file(&path)),
                "json" => figment.merge(Json::file(&path)),
                _ => figment.merge(Yaml::file(&path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Reject values the engine cannot work with.
    pub fn check(&self) -> Result<()> {
        if self.max_photos == 0 {
            return Err(SubmissionError::InvalidConfig {
                key: "max_photos".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Validation options derived from this configuration.
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            max_photos: self.max_photos,
        }
    }

    fn resolved(mut self, dir: &Path) -> Self {
        for path in [
            &mut self.store_dir,
            &mut self.export_dir,
            &mut self.templates_dir,
        ] {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults() {
        let temp = TempDir::new().unwrap();
        let config = EngineConfig::load(temp.path()).unwrap();
        assert_eq!(config.max_photos, 5);
        assert_eq!(config.store_dir, temp.path().join("submissions"));
        assert_eq!(config.export_dir, temp.path().join("exports"));
        assert_eq!(config.templates_dir, temp.path().join("templates"));
    }

    #[test]
    #[serial]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("fieldops.toml"),
            "max_photos = 8\nstore_dir = \"/var/fieldops/store\"\n",
        )
        .unwrap();

        let config = EngineConfig::load(temp.path()).unwrap();
        assert_eq!(config.max_photos, 8);
        assert_eq!(config.store_dir, PathBuf::from("/var/fieldops/store"));
        assert_eq!(config.export_dir, temp.path().join("exports"));
    }

    #[test]
    #[serial]
    fn test_yaml_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fieldops.yaml"), "export_dir: out\n").unwrap();
        let config = EngineConfig::load(temp.path()).unwrap();
        assert_eq!(config.export_dir, temp.path().join("out"));
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fieldops.json"), r#"{"max_photos": 8}"#).unwrap();

        env::set_var("FIELDOPS_MAX_PHOTOS", "3");
        let result = EngineConfig::load(temp.path());
        env::remove_var("FIELDOPS_MAX_PHOTOS");

        assert_eq!(result.unwrap().max_photos, 3);
    }

    #[test]
    #[serial]
    fn test_zero_photos_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fieldops.toml"), "max_photos = 0\n").unwrap();
        let err = EngineConfig::load(temp.path()).unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidConfig { ref key, .. } if key == "max_photos"));
    }

    #[test]
    #[serial]
    fn test_malformed_value_is_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fieldops.toml"), "max_photos = \"lots\"\n").unwrap();
        assert!(matches!(
            EngineConfig::load(temp.path()),
            Err(SubmissionError::Config(_))
        ));
    }

    #[test]
    fn test_validation_options() {
        let config = EngineConfig {
            max_photos: 9,
            ..Default::default()
        };
        assert_eq!(config.validation_options().max_photos, 9);
    }
}
