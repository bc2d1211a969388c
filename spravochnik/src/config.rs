//! Application configuration loaded with figment.
//!
//! Sources are merged with later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `spravochnik.toml` in the configuration directory
//! 3. `spravochnik.yaml` in the configuration directory
//! 4. `SPRAVOCHNIK_*` environment variables (`SPRAVOCHNIK_DATABASE_PATH`, ...)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use spravochnik_store::StoreConfig;

use crate::error::ConfigError;

/// TOML configuration file name.
pub const TOML_FILE: &str = "spravochnik.toml";
/// YAML configuration file name.
pub const YAML_FILE: &str = "spravochnik.yaml";
/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "SPRAVOCHNIK_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpravochnikConfig {
    /// SQLite database file. Relative paths resolve against the configuration directory.
    pub database_path: PathBuf,
    pub enforce_foreign_keys: bool,
    pub busy_timeout_ms: u64,
    /// Insert the sample department and professor into empty tables.
    pub seed_sample_rows: bool,
    /// `EnvFilter` directive for the launcher's logging.
    pub log_level: String,
}

impl Default for SpravochnikConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            database_path: store.database_path,
            enforce_foreign_keys: store.enforce_foreign_keys,
            busy_timeout_ms: store.busy_timeout_ms,
            seed_sample_rows: true,
            log_level: "info".to_string(),
        }
    }
}

impl SpravochnikConfig {
    /// Load configuration from the current directory and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = std::env::current_dir()
            .map_err(|source| ConfigError::CurrentDirectory { source })?;
        Self::load_from(&dir)
    }

    /// Load configuration with `dir` as the configuration directory.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = Self::figment(dir).extract()?;
        config.validate()?;
        if config.database_path.is_relative() {
            config.database_path = dir.join(&config.database_path);
        }
        debug!(
            database = %config.database_path.display(),
            seed = config.seed_sample_rows,
            "configuration loaded"
        );
        Ok(config)
    }

    /// The merged provider stack for `dir`, before extraction.
    pub fn figment(dir: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join(TOML_FILE)))
            .merge(Yaml::file(dir.join(YAML_FILE)))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Check values figment cannot check by type alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                "database_path",
                "must not be empty",
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::invalid_value("log_level", "must not be empty"));
        }
        Ok(())
    }

    /// The storage subset of this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            database_path: self.database_path.clone(),
            enforce_foreign_keys: self.enforce_foreign_keys,
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = SpravochnikConfig::load_from(temp_dir.path()).unwrap();
        assert_eq!(config.database_path, temp_dir.path().join("spravochnik.db"));
        assert!(config.enforce_foreign_keys);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.seed_sample_rows);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(TOML_FILE),
            r#"
database_path = "data/catalog.db"
seed_sample_rows = false
"#,
        )
        .unwrap();

        let config = SpravochnikConfig::load_from(temp_dir.path()).unwrap();
        assert_eq!(
            config.database_path,
            temp_dir.path().join("data").join("catalog.db")
        );
        assert!(!config.seed_sample_rows);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[test]
    #[serial]
    fn test_precedence_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(TOML_FILE),
            r#"
log_level = "warn"
busy_timeout_ms = 100
"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(YAML_FILE),
            r#"
log_level: debug
enforce_foreign_keys: false
"#,
        )
        .unwrap();

        std::env::set_var("SPRAVOCHNIK_LOG_LEVEL", "trace");
        let config = SpravochnikConfig::load_from(temp_dir.path());
        std::env::remove_var("SPRAVOCHNIK_LOG_LEVEL");
        let config = config.unwrap();

        // Environment beats YAML, YAML beats TOML
        assert_eq!(config.log_level, "trace");
        assert!(!config.enforce_foreign_keys);
        assert_eq!(config.busy_timeout_ms, 100);
    }

    #[test]
    #[serial]
    fn test_absolute_database_path_from_env() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("elsewhere.db");
        std::env::set_var("SPRAVOCHNIK_DATABASE_PATH", &db);
        let config = SpravochnikConfig::load_from(temp_dir.path());
        std::env::remove_var("SPRAVOCHNIK_DATABASE_PATH");
        assert_eq!(config.unwrap().database_path, db);
    }

    #[test]
    #[serial]
    fn test_bad_type_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(TOML_FILE),
            "busy_timeout_ms = \"soon\"\n",
        )
        .unwrap();
        assert!(matches!(
            SpravochnikConfig::load_from(temp_dir.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_empty_log_level_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(TOML_FILE), "log_level = \"\"\n").unwrap();
        assert!(matches!(
            SpravochnikConfig::load_from(temp_dir.path()),
            Err(ConfigError::InvalidValue { key, .. }) if key == "log_level"
        ));
    }

    #[test]
    fn test_store_config_subset() {
        let config = SpravochnikConfig {
            busy_timeout_ms: 10,
            ..SpravochnikConfig::default()
        };
        let store = config.store_config();
        assert_eq!(store.busy_timeout_ms, 10);
        assert_eq!(store.database_path, config.database_path);
    }
}
