//! Application configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use onboard_search::SearchPolicy;
use onboard_utils::LogFormat;
use onboard_verification::VerificationPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub verification: VerificationPolicy,

    #[serde(default)]
    pub search: SearchPolicy,
}

fn default_log_level() -> String {
    "info".into()
}

impl AppConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            verification: VerificationPolicy::default(),
            search: SearchPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.verification.cooldown_secs, 30);
        assert_eq!(config.verification.code_length, 6);
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_tables_override_only_what_they_name() {
        let config = AppConfig::from_toml_str(
            r#"
            log_format = "json"

            [verification]
            cooldown_secs = 60

            [search]
            debounce_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.verification.cooldown_secs, 60);
        assert_eq!(config.verification.code_length, 6);
        assert_eq!(config.search.debounce_ms, 250);
    }

    #[test]
    fn default_config_round_trips() {
        let config = AppConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n[verification]\ncode_length = 4").unwrap();

        let config = AppConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.verification.code_length, 4);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_toml_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn wrong_type_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[search]\ndebounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
