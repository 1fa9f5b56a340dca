//! Application configuration schemas.
//!
//! Configuration is deserialized from TOML files via the `config` crate,
//! merged with `CAPTABLE__*` environment variables. Every field has a
//! default, so an empty or missing file yields a usable configuration.

pub mod host;
pub mod logging;
pub mod plugin;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::host::HostConfig;
use self::logging::LoggingConfig;
use self::plugin::PluginConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host behavior settings.
    #[serde(default)]
    pub host: HostConfig,
    /// Plugin settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `path`, an optional `config/{env}.toml`
    /// overlay next to it, and environment variables prefixed with
    /// `CAPTABLE__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let overlay = Path::new(path)
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{env}.toml"));

        let config = config::Config::builder()
            .add_source(config::File::from(Path::new(path)).required(false))
            .add_source(config::File::from(overlay.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix("CAPTABLE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("plugins.enabled")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the host unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.host.status_history == 0 {
            return Err(AppError::configuration(
                "host.status_history must be at least 1",
            ));
        }
        if self.host.request_queue == 0 {
            return Err(AppError::configuration(
                "host.request_queue must be at least 1",
            ));
        }
        if self.plugins.max_commands_per_plugin == 0 {
            return Err(AppError::configuration(
                "plugins.max_commands_per_plugin must be at least 1",
            ));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => Ok(()),
            other => Err(AppError::configuration(format!(
                "logging.format must be 'json', 'pretty' or 'compact', got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config.host.status_history, 64);
        assert!(config.host.surface_command_errors);
        assert_eq!(config.plugins.max_commands_per_plugin, 256);
        assert!(config.plugins.is_enabled("echo"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_toml_str(
            r#"
            [host]
            status_history = 3
            surface_command_errors = false

            [plugins]
            enabled = ["echo"]
            "#,
        )
        .expect("valid config");
        assert_eq!(config.host.status_history, 3);
        assert!(!config.host.surface_command_errors);
        assert_eq!(config.host.request_queue, 32);
        assert!(config.plugins.is_enabled("echo"));
        assert!(!config.plugins.is_enabled("other"));
    }

    #[test]
    fn test_zero_history_rejected() {
        let err = AppConfig::from_toml_str("[host]\nstatus_history = 0\n").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let err = AppConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap_err();
        assert!(err.message.contains("xml"));
    }

    #[test]
    fn test_load_from_file_with_env_overlay() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("default.toml");
        std::fs::write(&base, "[host]\nstatus_history = 10\n").expect("write base");
        std::fs::write(
            dir.path().join("testing.toml"),
            "[host]\nstatus_history = 20\n",
        )
        .expect("write overlay");

        let config = AppConfig::load(base.to_str().expect("utf-8 path"), "testing")
            .expect("config loads");
        assert_eq!(config.host.status_history, 20);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.toml");
        let config = AppConfig::load(missing.to_str().expect("utf-8 path"), "development")
            .expect("missing file is optional");
        assert_eq!(config.host.status_history, 64);
    }
}
