// Configuration management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::toast::{
    ToastDuration, ToastVariant, DEFAULT_DEDUP_WINDOW, DEFAULT_INFO_MS, DEFAULT_MAX_VISIBLE,
    DEFAULT_SUCCESS_MS, DEFAULT_WARNING_MS,
};

/// Upper bound for every auto-dismiss duration, one day
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Upper bound for the deduplication window, one day
pub const MAX_DEDUP_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name: "cosmic_dark" or "light"
    pub theme: String,

    /// Toast lifecycle settings
    pub toast: ToastConfig,
}

/// Durations, dedup window and visible cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Success auto-dismiss in milliseconds
    pub success_ms: u64,

    /// Info auto-dismiss in milliseconds
    pub info_ms: u64,

    /// Warning auto-dismiss in milliseconds
    pub warning_ms: u64,

    /// Error auto-dismiss in milliseconds; unset means errors stay until dismissed
    pub error_ms: Option<u64>,

    /// Sliding deduplication window in seconds
    pub dedup_window_secs: u64,

    /// Toasts shown at once
    pub max_visible: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "cosmic_dark".to_string(),
            toast: ToastConfig::default(),
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            success_ms: DEFAULT_SUCCESS_MS,
            info_ms: DEFAULT_INFO_MS,
            warning_ms: DEFAULT_WARNING_MS,
            error_ms: None,
            dedup_window_secs: DEFAULT_DEDUP_WINDOW.as_secs(),
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl ToastConfig {
    /// Auto-dismiss behaviour for a variant
    pub fn default_duration(&self, variant: ToastVariant) -> ToastDuration {
        match variant {
            ToastVariant::Success => ToastDuration::from_millis(self.success_ms),
            ToastVariant::Info => ToastDuration::from_millis(self.info_ms),
            ToastVariant::Warning => ToastDuration::from_millis(self.warning_ms),
            ToastVariant::Error => match self.error_ms {
                Some(ms) => ToastDuration::from_millis(ms),
                None => ToastDuration::Persistent,
            },
        }
    }

    /// Deduplication window
    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }

    /// Check values are usable
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("success_ms", Some(self.success_ms)),
            ("info_ms", Some(self.info_ms)),
            ("warning_ms", Some(self.warning_ms)),
            ("error_ms", self.error_ms),
        ] {
            match value {
                Some(0) => {
                    return Err(ConfigError::InvalidValue(format!(
                        "toast.{} must be greater than 0",
                        name
                    )));
                }
                Some(ms) if ms > MAX_DURATION_MS => {
                    return Err(ConfigError::InvalidValue(format!(
                        "toast.{} must be at most {} (one day)",
                        name, MAX_DURATION_MS
                    )));
                }
                _ => {}
            }
        }

        if self.dedup_window_secs == 0 || self.dedup_window_secs > MAX_DEDUP_WINDOW_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "toast.dedup_window_secs must be between 1 and {}",
                MAX_DEDUP_WINDOW_SECS
            )));
        }

        if self.max_visible == 0 {
            return Err(ConfigError::InvalidValue(
                "toast.max_visible must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!(path = %config_path.display(), "Created default config");
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::WriteError)?;

        Ok(())
    }

    /// Check all sections
    pub fn validate(&self) -> ConfigResult<()> {
        self.toast.validate()
    }

    /// Get the path to the configuration file
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("toast-center").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.toast.success_ms, 3000);
        assert_eq!(config.toast.info_ms, 4000);
        assert_eq!(config.toast.warning_ms, 5000);
        assert_eq!(config.toast.error_ms, None);
        assert_eq!(config.toast.dedup_window(), Duration::from_secs(300));
        assert_eq!(config.toast.max_visible, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_durations_per_variant() {
        let toast = ToastConfig::default();
        assert_eq!(
            toast.default_duration(ToastVariant::Success),
            ToastDuration::from_millis(3000)
        );
        assert_eq!(
            toast.default_duration(ToastVariant::Error),
            ToastDuration::Persistent
        );

        let timed_errors = ToastConfig {
            error_ms: Some(10_000),
            ..ToastConfig::default()
        };
        assert_eq!(
            timed_errors.default_duration(ToastVariant::Error),
            ToastDuration::from_millis(10_000)
        );
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[toast]\nmax_visible = 5\n").unwrap();
        assert_eq!(config.toast.max_visible, 5);
        assert_eq!(config.toast.success_ms, 3000);
        assert_eq!(config.theme, "cosmic_dark");
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut config = Config::default();
        config.toast.max_visible = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut config = Config::default();
        config.toast.error_ms = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.toast.dedup_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_values() {
        let mut config = Config::default();
        config.toast.dedup_window_secs = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut config = Config::default();
        config.toast.warning_ms = MAX_DURATION_MS + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.toast.error_ms = Some(u64::MAX);
        assert!(config.validate().is_err());

        // The bounds themselves are accepted
        let mut config = Config::default();
        config.toast.dedup_window_secs = MAX_DEDUP_WINDOW_SECS;
        config.toast.error_ms = Some(MAX_DURATION_MS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_oversized_window() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        // TOML integers are i64, so this is the largest value a file can hold
        std::fs::write(&path, format!("[toast]\ndedup_window_secs = {}\n", i64::MAX)).unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.toast.warning_ms = 7000;
        config.theme = "light".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.toast.warning_ms, 7000);
        assert_eq!(loaded.theme, "light");
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "toast = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
