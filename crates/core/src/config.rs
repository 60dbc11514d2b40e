use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Settings;

/// Configuration manager for driver settings.
/// Settings are stored as JSON, in `launchpad.json` in the working directory by default.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Valid values and descriptions for every setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub device_pattern: ConfigOption<String>,
    pub mapping_mode: ConfigOption<String>,
    pub offline_updates: ConfigOption<bool>,
    pub duty_cycle_numerator: ConfigOption<u8>,
    pub duty_cycle_denominator: ConfigOption<u8>,
    pub poll_interval_ms: ConfigOption<u64>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Config validation errors: {}", .0.join(", "))]
    ValidationError(Vec<String>),
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'launchpad.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("launchpad.json"));

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Load settings from the configuration file.
    /// Writes a default file when none exists yet.
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match driver version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Validate, then replace and save settings
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        ConfigSchema {
            device_pattern: ConfigOption {
                default: "Launchpad".to_string(),
                valid_range: None,
                valid_choices: None,
                description: "Case-insensitive substring of the MIDI port name".to_string(),
            },
            mapping_mode: ConfigOption {
                default: "xy".to_string(),
                valid_range: None,
                valid_choices: Some(vec!["xy".to_string(), "drum_rack".to_string()]),
                description: "Note layout selected when the session opens".to_string(),
            },
            offline_updates: ConfigOption {
                default: false,
                valid_range: None,
                valid_choices: None,
                description: "Stage LED writes and upload them with rapid update".to_string(),
            },
            duty_cycle_numerator: ConfigOption {
                default: 1,
                valid_range: Some((1, 16)),
                valid_choices: None,
                description: "LED duty cycle numerator".to_string(),
            },
            duty_cycle_denominator: ConfigOption {
                default: 5,
                valid_range: Some((3, 18)),
                valid_choices: None,
                description: "LED duty cycle denominator".to_string(),
            },
            poll_interval_ms: ConfigOption {
                default: 5,
                valid_range: Some((1, 1000)),
                valid_choices: None,
                description: "Input polling interval in milliseconds".to_string(),
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if settings.device_pattern.trim().is_empty() {
            errors.push("device_pattern must not be empty".to_string());
        }

        if let Some((numerator, denominator)) = settings.duty_cycle {
            if let Some((min, max)) = schema.duty_cycle_numerator.valid_range {
                if numerator < min || numerator > max {
                    errors.push(format!(
                        "duty cycle numerator must be between {} and {}",
                        min, max
                    ));
                }
            }
            if let Some((min, max)) = schema.duty_cycle_denominator.valid_range {
                if denominator < min || denominator > max {
                    errors.push(format!(
                        "duty cycle denominator must be between {} and {}",
                        min, max
                    ));
                }
            }
        }

        if let Some((min, max)) = schema.poll_interval_ms.valid_range {
            if settings.poll_interval_ms < min || settings.poll_interval_ms > max {
                errors.push(format!(
                    "poll_interval_ms must be between {} and {}",
                    min, max
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::MappingMode;

    #[test]
    fn test_config_manager_new() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let manager = ConfigManager::new(Some(config_path.clone()));
        assert_eq!(manager.config_path(), config_path);
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("launchpad.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));
        let settings = manager.load().unwrap();

        assert_eq!(settings, Settings::default());
        assert!(config_path.exists());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.json");

        let mut manager = ConfigManager::new(Some(config_path.clone()));

        let settings = Settings {
            device_pattern: "Launchpad Mini".to_string(),
            mapping_mode: MappingMode::DrumRack,
            duty_cycle: Some((1, 5)),
            ..Settings::default()
        };
        manager.update_settings(settings).unwrap();

        let mut manager2 = ConfigManager::new(Some(config_path));
        let loaded_settings = manager2.load().unwrap();

        assert_eq!(loaded_settings.device_pattern, "Launchpad Mini");
        assert_eq!(loaded_settings.mapping_mode, MappingMode::DrumRack);
        assert_eq!(loaded_settings.duty_cycle, Some((1, 5)));
    }

    #[test]
    fn test_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        fs::write(&config_path, "{ not json").unwrap();

        let mut manager = ConfigManager::new(Some(config_path));
        assert!(matches!(manager.load(), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        assert!(ConfigManager::validate_settings(&settings).is_ok());

        settings.duty_cycle = Some((17, 5));
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.duty_cycle = Some((1, 2));
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.duty_cycle = None;
        settings.poll_interval_ms = 0;
        assert!(ConfigManager::validate_settings(&settings).is_err());

        settings.poll_interval_ms = 5;
        settings.device_pattern = "  ".to_string();
        let errors = ConfigManager::validate_settings(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_update_rejects_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new(Some(temp_dir.path().join("c.json")));

        let settings = Settings {
            poll_interval_ms: 5000,
            ..Settings::default()
        };
        assert!(matches!(
            manager.update_settings(settings),
            Err(ConfigError::ValidationError(_))
        ));
        assert_eq!(manager.settings(), &Settings::default());
    }
}
