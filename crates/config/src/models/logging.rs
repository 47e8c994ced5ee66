use scaffold_common::{LogLevel, DEFAULT_LOG_PATH};
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

/// `[Logger]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    pub log_path: String,
    pub log_level: LogLevel,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            log_path: DEFAULT_LOG_PATH.to_string(),
            log_level: LogLevel::Trace,
        }
    }
}

impl ConfigValidator for LoggerSettings {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.log_path, "Logger", "LogPath")
    }
}

/// One `[Modules]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSetting {
    pub name: String,
    pub level: LogLevel,
}

impl ModuleSetting {
    pub fn new<S: Into<String>>(name: S, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    /// Build from a raw `name=token` pair, validating both halves
    pub fn from_entry(name: &str, token: &str) -> crate::ConfigResult<Self> {
        ValidationUtils::validate_module_name(name)?;
        let level = token
            .parse::<LogLevel>()
            .map_err(|e| crate::ConfigError::invalid_value("Modules", name, e.to_string()))?;
        Ok(Self::new(name, level))
    }
}

impl ConfigValidator for ModuleSetting {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_module_name(&self.name)
    }
}
