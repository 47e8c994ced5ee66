pub mod defaults;
pub mod document;
pub mod models;
pub mod store;
pub mod validation;


// Re-export commonly used types
pub use document::{parse_document, render_document};
pub use models::{LoggerSettings, ModuleSetting, ServerSettings, SettingsSnapshot};
pub use scaffold_common::LogLevel;
pub use store::{LoadOutcome, ParsePolicy, SettingsStore};
pub use validation::{ConfigValidator, ValidationUtils};

/// Configuration error type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error enumeration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed settings file: {0}")]
    Malformed(String),

    #[error("Missing setting: [{section}] {key}")]
    MissingKey { section: String, key: String },

    #[error("Invalid value for [{section}] {key}: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    #[error("Invalid module name: {0:?}")]
    InvalidModuleName(String),

    #[error("Module settings not found for module: {0}")]
    ModuleNotFound(String),
}

impl ConfigError {
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed(message.into())
    }

    pub fn missing(section: &str, key: &str) -> Self {
        Self::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid_value<S: Into<String>>(section: &str, key: &str, message: S) -> Self {
        Self::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Lookup failures are the only errors callers are expected to handle
    pub fn is_lookup(&self) -> bool {
        matches!(self, ConfigError::ModuleNotFound(_))
    }
}

impl From<ini::ParseError> for ConfigError {
    fn from(e: ini::ParseError) -> Self {
        Self::parse(e.line, e.msg)
    }
}
