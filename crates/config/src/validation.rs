use scaffold_common::{MAX_SERVER_PORT_EXCLUSIVE, MIN_SERVER_PORT_EXCLUSIVE};

use crate::{ConfigError, ConfigResult};

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, section: &str, key: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid_value(section, key, "cannot be empty"));
        }
        Ok(())
    }

    /// Module names match `^[A-Za-z0-9_]+$`
    pub fn is_valid_module_name(name: &str) -> bool {
        scaffold_common::is_valid_module_name(name)
    }

    pub fn validate_module_name(name: &str) -> ConfigResult<()> {
        if !Self::is_valid_module_name(name) {
            return Err(ConfigError::InvalidModuleName(name.to_string()));
        }
        Ok(())
    }

    /// Both bounds are exclusive: 1025..=65534
    pub fn is_valid_port(port: u16) -> bool {
        port > MIN_SERVER_PORT_EXCLUSIVE && port < MAX_SERVER_PORT_EXCLUSIVE
    }

    /// Parse a `[Server] Port` value, rejecting anything outside the range
    pub fn parse_port(value: &str) -> ConfigResult<u16> {
        let port: u16 = value
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid_value("Server", "Port", format!("{e}")))?;
        if !Self::is_valid_port(port) {
            return Err(ConfigError::invalid_value(
                "Server",
                "Port",
                format!(
                    "{port} is outside ({MIN_SERVER_PORT_EXCLUSIVE}, {MAX_SERVER_PORT_EXCLUSIVE})"
                ),
            ));
        }
        Ok(port)
    }
}
