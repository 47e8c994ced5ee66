use scaffold_common::DEFAULT_SERVER_PORT;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

/// `[Server]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

impl ConfigValidator for ServerSettings {
    fn validate(&self) -> crate::ConfigResult<()> {
        if !ValidationUtils::is_valid_port(self.port) {
            return Err(crate::ConfigError::invalid_value(
                "Server",
                "Port",
                format!("{} is out of range", self.port),
            ));
        }
        Ok(())
    }
}
