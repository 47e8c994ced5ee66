pub mod logging;
pub mod server;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use logging::{LoggerSettings, ModuleSetting};
pub use server::ServerSettings;

use crate::validation::ConfigValidator;

/// Every value the settings file carries, plus the loaded flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SettingsSnapshot {
    pub logger: LoggerSettings,
    pub modules: BTreeMap<String, ModuleSetting>,
    pub server: ServerSettings,
    pub loaded: bool,
}

impl SettingsSnapshot {
    pub fn insert_module(&mut self, module: ModuleSetting) {
        self.modules.insert(module.name.clone(), module);
    }
}

impl ConfigValidator for SettingsSnapshot {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.logger.validate()?;
        for module in self.modules.values() {
            module.validate()?;
        }
        self.server.validate()?;
        Ok(())
    }
}
