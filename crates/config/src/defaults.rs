use scaffold_common::{LogLevel, DEFAULT_MODULE_NAMES};

use ini::{Ini, Properties};

use crate::document::render_document;
use crate::models::{LoggerSettings, ModuleSetting, ServerSettings, SettingsSnapshot};
use crate::ConfigResult;

pub const LOGGER_SECTION: &str = "Logger";
pub const LOG_PATH_KEY: &str = "LogPath";
pub const LOG_LEVEL_KEY: &str = "LogLevel";
pub const MODULES_SECTION: &str = "Modules";
pub const SERVER_SECTION: &str = "Server";
pub const PORT_KEY: &str = "Port";

/// 系统默认设置
///
/// Values written when the settings file is missing or unusable.
pub fn default_settings() -> SettingsSnapshot {
    let mut settings = SettingsSnapshot {
        logger: LoggerSettings::default(),
        modules: Default::default(),
        server: ServerSettings::default(),
        loaded: false,
    };
    for name in DEFAULT_MODULE_NAMES {
        settings.insert_module(ModuleSetting::new(*name, LogLevel::Trace));
    }
    settings
}

/// INI form of `settings`; all three sections are always emitted
pub fn settings_document(settings: &SettingsSnapshot) -> Ini {
    let mut document = Ini::new();

    document
        .with_section(Some(LOGGER_SECTION))
        .set(LOG_PATH_KEY, settings.logger.log_path.as_str())
        .set(LOG_LEVEL_KEY, settings.logger.log_level.as_str());

    let modules = document
        .entry(Some(MODULES_SECTION.to_string()))
        .or_insert_with(Properties::new);
    for module in settings.modules.values() {
        modules.insert(module.name.as_str(), module.level.as_str());
    }

    document
        .with_section(Some(SERVER_SECTION))
        .set(PORT_KEY, settings.server.port.to_string());
    document
}

/// File contents written for `settings`
pub fn settings_text(settings: &SettingsSnapshot) -> ConfigResult<String> {
    render_document(&settings_document(settings))
}
