//! Process-wide settings holder backed by an INI file.
//!
//! `load_settings` never leaves the caller without usable values: when the
//! file is missing, malformed or rejected, defaults are generated, written
//! back to the file and used instead.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use scaffold_common::{LogLevel, Singleton, DEFAULT_SETTINGS_FILE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::defaults::{
    default_settings, settings_text, LOGGER_SECTION, LOG_LEVEL_KEY, LOG_PATH_KEY,
    MODULES_SECTION, PORT_KEY, SERVER_SECTION,
};
use crate::document::parse_document;
use crate::models::{ModuleSetting, SettingsSnapshot};
use crate::validation::{ConfigValidator, ValidationUtils};
use crate::{ConfigError, ConfigResult};

/// How strictly individual fields are validated while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Bad fields keep their previous value; bad module entries are skipped
    #[default]
    Lenient,
    /// Any missing or invalid field rejects the whole file
    Strict,
}

/// Where the values of the last `load_settings` call came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    FromFile,
    Defaulted { reason: String },
}

impl LoadOutcome {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, LoadOutcome::Defaulted { .. })
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    settings_file_path: PathBuf,
    policy: ParsePolicy,
    state: RwLock<SettingsSnapshot>,
}

static GLOBAL_SETTINGS: Singleton<SettingsStore> = Singleton::new();

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// Store reading `settings.ini` from the working directory
    pub fn new() -> Self {
        Self::with_file(DEFAULT_SETTINGS_FILE)
    }

    /// Store bound to `path` for its whole lifetime
    pub fn with_file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            settings_file_path: path.into(),
            policy: ParsePolicy::default(),
            state: RwLock::new(SettingsSnapshot::default()),
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process-wide store reading `settings.ini`
    pub fn global() -> &'static SettingsStore {
        GLOBAL_SETTINGS.instance()
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    /// Load, validate and apply the settings file.
    ///
    /// Any parse or validation failure falls back to generated defaults,
    /// which are persisted over the file. `Err` is returned only when that
    /// fallback itself cannot be written.
    pub fn load_settings(&self) -> ConfigResult<LoadOutcome> {
        let current = self.read_state().clone();

        match self.parse_settings_file(current) {
            Ok(mut next) => {
                next.loaded = true;
                info!(
                    path = %self.settings_file_path.display(),
                    log_path = %next.logger.log_path,
                    log_level = %next.logger.log_level,
                    modules = next.modules.len(),
                    port = next.server.port,
                    "Settings loaded"
                );
                *self.write_state() = next;
                Ok(LoadOutcome::FromFile)
            }
            Err(e) => {
                warn!(
                    path = %self.settings_file_path.display(),
                    error = %e,
                    "Settings file unusable, regenerating defaults"
                );
                self.create_default_settings_file()?;
                Ok(LoadOutcome::Defaulted {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Write the defaults to the settings file and create the log
    /// directory, then publish them. On failure the previous values stay
    /// in place.
    fn create_default_settings_file(&self) -> ConfigResult<()> {
        let mut defaults = default_settings();
        defaults.loaded = true;

        self.create_logs_folder(&defaults.logger.log_path)?;
        let text = settings_text(&defaults)?;
        if let Some(parent) = self.settings_file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.settings_file_path, text)?;

        *self.write_state() = defaults;
        info!(path = %self.settings_file_path.display(), "Default settings file written");
        Ok(())
    }

    fn parse_settings_file(&self, mut next: SettingsSnapshot) -> ConfigResult<SettingsSnapshot> {
        let text = fs::read_to_string(&self.settings_file_path)?;
        let document = parse_document(&text)?;
        let strict = self.policy == ParsePolicy::Strict;

        // [Logger] LogPath
        match document.get_from(Some(LOGGER_SECTION), LOG_PATH_KEY) {
            Some(path) if !path.is_empty() => next.logger.log_path = path.to_string(),
            _ if strict => return Err(ConfigError::missing(LOGGER_SECTION, LOG_PATH_KEY)),
            _ => debug!("LogPath absent, keeping {}", next.logger.log_path),
        }
        self.create_logs_folder(&next.logger.log_path)?;

        // [Logger] LogLevel
        match document.get_from(Some(LOGGER_SECTION), LOG_LEVEL_KEY) {
            Some(token) => match token.parse::<LogLevel>() {
                Ok(level) => next.logger.log_level = level,
                Err(e) if strict => {
                    return Err(ConfigError::invalid_value(
                        LOGGER_SECTION,
                        LOG_LEVEL_KEY,
                        e.to_string(),
                    ))
                }
                Err(e) => warn!(error = %e, "Ignoring LogLevel, keeping {}", next.logger.log_level),
            },
            None if strict => return Err(ConfigError::missing(LOGGER_SECTION, LOG_LEVEL_KEY)),
            None => {}
        }

        // [Modules]
        next.modules = BTreeMap::new();
        match document.section(Some(MODULES_SECTION)) {
            Some(section) => {
                for (name, token) in section.iter() {
                    match ModuleSetting::from_entry(name, token) {
                        Ok(module) => next.insert_module(module),
                        Err(e) if strict => return Err(e),
                        Err(e) => warn!(module = name, error = %e, "Skipping module entry"),
                    }
                }
            }
            None if strict => {
                return Err(ConfigError::missing(MODULES_SECTION, "<module>"));
            }
            None => {}
        }

        // [Server] Port
        match document.get_from(Some(SERVER_SECTION), PORT_KEY) {
            Some(value) => match ValidationUtils::parse_port(value) {
                Ok(port) => next.server.port = port,
                Err(e) => warn!(error = %e, "Ignoring Port, keeping {}", next.server.port),
            },
            None if strict => return Err(ConfigError::missing(SERVER_SECTION, PORT_KEY)),
            None => {}
        }

        next.validate()?;
        Ok(next)
    }

    fn create_logs_folder(&self, log_path: &str) -> ConfigResult<()> {
        let dir = self.resolve_log_dir(log_path);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
            debug!(dir = %dir.display(), "Created logs folder");
        }
        Ok(())
    }

    /// Relative log paths are anchored at the settings file's directory
    fn resolve_log_dir(&self, log_path: &str) -> PathBuf {
        let path = Path::new(log_path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.settings_file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(path),
            _ => path.to_path_buf(),
        }
    }

    pub fn is_module_settings_loaded(&self, name: &str) -> bool {
        self.read_state().modules.contains_key(name)
    }

    /// Configured level of `name`; `ModuleNotFound` if the file had no entry
    pub fn module_log_level(&self, name: &str) -> ConfigResult<LogLevel> {
        self.read_state()
            .modules
            .get(name)
            .map(|m| m.level)
            .ok_or_else(|| ConfigError::ModuleNotFound(name.to_string()))
    }

    pub fn log_path(&self) -> String {
        self.read_state().logger.log_path.clone()
    }

    /// Directory the log path refers to on disk
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.resolve_log_dir(&self.read_state().logger.log_path)
    }

    pub fn log_level(&self) -> LogLevel {
        self.read_state().logger.log_level
    }

    pub fn server_port(&self) -> u16 {
        self.read_state().server.port
    }

    pub fn settings_file_path(&self) -> &Path {
        &self.settings_file_path
    }

    pub fn are_settings_loaded(&self) -> bool {
        self.read_state().loaded
    }

    pub fn modules(&self) -> BTreeMap<String, LogLevel> {
        self.read_state()
            .modules
            .values()
            .map(|m| (m.name.clone(), m.level))
            .collect()
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.read_state().clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SettingsSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SettingsSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
