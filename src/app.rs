use std::sync::Arc;

use anyhow::{Context, Result};
use scaffold_common::LogLevel;
use scaffold_config::{ConfigError, LoadOutcome, SettingsStore};
use scaffold_observability::{ModuleLoggerRegistry, RegistryConfig};
use tracing::{info, warn};

/// 应用上下文
///
/// Owns the settings store and the module logger registry and hands them
/// out explicitly. The registry writes below the settings' log directory,
/// and modules registered through the context start at their configured
/// level.
pub struct AppContext {
    settings: Arc<SettingsStore>,
    registry: Arc<ModuleLoggerRegistry>,
    load_outcome: LoadOutcome,
}

impl AppContext {
    /// Load `settings` and build a registry with console output
    pub fn new(settings: SettingsStore) -> Result<Self> {
        Self::with_registry_config(settings, RegistryConfig::default())
    }

    /// Like [`new`](Self::new); `config.log_root` is replaced by the
    /// settings' resolved log directory.
    pub fn with_registry_config(settings: SettingsStore, config: RegistryConfig) -> Result<Self> {
        let load_outcome = settings.load_settings().with_context(|| {
            format!(
                "加载设置文件失败: {}",
                settings.settings_file_path().display()
            )
        })?;

        let config = config.with_log_root(settings.resolved_log_dir());
        let registry = ModuleLoggerRegistry::new(config);

        let context = Self {
            settings: Arc::new(settings),
            registry: Arc::new(registry),
            load_outcome,
        };
        context.apply_level(scaffold_common::LOGGER_MODULE_NAME)?;
        Ok(context)
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<ModuleLoggerRegistry> {
        &self.registry
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Log where the settings came from through process tracing
    pub fn report_load_outcome(&self) {
        let path = self.settings.settings_file_path().display();
        match &self.load_outcome {
            LoadOutcome::FromFile => info!("设置已从 {path} 加载"),
            LoadOutcome::Defaulted { reason } => {
                warn!(reason = %reason, "设置文件不可用，已生成默认设置: {path}")
            }
        }
    }

    /// Level a module starts at: its `[Modules]` entry, else the global level
    pub fn configured_level(&self, name: &str) -> Result<LogLevel> {
        match self.settings.module_log_level(name) {
            Ok(level) => Ok(level),
            Err(ConfigError::ModuleNotFound(_)) => Ok(self.settings.log_level()),
            Err(e) => Err(e).context("读取模块日志级别失败"),
        }
    }

    /// Register `name` and apply its configured level. A module that is
    /// already registered keeps its current level.
    pub fn register_module(&self, name: &str) -> Result<()> {
        let known = self.registry.is_registered(name.trim());
        self.registry
            .register_module(name)
            .with_context(|| format!("注册模块失败: {name}"))?;
        if known {
            return Ok(());
        }
        self.apply_level(name.trim())
    }

    /// Register every module listed in the settings file
    pub fn register_configured_modules(&self) -> Result<()> {
        for name in self.settings.modules().keys() {
            self.register_module(name)?;
        }
        Ok(())
    }

    fn apply_level(&self, name: &str) -> Result<()> {
        let level = self.configured_level(name)?;
        self.registry
            .set_module_log_level(name, level)
            .with_context(|| format!("设置模块日志级别失败: {name}"))
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
        info!("应用上下文已关闭");
    }
}
