//! Module name → logger handle registry.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use scaffold_common::{
    is_valid_module_name, LogLevel, Singleton, DEFAULT_LOG_ROOT, DEFAULT_MAX_LOG_FILES,
    LOGGER_MODULE_NAME,
};
use tracing::{debug, error};

use crate::appender::{ConsoleAppender, DailyFileAppender, LogAppender, RecordFormat};
use crate::log_rotation::{module_log_dir, purge_module_logs, PurgeStats};
use crate::record::LogRecord;
use crate::{LoggerError, LoggerResult, Operation};

/// 日志注册表配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Root of the per-module directories
    pub log_root: PathBuf,
    /// Mirror every record to stdout
    pub console: bool,
    /// Daily files kept per sink; the current day's file is always kept
    pub max_files: usize,
    /// Threshold of a freshly registered module
    pub default_level: LogLevel,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
            console: true,
            max_files: DEFAULT_MAX_LOG_FILES,
            default_level: LogLevel::Trace,
        }
    }
}

impl RegistryConfig {
    pub fn with_log_root<P: Into<PathBuf>>(mut self, log_root: P) -> Self {
        self.log_root = log_root.into();
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }
}

/// Logger handle of one module: a threshold plus its appenders
pub struct ModuleLogger {
    name: String,
    level: AtomicU8,
    appenders: RwLock<Vec<Arc<dyn LogAppender>>>,
}

impl ModuleLogger {
    pub fn new<S: Into<String>>(name: S, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(level.as_u8()),
            appenders: RwLock::new(Vec::new()),
        }
    }

    pub fn with_appender(self, appender: Arc<dyn LogAppender>) -> Self {
        self.add_appender(appender);
        self
    }

    pub fn add_appender(&self, appender: Arc<dyn LogAppender>) {
        self.appenders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(appender);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Release);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// Write one record to every appender. Records below the threshold are
    /// dropped silently. All appenders are attempted; the first failure is
    /// returned.
    pub fn log(&self, level: LogLevel, message: fmt::Arguments<'_>) -> std::io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let record = LogRecord::new(self.name.as_str(), level, message.to_string());
        let appenders = self.appenders.read().unwrap_or_else(PoisonError::into_inner);

        let mut first_error = None;
        for appender in appenders.iter() {
            if let Err(e) = appender.append(&record) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn flush(&self) -> std::io::Result<()> {
        let appenders = self.appenders.read().unwrap_or_else(PoisonError::into_inner);
        for appender in appenders.iter() {
            appender.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ModuleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLogger")
            .field("name", &self.name)
            .field("level", &self.level())
            .finish_non_exhaustive()
    }
}

/// Observer of every error the registry reports
pub type FailureHook = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Per-module logger registry.
///
/// The `LOGGER` module is registered on construction and receives every
/// failure concerning other modules. Operations on unknown modules never
/// panic; they are reported and, where the operation returns a result,
/// also handed back as a [`LoggerError`].
pub struct ModuleLoggerRegistry {
    config: RegistryConfig,
    loggers: RwLock<BTreeMap<String, Arc<ModuleLogger>>>,
    failure_hook: RwLock<Option<FailureHook>>,
}

static GLOBAL_REGISTRY: Singleton<ModuleLoggerRegistry> = Singleton::new();

impl Default for ModuleLoggerRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl ModuleLoggerRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let registry = Self {
            config,
            loggers: RwLock::new(BTreeMap::new()),
            failure_hook: RwLock::new(None),
        };
        // Failures are already reported through the fallback channel
        let _ = registry.register_module(LOGGER_MODULE_NAME);
        registry
    }

    /// Process-wide registry rooted at `Logs/`
    pub fn global() -> &'static ModuleLoggerRegistry {
        GLOBAL_REGISTRY.instance()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn log_root(&self) -> &Path {
        &self.config.log_root
    }

    pub fn set_failure_hook<F>(&self, hook: F)
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        *self
            .failure_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    pub fn clear_failure_hook(&self) {
        *self
            .failure_hook
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Register `name` (trimmed) with console, daily text and daily JSON
    /// appenders. Registering an existing module only emits a warning.
    ///
    /// Names become directory names under the log root, so only letters,
    /// digits and `_` are accepted.
    pub fn register_module(&self, name: &str) -> LoggerResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(self.fail(LoggerError::EmptyModuleName));
        }
        if !is_valid_module_name(name) {
            return Err(self.fail(LoggerError::InvalidModuleName(name.to_string())));
        }
        if self.is_registered(name) {
            self.report(&LoggerError::AlreadyRegistered(name.to_string()));
            return Ok(());
        }

        let logger = match self.build_logger(name) {
            Ok(logger) => Arc::new(logger),
            Err(e) => return Err(self.fail(LoggerError::io(name, e))),
        };

        let inserted = match self.write_loggers().entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(logger);
                true
            }
            // Lost a race with a concurrent registration of the same name
            Entry::Occupied(_) => false,
        };
        if !inserted {
            self.report(&LoggerError::AlreadyRegistered(name.to_string()));
            return Ok(());
        }
        debug!(module = name, "Module logger registered");
        Ok(())
    }

    fn build_logger(&self, name: &str) -> std::io::Result<ModuleLogger> {
        let dir = module_log_dir(&self.config.log_root, name);
        let mut logger = ModuleLogger::new(name, self.config.default_level);

        if self.config.console {
            logger = logger.with_appender(Arc::new(ConsoleAppender::new()));
        }
        for format in [RecordFormat::Text, RecordFormat::Json] {
            let file = DailyFileAppender::new(&dir, name, format, self.config.max_files)?;
            logger = logger.with_appender(Arc::new(file));
        }
        Ok(logger)
    }

    /// Attach an extra appender to a registered module
    pub fn add_appender(&self, name: &str, appender: Arc<dyn LogAppender>) -> LoggerResult<()> {
        match self.logger(name) {
            Some(logger) => {
                logger.add_appender(appender);
                Ok(())
            }
            None => Err(self.fail(LoggerError::not_registered(name, Operation::AddAppender))),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.read_loggers().contains_key(name)
    }

    pub fn logger(&self, name: &str) -> Option<Arc<ModuleLogger>> {
        self.read_loggers().get(name).cloned()
    }

    pub fn registered_modules(&self) -> Vec<String> {
        self.read_loggers().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_loggers().is_empty()
    }

    pub fn set_module_log_level(&self, name: &str, level: LogLevel) -> LoggerResult<()> {
        match self.logger(name) {
            Some(logger) => {
                logger.set_level(level);
                Ok(())
            }
            None => Err(self.fail(LoggerError::not_registered(name, Operation::SetLevel))),
        }
    }

    /// Current level label (`trace`..`critical`), empty when unregistered
    pub fn get_module_level(&self, name: &str) -> String {
        match self.logger(name) {
            Some(logger) => logger.level().severity_label().to_string(),
            None => {
                self.report(&LoggerError::not_registered(name, Operation::GetLevel));
                String::new()
            }
        }
    }

    /// Current level without reporting unknown modules
    pub fn module_level(&self, name: &str) -> Option<LogLevel> {
        self.logger(name).map(|logger| logger.level())
    }

    pub fn get_log_levels(&self) -> BTreeMap<String, String> {
        self.read_loggers()
            .iter()
            .map(|(name, logger)| (name.clone(), logger.level().severity_label().to_string()))
            .collect()
    }

    /// Write to `module` at `level`. Unknown modules and file failures are
    /// reported, never returned.
    pub fn log(&self, module: &str, level: LogLevel, message: fmt::Arguments<'_>) {
        match self.logger(module) {
            Some(logger) => {
                if let Err(e) = logger.log(level, message) {
                    self.report(&LoggerError::io(module, e));
                }
            }
            None => self.report(&LoggerError::not_registered(module, Operation::WriteLog)),
        }
    }

    pub fn trace(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Trace, message);
    }

    pub fn debug(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Debug, message);
    }

    pub fn info(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Info, message);
    }

    pub fn warning(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Warning, message);
    }

    pub fn error(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Error, message);
    }

    pub fn critical(&self, module: &str, message: fmt::Arguments<'_>) {
        self.log(module, LogLevel::Fatal, message);
    }

    /// Truncate today's files and remove every other file of one module
    pub fn delete_module_logs(&self, name: &str) -> LoggerResult<PurgeStats> {
        if !self.is_registered(name) {
            return Err(self.fail(LoggerError::not_registered(name, Operation::DeleteLogs)));
        }
        purge_module_logs(&self.config.log_root, name)
            .map_err(|e| self.fail(LoggerError::io(name, e)))
    }

    /// [`delete_module_logs`](Self::delete_module_logs) for every registered
    /// module. Continues past failures and returns the first one.
    pub fn delete_all_logs(&self) -> LoggerResult<PurgeStats> {
        let mut total = PurgeStats::default();
        let mut first_error = None;

        for name in self.registered_modules() {
            match purge_module_logs(&self.config.log_root, &name) {
                Ok(stats) => total.merge(stats),
                Err(e) => {
                    let err = self.fail(LoggerError::io(&name, e));
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(total), Err)
    }

    /// Flush and drop every logger, `LOGGER` included
    pub fn shutdown(&self) {
        let loggers = std::mem::take(&mut *self.write_loggers());
        for (name, logger) in loggers {
            if let Err(e) = logger.flush() {
                error!(module = %name, error = %e, "Failed to flush module logger");
            }
        }
        debug!("Module logger registry shut down");
    }

    fn fail(&self, error: LoggerError) -> LoggerError {
        self.report(&error);
        error
    }

    /// Hand `error` to the hook and the `LOGGER` module, or to stderr when
    /// `LOGGER` is unavailable.
    fn report(&self, error: &LoggerError) {
        let hook = self
            .failure_hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(hook) = hook {
            hook(error);
        }

        match self.logger(LOGGER_MODULE_NAME) {
            Some(diagnostic) => {
                if let Err(e) = diagnostic.log(error.report_level(), format_args!("{error}")) {
                    emit_last_resort(error, Some(&e));
                }
            }
            None => emit_last_resort(error, None),
        }
    }

    fn read_loggers(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<ModuleLogger>>> {
        self.loggers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_loggers(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<ModuleLogger>>> {
        self.loggers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ModuleLoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoggerRegistry")
            .field("config", &self.config)
            .field("modules", &self.registered_modules())
            .finish_non_exhaustive()
    }
}

fn emit_last_resort(error: &LoggerError, cause: Option<&std::io::Error>) {
    let record = LogRecord::new(
        LOGGER_MODULE_NAME,
        LogLevel::Fatal,
        format!(
            "The {LOGGER_MODULE_NAME} module is unavailable : Logs are not saved into files ({error})"
        ),
    );
    eprintln!("{}", record.to_text_line());
    match cause {
        Some(cause) => error!(error = %error, cause = %cause, "Diagnostic logger failed"),
        None => error!(error = %error, "Diagnostic logger not registered"),
    }
}
