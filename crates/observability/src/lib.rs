//! # scaffold-observability
//!
//! 按模块划分的日志注册表
//!
//! Every registered module owns an independent logger with its own
//! threshold, a console appender and two daily rolling files under
//! `<log_root>/<Module>/`. Misuse never panics: it is reported through the
//! registry's own `LOGGER` module and an optional failure hook.

pub mod appender;
pub mod log_rotation;
pub mod record;
pub mod registry;

use std::fmt;

pub use appender::{ConsoleAppender, DailyFileAppender, LogAppender, MemoryAppender, RecordFormat};
pub use log_rotation::{current_date_string, PurgeStats};
pub use record::LogRecord;
pub use registry::{FailureHook, ModuleLogger, ModuleLoggerRegistry, RegistryConfig};
pub use scaffold_common::LogLevel;

pub type LoggerResult<T> = Result<T, LoggerError>;

/// Registry operation that can be attempted against an unknown module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    WriteLog,
    SetLevel,
    GetLevel,
    DeleteLogs,
    AddAppender,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::WriteLog => "write log",
            Operation::SetLevel => "set level",
            Operation::GetLevel => "get level",
            Operation::DeleteLogs => "delete logs",
            Operation::AddAppender => "add appender",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Module name can not be empty or contain only whitespace")]
    EmptyModuleName,

    #[error("Invalid module name {0:?}: only letters, digits and '_' are allowed")]
    InvalidModuleName(String),

    #[error("Module {0} already registered")]
    AlreadyRegistered(String),

    #[error("Unable to {operation} : Module {module} is not registered")]
    ModuleNotRegistered { module: String, operation: Operation },

    #[error("Log file failure for module {module}: {source}")]
    Io {
        module: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    pub fn not_registered(module: &str, operation: Operation) -> Self {
        Self::ModuleNotRegistered {
            module: module.to_string(),
            operation,
        }
    }

    pub fn io(module: &str, source: std::io::Error) -> Self {
        Self::Io {
            module: module.to_string(),
            source,
        }
    }

    /// Level at which the error is written to the `LOGGER` module
    pub fn report_level(&self) -> LogLevel {
        match self {
            LoggerError::AlreadyRegistered(_) => LogLevel::Warning,
            _ => LogLevel::Error,
        }
    }
}

/// `log_trace!(registry, "Module", "x = {}", x)`
#[macro_export]
macro_rules! log_trace {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.trace($module, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.debug($module, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_info {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.info($module, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.warning($module, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_error {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.error($module, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($registry:expr, $module:expr, $($arg:tt)+) => {
        $registry.critical($module, format_args!($($arg)+))
    };
}
