//! # 常量定义
//!
//! 设置文件和日志注册表共用的常量

/// Name of the registry's own diagnostic module.
pub const LOGGER_MODULE_NAME: &str = "LOGGER";

/// Modules written into a freshly generated settings file.
pub const DEFAULT_MODULE_NAMES: &[&str] = &[LOGGER_MODULE_NAME];

/// Settings file read by a default-constructed store.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.ini";

/// Log directory written into a generated settings file.
pub const DEFAULT_LOG_PATH: &str = "LOGS";

/// Root directory of the per-module log tree.
pub const DEFAULT_LOG_ROOT: &str = "Logs";

/// 默认服务端口
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Ports must be strictly greater than this.
pub const MIN_SERVER_PORT_EXCLUSIVE: u16 = 1024;

/// Ports must be strictly lower than this.
pub const MAX_SERVER_PORT_EXCLUSIVE: u16 = 65535;

/// Daily files kept per sink before the oldest are pruned.
pub const DEFAULT_MAX_LOG_FILES: usize = 31;

/// Date format used in rolling log file names.
pub const LOG_FILE_DATE_FORMAT: &str = "%Y-%m-%d";
