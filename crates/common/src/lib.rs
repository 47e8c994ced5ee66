//! # scaffold-common
//!
//! 设置存储与模块日志注册表共享的基础模块
//!
//! 本模块提供：
//! - 通用常量定义
//! - 六级日志级别 `LogLevel`
//! - 进程级单例容器 `Singleton`
//! - 模块名校验

pub mod constants;
pub mod log_level;
pub mod module_name;
pub mod singleton;

pub use constants::*;
pub use log_level::{LogLevel, ParseLogLevelError};
pub use module_name::is_valid_module_name;
pub use singleton::Singleton;
