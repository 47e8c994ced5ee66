use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use scaffold_common::{LogLevel, LOG_FILE_DATE_FORMAT};
use serde::Serialize;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Small, stable number for the calling thread
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// One formatted log event, shared by every appender of a module
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub module: String,
    pub level: LogLevel,
    pub process: u32,
    pub thread: u64,
    pub message: String,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    time: String,
    name: &'a str,
    level: &'static str,
    process: u32,
    thread: u64,
    message: &'a str,
}

impl LogRecord {
    pub fn new<M: Into<String>, S: Into<String>>(module: M, level: LogLevel, message: S) -> Self {
        Self {
            timestamp: Local::now(),
            module: module.into(),
            level,
            process: std::process::id(),
            thread: current_thread_id(),
            message: message.into(),
        }
    }

    /// Local date the record belongs to, as used in file names
    pub fn date_string(&self) -> String {
        self.timestamp.format(LOG_FILE_DATE_FORMAT).to_string()
    }

    /// `[2024-05-01 12:00:00.123] [Module] [info] ---> message`
    pub fn to_text_line(&self) -> String {
        format!(
            "[{}] [{}] [{}] ---> {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.module,
            self.level.severity_label(),
            self.message
        )
    }

    /// Single-line JSON object with time, name, level, process, thread and message
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&JsonLine {
            time: self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f%z").to_string(),
            name: &self.module,
            level: self.level.severity_label(),
            process: self.process,
            thread: self.thread,
            message: &self.message,
        })
    }
}
