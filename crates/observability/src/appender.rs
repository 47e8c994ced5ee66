use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use scaffold_common::LogLevel;
use tracing::debug;

use crate::log_rotation::{cleanup_old_log_files, log_file_name};
use crate::record::LogRecord;

/// Log appender trait
pub trait LogAppender: Send + Sync {
    /// Append log record
    fn append(&self, record: &LogRecord) -> io::Result<()>;

    /// Flush pending output
    fn flush(&self) -> io::Result<()>;
}

/// Console appender - colored text lines on stdout
pub struct ConsoleAppender {
    colored: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Enable/disable colored output
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn color_code(level: LogLevel) -> &'static str {
        match level {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warning => "\x1b[33m\x1b[1m",
            LogLevel::Error => "\x1b[31m\x1b[1m",
            LogLevel::Fatal => "\x1b[1m\x1b[41m",
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAppender for ConsoleAppender {
    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let line = record.to_text_line();
        let mut stdout = io::stdout().lock();
        if self.colored {
            writeln!(stdout, "{}{}\x1b[0m", Self::color_code(record.level), line)
        } else {
            writeln!(stdout, "{line}")
        }
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// On-disk layout of a daily file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Text,
    Json,
}

impl RecordFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RecordFormat::Text => "txt",
            RecordFormat::Json => "json",
        }
    }

    fn render(&self, record: &LogRecord) -> io::Result<String> {
        match self {
            RecordFormat::Text => Ok(record.to_text_line()),
            RecordFormat::Json => record
                .to_json_line()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

struct OpenFile {
    date: String,
    writer: BufWriter<File>,
}

/// File appender writing `<dir>/<base>_<YYYY-MM-DD>.<ext>`.
///
/// A new file is opened when the local date of a record differs from the
/// open file's date; older files beyond `max_files` are then pruned. Every
/// record is flushed before `append` returns.
pub struct DailyFileAppender {
    dir: PathBuf,
    base_name: String,
    format: RecordFormat,
    max_files: usize,
    current: Mutex<Option<OpenFile>>,
}

impl DailyFileAppender {
    pub fn new<P: Into<PathBuf>>(
        dir: P,
        base_name: &str,
        format: RecordFormat,
        max_files: usize,
    ) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let appender = Self {
            dir,
            base_name: base_name.to_string(),
            format,
            max_files,
            current: Mutex::new(None),
        };

        let date = crate::log_rotation::current_date_string();
        let file = appender.open_for(&date)?;
        *appender.lock() = Some(file);
        Ok(appender)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Path of the file records are currently appended to
    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|open| self.path_for(&open.date))
    }

    fn path_for(&self, date: &str) -> PathBuf {
        self.dir.join(log_file_name(&self.base_name, date, self.format))
    }

    fn open_for(&self, date: &str) -> io::Result<OpenFile> {
        let path = self.path_for(date);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened log file: {:?}", path);

        cleanup_old_log_files(&self.dir, &self.base_name, self.format, self.max_files)?;

        Ok(OpenFile {
            date: date.to_string(),
            writer: BufWriter::new(file),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenFile>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogAppender for DailyFileAppender {
    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let line = self.format.render(record)?;
        let date = record.date_string();

        let mut current = self.lock();
        let needs_roll = current.as_ref().map_or(true, |open| open.date != date);
        if needs_roll {
            if let Some(mut previous) = current.take() {
                previous.writer.flush()?;
            }
            // The directory may have been removed since the last record
            fs::create_dir_all(&self.dir)?;
            *current = Some(self.open_for(&date)?);
        }

        if let Some(open) = current.as_mut() {
            writeln!(open.writer, "{line}")?;
            open.writer.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(open) => open.writer.flush(),
            None => Ok(()),
        }
    }
}

/// Memory appender - keeps records for inspection
pub struct MemoryAppender {
    records: Mutex<Vec<LogRecord>>,
    max_records: usize,
}

impl MemoryAppender {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            max_records,
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.message.clone()).collect()
    }

    pub fn records_by_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryAppender {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl LogAppender for MemoryAppender {
    fn append(&self, record: &LogRecord) -> io::Result<()> {
        let mut records = self.lock();
        records.push(record.clone());

        // Keep only the most recent records
        if records.len() > self.max_records {
            records.remove(0);
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn record_on(day: u32, message: &str) -> LogRecord {
        let mut record = LogRecord::new("Disk", LogLevel::Info, message);
        record.timestamp = Local.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
        record
    }

    #[test]
    fn test_daily_file_appends_and_flushes() {
        let temp_dir = TempDir::new().unwrap();
        let appender =
            DailyFileAppender::new(temp_dir.path(), "Disk", RecordFormat::Text, 31).unwrap();

        let record = LogRecord::new("Disk", LogLevel::Warning, "first");
        appender.append(&record).unwrap();
        appender.append(&LogRecord::new("Disk", LogLevel::Warning, "second")).unwrap();

        let path = appender.current_path().unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("Disk_{}.txt", record.date_string())
        );
        let contents = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[Disk] [warning] ---> first"));
    }

    #[test]
    fn test_zero_max_files_keeps_open_file() {
        let temp_dir = TempDir::new().unwrap();
        let appender =
            DailyFileAppender::new(temp_dir.path(), "Disk", RecordFormat::Text, 0).unwrap();

        let path = appender.current_path().unwrap();
        assert!(path.exists());

        appender.append(&LogRecord::new("Disk", LogLevel::Info, "kept")).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("kept"));
    }

    #[test]
    fn test_daily_file_rolls_on_date_change() {
        let temp_dir = TempDir::new().unwrap();
        let appender =
            DailyFileAppender::new(temp_dir.path(), "Disk", RecordFormat::Json, 2).unwrap();

        appender.append(&record_on(1, "a")).unwrap();
        appender.append(&record_on(2, "b")).unwrap();
        appender.append(&record_on(3, "c")).unwrap();

        assert!(!temp_dir.path().join("Disk_2024-01-01.json").exists());
        assert!(temp_dir.path().join("Disk_2024-01-03.json").exists());
        assert_eq!(
            appender.current_path().unwrap(),
            temp_dir.path().join("Disk_2024-01-03.json")
        );

        let line = fs::read_to_string(temp_dir.path().join("Disk_2024-01-03.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["message"], "c");
    }

    #[test]
    fn test_daily_file_recreates_removed_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("Disk");
        let appender = DailyFileAppender::new(&dir, "Disk", RecordFormat::Text, 31).unwrap();

        fs::remove_dir_all(&dir).unwrap();
        appender.append(&record_on(5, "again")).unwrap();

        assert!(dir.join("Disk_2024-01-05.txt").is_file());
    }

    #[test]
    fn test_memory_appender_limit() {
        let appender = MemoryAppender::new(2);
        for message in ["one", "two", "three"] {
            appender
                .append(&LogRecord::new("Mem", LogLevel::Debug, message))
                .unwrap();
        }
        assert_eq!(appender.messages(), vec!["two", "three"]);
        assert_eq!(appender.records_by_level(LogLevel::Debug).len(), 2);

        appender.clear();
        assert!(appender.is_empty());
    }
}
