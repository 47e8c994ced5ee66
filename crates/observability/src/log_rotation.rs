use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use scaffold_common::LOG_FILE_DATE_FORMAT;
use tracing::{debug, info, warn};

use crate::appender::RecordFormat;

/// 当前本地日期，格式 YYYY-MM-DD
pub fn current_date_string() -> String {
    Local::now().format(LOG_FILE_DATE_FORMAT).to_string()
}

/// `<Module>_<date>.<ext>`
pub fn log_file_name(module: &str, date: &str, format: RecordFormat) -> String {
    format!("{module}_{date}.{}", format.extension())
}

/// `<root>/<Module>`
pub fn module_log_dir(root: &Path, module: &str) -> PathBuf {
    root.join(module)
}

/// Result of clearing one or more module directories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeStats {
    /// Current-day files emptied
    pub truncated: usize,
    /// Historical files deleted
    pub removed: usize,
}

impl PurgeStats {
    pub fn merge(&mut self, other: PurgeStats) {
        self.truncated += other.truncated;
        self.removed += other.removed;
    }
}

/// 清理旧的日志文件
///
/// Keeps the `max_files` newest `<base>_<date>.<ext>` files in `dir`, and
/// never fewer than one. Dates sort lexicographically, so the file name
/// orders them.
pub fn cleanup_old_log_files(
    dir: &Path,
    base_name: &str,
    format: RecordFormat,
    max_files: usize,
) -> io::Result<usize> {
    let prefix = format!("{base_name}_");
    let suffix = format!(".{}", format.extension());

    let mut log_files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with(&prefix) && file_name.ends_with(&suffix) && entry.path().is_file()
        {
            log_files.push((file_name, entry.path()));
        }
    }

    // 最新的在前
    log_files.sort_by(|a, b| b.0.cmp(&a.0));

    // The newest file is the one being written
    let mut removed = 0;
    for (_, path) in log_files.iter().skip(max_files.max(1)) {
        match fs::remove_file(path) {
            Ok(()) => {
                removed += 1;
                info!("Removed old log file: {:?}", path);
            }
            Err(e) => warn!("Failed to remove old log file {:?}: {}", path, e),
        }
    }
    Ok(removed)
}

/// Empty the current-day text and JSON files of `module` and delete every
/// other file in its directory.
///
/// The current-day files are created empty if they do not exist yet. A
/// missing module directory is treated as already clean.
pub fn purge_module_logs(root: &Path, module: &str) -> io::Result<PurgeStats> {
    let dir = module_log_dir(root, module);
    let mut stats = PurgeStats::default();
    if !dir.is_dir() {
        debug!(module, dir = %dir.display(), "No log directory to purge");
        return Ok(stats);
    }

    let date = current_date_string();
    let current: Vec<PathBuf> = [RecordFormat::Text, RecordFormat::Json]
        .into_iter()
        .map(|format| dir.join(log_file_name(module, &date, format)))
        .collect();

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if current.contains(&path) || !path.is_file() {
            continue;
        }
        fs::remove_file(&path)?;
        stats.removed += 1;
    }

    for path in &current {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        stats.truncated += 1;
    }

    info!(
        module,
        truncated = stats.truncated,
        removed = stats.removed,
        "Module logs purged"
    );
    Ok(stats)
}
