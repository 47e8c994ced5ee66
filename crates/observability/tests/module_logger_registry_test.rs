use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scaffold_observability::{
    current_date_string, log_critical, log_debug, log_error, log_info, log_trace, log_warning,
    LogLevel, LoggerError, MemoryAppender, ModuleLoggerRegistry, Operation, RegistryConfig,
};
use tempfile::TempDir;

fn registry_in(dir: &TempDir) -> ModuleLoggerRegistry {
    ModuleLoggerRegistry::new(
        RegistryConfig::default()
            .with_log_root(dir.path())
            .with_console(false),
    )
}

fn current_file(root: &Path, module: &str, ext: &str) -> PathBuf {
    root.join(module)
        .join(format!("{module}_{}.{ext}", current_date_string()))
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn attach_diagnostics(registry: &ModuleLoggerRegistry) -> Arc<MemoryAppender> {
    let diagnostics = Arc::new(MemoryAppender::default());
    registry
        .add_appender("LOGGER", diagnostics.clone())
        .unwrap();
    diagnostics
}

#[test]
fn test_register_creates_module_files() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);

    registry.register_module("Network").unwrap();

    assert!(current_file(temp_dir.path(), "Network", "txt").is_file());
    assert!(current_file(temp_dir.path(), "Network", "json").is_file());
    assert_eq!(registry.registered_modules(), vec!["LOGGER", "Network"]);
}

#[test]
fn test_duplicate_registration_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    let diagnostics = attach_diagnostics(&registry);

    registry.register_module("Network").unwrap();
    registry.set_module_log_level("Network", LogLevel::Error).unwrap();
    registry.register_module("Network").unwrap();

    assert_eq!(registry.len(), 2);
    // The original handle survives, level included
    assert_eq!(registry.get_module_level("Network"), "error");

    let warnings = diagnostics.records_by_level(LogLevel::Warning);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "Module Network already registered");
    assert_eq!(warnings[0].module, "LOGGER");
}

#[test]
fn test_records_at_or_above_threshold_reach_both_files() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    registry.register_module("Storage").unwrap();
    registry.set_module_log_level("Storage", LogLevel::Warning).unwrap();

    log_trace!(registry, "Storage", "dropped {}", 1);
    log_debug!(registry, "Storage", "dropped {}", 2);
    log_info!(registry, "Storage", "dropped {}", 3);
    log_warning!(registry, "Storage", "kept {}", 1);
    log_error!(registry, "Storage", "kept {}", 2);
    log_critical!(registry, "Storage", "kept {}", 3);

    let text = read_lines(&current_file(temp_dir.path(), "Storage", "txt"));
    assert_eq!(text.len(), 3);
    assert!(text[0].ends_with("[Storage] [warning] ---> kept 1"));
    assert!(text[1].ends_with("[Storage] [error] ---> kept 2"));
    assert!(text[2].ends_with("[Storage] [critical] ---> kept 3"));

    let json = read_lines(&current_file(temp_dir.path(), "Storage", "json"));
    assert_eq!(json.len(), 3);
    for (line, expected) in json.iter().zip(["warning", "error", "critical"]) {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["name"], "Storage");
        assert_eq!(value["level"], expected);
        assert_eq!(value["process"], std::process::id());
        assert!(value["thread"].is_u64());
        assert!(value["time"].is_string());
    }
}

#[test]
fn test_below_threshold_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    registry.register_module("Quiet").unwrap();
    registry.set_module_log_level("Quiet", LogLevel::Fatal).unwrap();

    for i in 0..10 {
        log_error!(registry, "Quiet", "message {i}");
    }

    assert!(read_lines(&current_file(temp_dir.path(), "Quiet", "txt")).is_empty());
    assert!(read_lines(&current_file(temp_dir.path(), "Quiet", "json")).is_empty());
}

#[test]
fn test_write_to_unknown_module_goes_to_logger() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    let diagnostics = attach_diagnostics(&registry);

    log_info!(registry, "Missing", "never written");

    assert!(!temp_dir.path().join("Missing").exists());
    assert_eq!(
        diagnostics.messages(),
        vec!["Unable to write log : Module Missing is not registered"]
    );
    let logger_txt = read_lines(&current_file(temp_dir.path(), "LOGGER", "txt"));
    assert_eq!(logger_txt.len(), 1);
    assert!(logger_txt[0].contains("[LOGGER] [error]"));
}

#[test]
fn test_delete_all_logs_truncates_current_and_removes_history() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    registry.register_module("Alpha").unwrap();
    registry.register_module("Beta").unwrap();

    log_info!(registry, "Alpha", "a");
    log_info!(registry, "Beta", "b");
    let history = [
        temp_dir.path().join("Alpha").join("Alpha_2001-01-01.txt"),
        temp_dir.path().join("Alpha").join("Alpha_2001-01-01.json"),
        temp_dir.path().join("Beta").join("notes.txt"),
    ];
    for path in &history {
        fs::write(path, "historical\n").unwrap();
    }

    let stats = registry.delete_all_logs().unwrap();

    assert_eq!(stats.removed, 3);
    // LOGGER, Alpha and Beta each have a text and a JSON file
    assert_eq!(stats.truncated, 6);
    for path in &history {
        assert!(!path.exists(), "{path:?} should be gone");
    }
    for module in ["Alpha", "Beta", "LOGGER"] {
        for ext in ["txt", "json"] {
            let path = current_file(temp_dir.path(), module, ext);
            assert_eq!(fs::metadata(&path).unwrap().len(), 0, "{path:?}");
        }
    }

    // Writing continues into the truncated file
    log_info!(registry, "Alpha", "after purge");
    let lines = read_lines(&current_file(temp_dir.path(), "Alpha", "txt"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("---> after purge"));
}

#[test]
fn test_delete_module_logs_only_touches_that_module() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    registry.register_module("Alpha").unwrap();
    registry.register_module("Beta").unwrap();
    log_info!(registry, "Alpha", "a");
    log_info!(registry, "Beta", "b");

    registry.delete_module_logs("Alpha").unwrap();

    assert!(read_lines(&current_file(temp_dir.path(), "Alpha", "txt")).is_empty());
    assert_eq!(read_lines(&current_file(temp_dir.path(), "Beta", "txt")).len(), 1);
}

#[test]
fn test_delete_logs_of_unknown_module_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let registry = registry_in(&temp_dir);
    let diagnostics = attach_diagnostics(&registry);

    match registry.delete_module_logs("Nobody") {
        Err(LoggerError::ModuleNotRegistered { module, operation }) => {
            assert_eq!(module, "Nobody");
            assert_eq!(operation, Operation::DeleteLogs);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(diagnostics.records_by_level(LogLevel::Error).len(), 1);
}

#[test]
fn test_concurrent_registration_and_writes() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Arc::new(registry_in(&temp_dir));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                registry.register_module("Shared").unwrap();
                for j in 0..25 {
                    log_info!(registry, "Shared", "thread {i} record {j}");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 2);
    let lines = read_lines(&current_file(temp_dir.path(), "Shared", "txt"));
    assert_eq!(lines.len(), 100);
    assert_eq!(
        read_lines(&current_file(temp_dir.path(), "Shared", "json")).len(),
        100
    );
}
