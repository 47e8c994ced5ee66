use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scaffold::common::{init_logging, LOG_FORMATS};
use scaffold::AppContext;
use scaffold_common::{LogLevel, DEFAULT_SETTINGS_FILE};
use scaffold_config::{ParsePolicy, SettingsStore};
use tracing::info;

/// 设置与模块日志管理工具
#[derive(Parser, Debug)]
#[command(name = "scaffold")]
#[command(version = "1.0.0")]
#[command(about = "INI 设置加载与模块日志管理")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 设置文件路径
    #[arg(short, long, env = "SCAFFOLD_SETTINGS", default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// 严格解析：任何缺失或非法字段都会回退到默认设置
    #[arg(long)]
    strict: bool,

    /// 日志格式
    #[arg(long, value_parser = LOG_FORMATS, default_value = "pretty")]
    log_format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 加载设置并以JSON输出
    Show,
    /// 注册所有已配置模块并输出其日志级别
    Levels,
    /// 向模块写入一条日志
    Log {
        /// 模块名称
        #[arg(short, long)]
        module: String,
        /// 日志级别 (trace, debug, info, warning, error, fatal)
        #[arg(short, long, default_value = "info")]
        level: LogLevel,
        /// 日志内容
        message: String,
    },
    /// 删除历史日志并清空当天日志
    PurgeLogs {
        /// 仅处理该模块
        #[arg(short, long)]
        module: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let policy = if cli.strict {
        ParsePolicy::Strict
    } else {
        ParsePolicy::Lenient
    };
    let store = SettingsStore::with_file(&cli.settings).with_policy(policy);
    let context = AppContext::new(store)?;

    // 日志级别来自设置文件，RUST_LOG 优先
    init_logging(context.settings().log_level(), &cli.log_format)?;
    context.report_load_outcome();

    let result = run(&context, cli.command);
    context.shutdown();
    result
}

fn run(context: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Show => {
            let snapshot = context.settings().snapshot();
            let json = serde_json::to_string_pretty(&snapshot).context("序列化设置失败")?;
            println!("{json}");
        }
        Commands::Levels => {
            context.register_configured_modules()?;
            let levels = context.registry().get_log_levels();
            let json = serde_json::to_string_pretty(&levels).context("序列化日志级别失败")?;
            println!("{json}");
        }
        Commands::Log {
            module,
            level,
            message,
        } => {
            context.register_module(&module)?;
            context
                .registry()
                .log(module.trim(), level, format_args!("{message}"));
        }
        Commands::PurgeLogs { module } => {
            let stats = match module {
                Some(name) => {
                    context.register_module(&name)?;
                    context
                        .registry()
                        .delete_module_logs(name.trim())
                        .with_context(|| format!("删除模块日志失败: {name}"))?
                }
                None => {
                    context.register_configured_modules()?;
                    context.registry().delete_all_logs().context("删除日志失败")?
                }
            };
            info!(
                truncated = stats.truncated,
                removed = stats.removed,
                "日志清理完成"
            );
        }
    }
    Ok(())
}
