use anyhow::{Context, Result};
use scaffold_common::LogLevel;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 支持的日志输出格式
pub const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// 初始化日志系统
///
/// `RUST_LOG` wins when set; otherwise `level` becomes the filter. Output
/// goes to stderr so command output on stdout stays parseable.
pub fn init_logging(level: LogLevel, log_format: &str) -> Result<()> {
    let directive = tracing::level_filters::LevelFilter::from(level).to_string();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
        _ => {
            return Err(anyhow::anyhow!("不支持的日志格式: {log_format}"));
        }
    }

    Ok(())
}
