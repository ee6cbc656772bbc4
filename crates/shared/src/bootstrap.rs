use anyhow::{Context, Result};
use nudge_core::ParserConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize dotenvy
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Name of the log file for a service started at `started`
fn log_file_name(service_name: &str, started: &str) -> String {
    format!("nudge-{service_name}.log.{started}.jsonl")
}

/// Initialize tracing with optional file logging
pub fn init_tracing(service_name: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // If LOG_DIR is set, use it. Default to "logs/app"
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs/app".to_string());

    let now = chrono::Local::now().format("%y-%m-%d-%H-%M-%S").to_string();
    let file_appender =
        tracing_appender::rolling::never(&log_dir, log_file_name(service_name, &now));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let default_filter = format!("info,{service_name}=debug,nudge_core=debug");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    Some(guard)
}

/// Load parser defaults from the environment
pub fn init_parser_config() -> Result<ParserConfig> {
    let config = ParserConfig::from_env().context("Failed to load parser configuration")?;

    tracing::info!(
        "✓ Parser configured (default time: {}, max reminders: {}, timezone: {})",
        config.default_time.format("%H:%M"),
        config.max_reminders,
        config.default_timezone
    );

    Ok(config)
}
