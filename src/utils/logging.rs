use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use anyhow::Result;

/// Initializes the logging system for the application
///
/// Logs go to the console and, when a directory is configured, to `lift-adapter_{current_date}.log` inside it.
/// The level comes from `RUST_LOG` if set, otherwise from `default_level`; `lapin` is held at "warn" to reduce noise.
///
/// # Returns
///
/// * `Ok(Some(WorkerGuard))`: file logging is active; keep the guard alive for the process lifetime
/// * `Ok(None)`: console only
pub fn init_logger(default_level: &str, log_file_path: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},lapin=warn", default_level)))?;

    let format = fmt::format()
        .with_timer(fmt::time::LocalTime::rfc_3339())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let console_layer = fmt::Layer::default()
        .event_format(format.clone().with_ansi(true))
        .with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry().with(env_filter).with(console_layer);

    if let Some(path) = log_file_path {
        std::fs::create_dir_all(&path)?;

        let file_name = format!(
            "lift-adapter_{}.log",
            chrono::Local::now().format("%Y-%m-%d")
        );
        let file_appender = RollingFileAppender::new(Rotation::NEVER, path, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::Layer::default()
            .event_format(format)
            .with_writer(non_blocking);

        tracing::subscriber::set_global_default(subscriber.with(file_layer))?;

        tracing::info!("Logging initialized successfully");
        Ok(Some(guard))
    } else {
        tracing::subscriber::set_global_default(subscriber)?;

        tracing::info!("Logging initialized successfully (console only)");
        Ok(None)
    }
}
