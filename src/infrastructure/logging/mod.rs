//! Logging infrastructure with file output support for production runs.

use crate::infrastructure::config::paths;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging with console and optional file output.
///
/// In production mode, logs are also written to:
/// - macOS: ~/Library/Application Support/remindly/logs/
/// - Windows: %APPDATA%\remindly\logs\
/// - Linux: ~/.config/remindly/logs/
pub fn setup(is_production: bool) {
    let filter = if is_production { "info" } else { "warn,remindly=debug" };

    // Console goes to stderr so command output on stdout stays clean
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter_or(filter));

    // File layer (production only)
    let file_layer = if is_production {
        let log_dir = paths::log_dir();

        // Create log directory if it doesn't exist
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
            None
        } else {
            // Create daily rotating file appender
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "remindly.log");

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false) // No ANSI colors in file output
                    .with_writer(file_appender)
                    .with_filter(EnvFilter::new("info")),
            )
        }
    } else {
        None
    };

    // Initialize subscriber with appropriate layers
    let installed = match file_layer {
        Some(file_layer) => {
            tracing_subscriber::registry()
                .with(console_layer)
                .with(file_layer)
                .try_init()
        }
        None => tracing_subscriber::registry().with(console_layer).try_init(),
    };
    if installed.is_err() {
        // A subscriber is already set (tests, embedding hosts)
        return;
    }

    if is_production {
        // Log the log directory path after initialization
        tracing::info!("File logging enabled: {:?}", paths::log_dir());
    }
    tracing::info!("Logging initialized (production={})", is_production);
}

/// `RUST_LOG` wins over the built-in default directives.
fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
