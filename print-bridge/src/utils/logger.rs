//! Logging Infrastructure
//!
//! `RUST_LOG` wins over the configured level when set. With a log directory
//! the output goes to a daily rolling file instead of stdout.

use std::path::Path;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Install the global subscriber
///
/// Calling it twice is harmless, the second subscriber is ignored.
pub fn init_logger_with_file(log_level: Option<&str>, json: Option<bool>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match log_dir.and_then(prepare_log_dir) {
        Some(dir) => BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "print-bridge")),
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(writer);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if json.unwrap_or(false) {
        Box::new(fmt_layer.json())
    } else {
        Box::new(fmt_layer)
    };

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}

fn prepare_log_dir(dir: &str) -> Option<&str> {
    let path = Path::new(dir);
    if !path.exists()
        && let Err(e) = std::fs::create_dir_all(path)
    {
        eprintln!("Cannot create log directory {}: {}, logging to stdout", dir, e);
        return None;
    }
    Some(dir)
}
