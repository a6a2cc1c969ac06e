//! Logging initialization

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;

/// Install a global tracing subscriber for an embedding application
///
/// `RUST_LOG` takes precedence over the configured level. In debug mode logs
/// go to a temporary file whose path is returned; otherwise they go to stderr.
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(config: &LoggerConfig) -> Option<PathBuf> {
    if config.debug {
        let temp_file = tempfile::Builder::new()
            .prefix("kubecollect-")
            .suffix(".log")
            .tempfile()
            .and_then(|f| f.keep().map_err(|e| e.error))
            .map(|(_, path)| path)
            .unwrap_or_else(|_| {
                std::env::temp_dir().join(format!("kubecollect-{}.log", std::process::id()))
            });

        let file = match std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_file)
        {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Failed to open log file {}: {}", temp_file.display(), err);
                return None;
            }
        };

        let installed = tracing_subscriber::fmt()
            .with_writer(file)
            .with_env_filter(filter("debug"))
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .try_init();
        if let Err(err) = installed {
            tracing::debug!(
                "Keeping existing subscriber, {} stays empty: {}",
                temp_file.display(),
                err
            );
        }

        Some(temp_file)
    } else {
        if let Err(err) = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter(&config.level))
            .with_target(true)
            .try_init()
        {
            tracing::debug!("Keeping existing subscriber: {}", err);
        }
        None
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
