use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Initialize tracing for the binary.
///
/// Compact output goes to stdout, `warn` and above unless `verbose`. When a
/// log file is given every event passing the `RUST_LOG` filter (default
/// `info`) is appended to it as plain text.
pub fn init(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stdout_level = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let stdout_layer = fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(stdout_level);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
