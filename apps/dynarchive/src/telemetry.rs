//! Log setup shared by the binaries.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Map the `--debug` verbosity threshold to a log level filter.
///
/// No threshold keeps only warnings and errors.
#[must_use]
pub fn level_for(debug: Option<u8>) -> &'static str {
    match debug {
        None | Some(0) => "warn",
        Some(1..=9) => "info",
        Some(10..=49) => "debug",
        Some(_) => "trace",
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise the level derived from `--debug`.
/// Events go to stderr; stdout is reserved for item output.
pub fn init_tracing(debug: Option<u8>) -> Result<()> {
    let log_level = level_for(debug);
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
