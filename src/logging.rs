//! Tracing setup for the command line runner.
//!
//! Events go to stderr so that stdout stays free for progress and results.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    Filter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global subscriber. `RUST_LOG` wins over `level`, which
/// defaults to `info`. Later calls are no-ops.
pub fn init(level: Option<&str>) -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let env_filter = build_env_filter(level)?;
    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());
    Ok(())
}

fn build_env_filter(level: Option<&str>) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let filter = level.unwrap_or("info");
    EnvFilter::try_new(filter).map_err(|source| LoggingError::Filter {
        filter: filter.to_string(),
        source,
    })
}
