//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber with a compact formatter. The
//! level comes from `RUST_LOG` when set, otherwise from the `--log-level`
//! flag.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber. Call once, early in `main`.
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact());

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    Ok(())
}
