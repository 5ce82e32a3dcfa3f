use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout only ever carries JSON.
///
/// The level comes from `RUST_LOG` (e.g. `RUST_LOG=debug jsondump`), default `warn`.
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
