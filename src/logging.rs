//! Logging bootstrap

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialize console logging. Level comes from `RUST_LOG`, default info.
/// Logs go to stderr so the rendered tables on stdout stay clean.
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}
