//! Diagnostics
//!
//! Structured logs go to stderr; results go to stdout.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set. The binary and the library
/// share the `keysweep` target prefix.
pub const DEFAULT_ENV_FILTER: &str = "keysweep=info";

pub fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_ENV_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to initialize tracing subscriber")
}
