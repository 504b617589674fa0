//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log to stderr so log lines never interleave with rendered output.
///
/// `RUST_LOG` wins when set. Otherwise the level is `warn`, or `debug` for
/// the showcase crates with `--verbose`.
pub fn init_logger(verbose: bool, json: bool) -> Result<()> {
    let default = if verbose {
        "warn,showcase_data=debug,showcase_cache=debug,showcase_view=debug,showcase_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {e}"))
}
