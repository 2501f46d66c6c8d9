//! Logging initialization for stagehand.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `HarnessConfig`. The filter comes from `STAGEHAND_LOG`, not `RUST_LOG`:
//! `RUST_LOG` is the children's verbosity and is rewritten per output mode.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use stagehand_core::config::GeneralConfig;

use crate::error::CliError;

/// Environment variable holding the harness's own log filter.
pub const LOG_FILTER_VAR: &str = "STAGEHAND_LOG";

/// Build the log filter, preferring `STAGEHAND_LOG` over the config level.
pub fn env_filter(config: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// All formats write to stderr so they interleave with child output.
///
/// # Formats
///
/// * `"compact"` - One line per event (default)
/// * `"pretty"` - Multi-line human-readable output
/// * `"json"` - Machine-parseable JSON lines
pub fn init_tracing(config: &GeneralConfig) -> Result<(), CliError> {
    let filter = env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format.as_str() {
        "compact" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        "pretty" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        "json" => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        other => {
            return Err(CliError::Logging(format!(
                "unknown log format '{other}', expected 'compact', 'pretty' or 'json'"
            )));
        }
    };

    result.map_err(|e| CliError::Logging(format!("failed to initialize tracing subscriber: {e}")))
}
