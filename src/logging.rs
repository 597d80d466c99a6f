//! Structured logging setup built on the `tracing` ecosystem.
//!
//! All logs go to **stderr**; hosts that embed the engine commonly reserve
//! stdout for their own wire protocol.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: controls log levels (e.g., `info`, `debug`, `attrkit=trace`)
//!
//! ```bash
//! # Show validation-engine debug logs only
//! RUST_LOG=warn,attrkit=debug ./my-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the default logging subscriber.
///
/// Writes to stderr, respects the `RUST_LOG` environment variable, and
/// defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], but with a caller-chosen default level used when
/// `RUST_LOG` is not set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning `false` if a global subscriber was
/// already set. Useful in tests and hosts that may initialize more than
/// once.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so
    // initialization itself is not unit-testable here. Exercise the filter
    // syntax instead.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("attrkit=debug").is_ok());
        assert!(EnvFilter::try_new("warn,attrkit=trace").is_ok());
    }
}
