//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON lines for production, pretty output for development
//! - `RUST_LOG` overrides the configured level
//! - Private keys and tokens are never passed to log macros

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

pub use tracing_subscriber::util::TryInitError;

/// Accepted values of `observability.log_format`.
pub const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(level: &str) -> String {
    format!("da_submitter={level},warn")
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));
    let format = config.log_format.as_str();

    tracing_subscriber::registry()
        .with(filter)
        .with((format == "json").then(|| fmt::layer().json().with_current_span(true)))
        .with((format == "compact").then(|| fmt::layer().compact()))
        .with((format != "json" && format != "compact").then(|| fmt::layer()))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("debug"), "da_submitter=debug,warn");
    }
}
