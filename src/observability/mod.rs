//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / poller / chain client produce:
//!     → logging.rs (structured log events, submission id in spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
