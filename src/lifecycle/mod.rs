//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     caller / signal → CancelSignal::cancel → poller returns Cancelled
//!
//! Signals (signals.rs):
//!     SIGINT → cancel the in-flight confirmation
//! ```
//!
//! # Design Decisions
//! - The poller deadline is the primary bound; cancellation only shortens it
//! - Cancelling never touches network-side state

pub mod cancel;
pub mod signals;

pub use cancel::CancelSignal;
