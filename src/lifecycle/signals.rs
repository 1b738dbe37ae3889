//! OS signal handling.
//!
//! Ctrl-C while a confirmation is being polled cancels the poll instead of
//! killing the process, so the caller still gets a result with the handle.

use crate::lifecycle::cancel::CancelSignal;

/// Spawn a task that cancels `signal` on the first SIGINT.
pub fn cancel_on_ctrl_c(signal: CancelSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, cancelling confirmation");
                signal.cancel();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    })
}
