//! Bounded-time confirmation polling.
//!
//! # Responsibilities
//! - Query a backend on a fixed interval until a terminal status
//! - Stop at the deadline or when the caller cancels
//! - Re-fetch the blob after success and compare commitments
//!
//! One loop serves every backend; what counts as terminal is injected
//! through [`TerminalMarkers`].

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::schema::PollerConfig;
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::submission::backend::StatusProbe;
use crate::submission::error::{DaResult, SubmitError};
use crate::submission::types::{
    BackendKind, BackendStatus, Commitment, ConfirmationState, SubmissionHandle, SubmissionResult, Verification,
};

/// Predicates deciding which backend statuses end polling.
#[derive(Clone, Copy)]
pub struct TerminalMarkers {
    pub is_success: fn(&BackendStatus) -> bool,
    pub is_failure: fn(&BackendStatus) -> bool,
}

impl TerminalMarkers {
    /// Success only once the backend reports finality.
    pub fn finalized() -> Self {
        Self {
            is_success: |s| matches!(s, BackendStatus::Finalized),
            is_failure: |s| matches!(s, BackendStatus::Failed(_)),
        }
    }

    /// Success as soon as the blob is included.
    pub fn included() -> Self {
        Self {
            is_success: |s| matches!(s, BackendStatus::Confirmed | BackendStatus::Finalized),
            is_failure: |s| matches!(s, BackendStatus::Failed(_)),
        }
    }

    /// Local state for one observed status.
    pub fn classify(&self, status: &BackendStatus) -> ConfirmationState {
        if (self.is_failure)(status) {
            ConfirmationState::Failed
        } else if (self.is_success)(status) {
            match status {
                BackendStatus::Finalized => ConfirmationState::Finalized,
                _ => ConfirmationState::Confirmed,
            }
        } else {
            match status {
                BackendStatus::Pending => ConfirmationState::Pending,
                _ => ConfirmationState::Processing,
            }
        }
    }
}

impl std::fmt::Debug for TerminalMarkers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalMarkers").finish_non_exhaustive()
    }
}

/// Shortest accepted polling interval; a zero interval is raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Interval, deadline and terminal markers of one confirmation run.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
    pub markers: TerminalMarkers,
}

impl PollPolicy {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            deadline,
            markers: TerminalMarkers::included(),
        }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        Self::new(config.interval(), config.deadline())
    }

    pub fn with_markers(mut self, markers: TerminalMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Interval actually used by the ticker.
    pub fn tick_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

enum Race<T> {
    Done(T),
    Deadline,
    Cancelled,
}

// Cancellation wins over everything. An operation that is ready at the
// deadline instant still counts, so a tick landing exactly on it is polled.
async fn race<F: Future>(fut: F, deadline: Instant, cancel: Option<&CancelSignal>) -> Race<F::Output> {
    let cancelled = async {
        match cancel {
            Some(signal) => signal.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Race::Cancelled,
        out = fut => Race::Done(out),
        _ = time::sleep_until(deadline) => Race::Deadline,
    }
}

/// Drives a submission handle to a terminal [`ConfirmationState`].
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationPoller {
    policy: PollPolicy,
}

struct Progress {
    state: ConfirmationState,
    last_status: Option<BackendStatus>,
    verification: Option<Verification>,
    polls: u32,
}

impl ConfirmationPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Poll `handle` until a terminal state.
    ///
    /// The first query is made one interval after the call. With `expected`
    /// set, a success is only reported once the re-fetched commitment matches
    /// it byte for byte. Returns within the deadline plus one interval.
    /// Status or fetch failures end polling with an error that carries the
    /// handle and the last observed status.
    pub async fn confirm<P>(
        &self,
        probe: &P,
        handle: &SubmissionHandle,
        expected: Option<&Commitment>,
        cancel: Option<&CancelSignal>,
    ) -> DaResult<SubmissionResult>
    where
        P: StatusProbe + ?Sized,
    {
        let backend = probe.kind();
        let started = Instant::now();
        let deadline = started + self.policy.deadline;

        let interval = self.policy.tick_interval();
        let mut ticker = time::interval_at(started + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut progress = Progress {
            state: ConfirmationState::Pending,
            last_status: None,
            verification: None,
            polls: 0,
        };

        tracing::debug!(
            backend = %backend,
            handle = %handle,
            interval_ms = interval.as_millis() as u64,
            deadline_secs = self.policy.deadline.as_secs(),
            "Confirmation polling started"
        );

        while !progress.state.is_terminal() {
            match race(ticker.tick(), deadline, cancel).await {
                Race::Done(_) => {}
                Race::Deadline => {
                    progress.state = progress.state.advance(ConfirmationState::TimedOut);
                    break;
                }
                Race::Cancelled => {
                    progress.state = progress.state.advance(ConfirmationState::Cancelled);
                    break;
                }
            }

            progress.polls += 1;
            metrics::record_poll_tick(backend);

            let status = match race(probe.status(handle), deadline, cancel).await {
                Race::Done(Ok(status)) => status,
                Race::Done(Err(e)) => return Err(self.abort(handle, &progress, started, e, backend)),
                Race::Deadline => {
                    progress.state = progress.state.advance(ConfirmationState::TimedOut);
                    break;
                }
                Race::Cancelled => {
                    progress.state = progress.state.advance(ConfirmationState::Cancelled);
                    break;
                }
            };

            let mut next = self.policy.markers.classify(&status);
            tracing::debug!(
                backend = %backend,
                handle = %handle,
                poll = progress.polls,
                status = ?status,
                "Status observed"
            );
            progress.last_status = Some(status);

            if next.is_success() {
                if let Some(expected) = expected {
                    let fetched = match race(probe.fetch(handle), deadline, cancel).await {
                        Race::Done(Ok(fetched)) => fetched,
                        Race::Done(Err(e)) => {
                            return Err(self.abort(handle, &progress, started, e, backend))
                        }
                        Race::Deadline => {
                            progress.state = progress.state.advance(ConfirmationState::TimedOut);
                            break;
                        }
                        Race::Cancelled => {
                            progress.state = progress.state.advance(ConfirmationState::Cancelled);
                            break;
                        }
                    };

                    if fetched.commitment.as_bytes() == expected.as_bytes() {
                        progress.verification = Some(Verification::Matched);
                    } else {
                        tracing::error!(
                            backend = %backend,
                            handle = %handle,
                            expected = %expected,
                            actual = %fetched.commitment,
                            "Re-fetched commitment does not match the submission"
                        );
                        progress.verification = Some(Verification::Mismatch {
                            expected: expected.clone(),
                            actual: fetched.commitment,
                        });
                        next = ConfirmationState::IntegrityFailure;
                    }
                }
            }

            progress.state = progress.state.advance(next);
        }

        let elapsed = started.elapsed();
        metrics::record_confirmation(backend, progress.state, elapsed);

        if progress.state.is_success() {
            tracing::info!(
                backend = %backend,
                handle = %handle,
                state = %progress.state,
                polls = progress.polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "Submission confirmed"
            );
        } else {
            tracing::warn!(
                backend = %backend,
                handle = %handle,
                state = %progress.state,
                last_status = ?progress.last_status,
                polls = progress.polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "Confirmation ended without success"
            );
        }

        Ok(SubmissionResult {
            handle: handle.clone(),
            state: progress.state,
            last_status: progress.last_status,
            verification: progress.verification,
            polls: progress.polls,
            elapsed,
        })
    }

    fn abort(
        &self,
        handle: &SubmissionHandle,
        progress: &Progress,
        started: Instant,
        source: SubmitError,
        backend: BackendKind,
    ) -> SubmitError {
        tracing::warn!(
            backend = %backend,
            handle = %handle,
            last_status = ?progress.last_status,
            polls = progress.polls,
            error = %source,
            "Confirmation query failed"
        );
        metrics::record_confirmation(backend, ConfirmationState::Failed, started.elapsed());

        SubmitError::Confirmation {
            handle: handle.clone(),
            last_status: progress.last_status.clone(),
            source: Box::new(source),
        }
    }
}
