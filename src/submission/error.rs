//! Submission error taxonomy.

use thiserror::Error;

use crate::blob::CommitmentError;
use crate::submission::types::{BackendKind, BackendStatus, Commitment, SubmissionHandle};

/// Caller errors detected before any network I/O. Never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("payload of {size} bytes exceeds the {backend} capacity of {capacity} bytes")]
    PayloadTooLarge {
        backend: BackendKind,
        size: usize,
        capacity: usize,
    },

    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("invalid quorums: {0}")]
    InvalidQuorums(String),
}

/// Errors surfaced by a submission or its confirmation.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Backend unreachable or the request failed in transport.
    #[error("{backend} network error: {message}")]
    Network { backend: BackendKind, message: String },

    /// Backend refused the broadcast (stale nonce, fee too low, ...).
    #[error("{backend} rejected the broadcast: {reason}")]
    BroadcastRejected { backend: BackendKind, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    /// Internal invariant violated while building a transaction.
    #[error("transaction assembly failed: {0}")]
    Assembly(String),

    #[error("commitment generation failed: {0}")]
    Commitment(String),

    #[error("timed out confirming {handle} (last status: {last_status:?})")]
    TimedOut {
        handle: SubmissionHandle,
        last_status: Option<BackendStatus>,
    },

    #[error("backend failed {handle}: {reason}")]
    BackendFailed {
        handle: SubmissionHandle,
        reason: String,
    },

    /// Backend reported success but served a different commitment.
    #[error("integrity failure for {handle}: expected commitment {expected}, backend returned {actual}")]
    IntegrityFailure {
        handle: SubmissionHandle,
        expected: Commitment,
        actual: Commitment,
    },

    #[error("confirmation of {handle} cancelled (last status: {last_status:?})")]
    Cancelled {
        handle: SubmissionHandle,
        last_status: Option<BackendStatus>,
    },

    /// A status or fetch query failed while confirming.
    #[error("confirming {handle} failed (last status: {last_status:?}): {source}")]
    Confirmation {
        handle: SubmissionHandle,
        last_status: Option<BackendStatus>,
        #[source]
        source: Box<SubmitError>,
    },

    #[error("no {0} backend is configured")]
    BackendUnavailable(BackendKind),

    /// Handle shape does not belong to the queried backend.
    #[error("{backend} cannot track {handle}")]
    ForeignHandle {
        backend: BackendKind,
        handle: SubmissionHandle,
    },
}

impl SubmitError {
    pub fn network(backend: BackendKind, message: impl std::fmt::Display) -> Self {
        SubmitError::Network {
            backend,
            message: message.to_string(),
        }
    }

    /// Whether a caller-driven retry (fresh context, new broadcast or a
    /// longer wait) can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmitError::Network { .. }
            | SubmitError::BroadcastRejected { .. }
            | SubmitError::TimedOut { .. }
            | SubmitError::Cancelled { .. } => true,
            SubmitError::Confirmation { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Handle the error refers to, when one exists.
    pub fn handle(&self) -> Option<&SubmissionHandle> {
        match self {
            SubmitError::TimedOut { handle, .. }
            | SubmitError::BackendFailed { handle, .. }
            | SubmitError::IntegrityFailure { handle, .. }
            | SubmitError::Cancelled { handle, .. }
            | SubmitError::Confirmation { handle, .. }
            | SubmitError::ForeignHandle { handle, .. } => Some(handle),
            _ => None,
        }
    }
}

impl From<CommitmentError> for SubmitError {
    fn from(e: CommitmentError) -> Self {
        match e {
            CommitmentError::MalformedInput { size, capacity } => {
                SubmitError::Validation(ValidationError::PayloadTooLarge {
                    backend: BackendKind::Eip4844,
                    size,
                    capacity,
                })
            }
            other => SubmitError::Commitment(other.to_string()),
        }
    }
}

/// Result type for submission operations.
pub type DaResult<T> = Result<T, SubmitError>;
