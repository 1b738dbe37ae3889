//! Handles, statuses and results shared by every backend.

use std::fmt;
use std::time::Duration;

use alloy::primitives::{keccak256, Bytes, TxHash, B256};

use crate::submission::envelope::Namespace;

/// The four supported backend shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Plain broadcast of an app-id tagged payload.
    AppData,
    /// Namespace-tagged blob.
    Namespace,
    /// Asynchronous dispersal tracked by request id.
    Dispersal,
    /// EIP-4844 transaction carrying KZG commitments.
    Eip4844,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::AppData => "app_data",
            BackendKind::Namespace => "namespace",
            BackendKind::Dispersal => "dispersal",
            BackendKind::Eip4844 => "eip4844",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque commitment a backend reports for a stored blob.
///
/// What the bytes mean depends on the backend: the versioned-hash list of an
/// EIP-4844 transaction, a namespace share commitment, or a content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Commitment(Bytes);

impl Commitment {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Keccak-256 content digest, for backends that only return raw data.
    pub fn digest(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(keccak256(data).as_slice()))
    }

    /// Concatenated versioned hashes, in transaction order.
    pub fn from_versioned_hashes(hashes: &[B256]) -> Self {
        let mut bytes = Vec::with_capacity(hashes.len() * 32);
        for hash in hashes {
            bytes.extend_from_slice(hash.as_slice());
        }
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier returned right after broadcast. Not a durability guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionHandle {
    /// Hash of a broadcast transaction.
    Transaction(TxHash),
    /// Dispersal request id.
    Request(Bytes),
    /// Inclusion height; retrieval needs the same namespace and commitment.
    Inclusion {
        height: u64,
        namespace: Namespace,
        commitment: Commitment,
    },
    /// Block and extrinsic hash of an app-data submission.
    Extrinsic { block_hash: B256, tx_hash: B256 },
}

impl fmt::Display for SubmissionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionHandle::Transaction(hash) => write!(f, "tx {}", hash),
            SubmissionHandle::Request(id) => write!(f, "request {}", id),
            SubmissionHandle::Inclusion { height, namespace, .. } => {
                write!(f, "height {} in namespace {}", height, namespace)
            }
            SubmissionHandle::Extrinsic { block_hash, tx_hash } => {
                write!(f, "extrinsic {} in block {}", tx_hash, block_hash)
            }
        }
    }
}

/// Status as reported by a backend on one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    /// Known but not yet picked up.
    Pending,
    /// Being processed or included without enough depth.
    Processing,
    /// Included.
    Confirmed,
    /// Included and final.
    Finalized,
    /// The backend gave up on the submission.
    Failed(String),
}

/// Locally tracked confirmation state.
///
/// Moves monotonically from `Pending` toward a terminal value and never
/// leaves a terminal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfirmationState {
    Pending,
    Processing,
    Confirmed,
    Finalized,
    Failed,
    TimedOut,
    Cancelled,
    /// Backend reported success but the re-fetched commitment differs.
    IntegrityFailure,
}

impl ConfirmationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationState::Pending | ConfirmationState::Processing)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConfirmationState::Confirmed | ConfirmationState::Finalized)
    }

    /// Apply a transition, ignoring any that would leave a terminal state or
    /// move back from `Processing` to `Pending`.
    #[must_use]
    pub fn advance(self, next: ConfirmationState) -> ConfirmationState {
        match (self, next) {
            (current, _) if current.is_terminal() => current,
            (ConfirmationState::Processing, ConfirmationState::Pending) => self,
            _ => next,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationState::Pending => "pending",
            ConfirmationState::Processing => "processing",
            ConfirmationState::Confirmed => "confirmed",
            ConfirmationState::Finalized => "finalized",
            ConfirmationState::Failed => "failed",
            ConfirmationState::TimedOut => "timed_out",
            ConfirmationState::Cancelled => "cancelled",
            ConfirmationState::IntegrityFailure => "integrity_failure",
        }
    }
}

impl fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a backend returned when the blob was read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBlob {
    pub commitment: Commitment,
    /// Raw data, when the backend still serves it.
    pub data: Option<Bytes>,
}

/// Outcome of the read-after-write check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Matched,
    Mismatch {
        expected: Commitment,
        actual: Commitment,
    },
}

/// Final report of one confirmation run.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub handle: SubmissionHandle,
    pub state: ConfirmationState,
    pub last_status: Option<BackendStatus>,
    pub verification: Option<Verification>,
    pub polls: u32,
    pub elapsed: Duration,
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }

    /// Turn every non-success terminal state into the matching error.
    pub fn into_result(self) -> Result<Self, crate::submission::SubmitError> {
        use crate::submission::SubmitError;

        match self.state {
            ConfirmationState::Confirmed | ConfirmationState::Finalized => Ok(self),
            ConfirmationState::Failed => {
                let reason = match &self.last_status {
                    Some(BackendStatus::Failed(reason)) => reason.clone(),
                    other => format!("backend reported {:?}", other),
                };
                Err(SubmitError::BackendFailed {
                    handle: self.handle,
                    reason,
                })
            }
            ConfirmationState::IntegrityFailure => match self.verification {
                Some(Verification::Mismatch { expected, actual }) => Err(SubmitError::IntegrityFailure {
                    handle: self.handle,
                    expected,
                    actual,
                }),
                _ => Err(SubmitError::IntegrityFailure {
                    handle: self.handle,
                    expected: Commitment::new(Bytes::new()),
                    actual: Commitment::new(Bytes::new()),
                }),
            },
            ConfirmationState::Cancelled => Err(SubmitError::Cancelled {
                handle: self.handle,
                last_status: self.last_status,
            }),
            ConfirmationState::TimedOut | ConfirmationState::Pending | ConfirmationState::Processing => {
                Err(SubmitError::TimedOut {
                    handle: self.handle,
                    last_status: self.last_status,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_never_revert() {
        let terminal = [
            ConfirmationState::Confirmed,
            ConfirmationState::Finalized,
            ConfirmationState::Failed,
            ConfirmationState::TimedOut,
            ConfirmationState::Cancelled,
            ConfirmationState::IntegrityFailure,
        ];
        for state in terminal {
            assert!(state.is_terminal());
            assert_eq!(state.advance(ConfirmationState::Pending), state);
            assert_eq!(state.advance(ConfirmationState::Processing), state);
            assert_eq!(state.advance(ConfirmationState::Failed), state);
        }
    }

    #[test]
    fn test_forward_transitions() {
        let state = ConfirmationState::Pending;
        let state = state.advance(ConfirmationState::Processing);
        assert_eq!(state, ConfirmationState::Processing);
        assert_eq!(state.advance(ConfirmationState::Pending), ConfirmationState::Processing);
        assert_eq!(state.advance(ConfirmationState::Finalized), ConfirmationState::Finalized);
        assert_eq!(
            ConfirmationState::Pending.advance(ConfirmationState::TimedOut),
            ConfirmationState::TimedOut
        );
    }

    #[test]
    fn test_versioned_hash_commitment_preserves_order() {
        let a = B256::repeat_byte(1);
        let b = B256::repeat_byte(2);
        let ab = Commitment::from_versioned_hashes(&[a, b]);
        let ba = Commitment::from_versioned_hashes(&[b, a]);
        assert_eq!(ab.len(), 64);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(Commitment::digest(b"blob"), Commitment::digest(b"blob"));
        assert_ne!(Commitment::digest(b"blob"), Commitment::digest(b"blob!"));
    }

    #[test]
    fn test_failed_result_maps_to_backend_failed() {
        let result = SubmissionResult {
            handle: SubmissionHandle::Request(Bytes::from_static(b"req")),
            state: ConfirmationState::Failed,
            last_status: Some(BackendStatus::Failed("insufficient signatures".into())),
            verification: None,
            polls: 2,
            elapsed: Duration::from_secs(10),
        };
        let err = result.into_result().unwrap_err();
        assert!(err.to_string().contains("insufficient signatures"));
    }
}
