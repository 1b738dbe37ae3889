//! Chain state snapshots and chain client errors.

use thiserror::Error;

use crate::submission::error::SubmitError;
use crate::submission::types::BackendKind;

pub use crate::config::schema::BlockchainConfig;

/// EIP-155 chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Fresh account and fee state needed to assemble one blob transaction.
///
/// Fetched immediately before assembly; never cached across submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainContext {
    pub chain_id: u64,
    /// Pending nonce of the submitting account.
    pub nonce: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    /// Current blob base fee in wei.
    pub blob_base_fee: u128,
}

/// Failures of the chain client, signer or assembler.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Every endpoint failed, or the URL was invalid.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node refused the raw transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Transaction could not be built from the given blobs.
    #[error("Assembly error: {0}")]
    Assembly(String),

    /// The node serves a different chain than configured.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

pub type BlockchainResult<T> = Result<T, BlockchainError>;

impl From<BlockchainError> for SubmitError {
    fn from(e: BlockchainError) -> Self {
        match e {
            BlockchainError::Rpc(_)
            | BlockchainError::Timeout(_)
            | BlockchainError::ChainMismatch { .. } => SubmitError::network(BackendKind::Eip4844, e),
            BlockchainError::Rejected(reason) => SubmitError::BroadcastRejected {
                backend: BackendKind::Eip4844,
                reason,
            },
            BlockchainError::Wallet(msg) => SubmitError::Signing(msg),
            BlockchainError::Assembly(msg) => SubmitError::Assembly(msg),
        }
    }
}
