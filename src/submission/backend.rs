//! Capability interface every backend client provides.
//!
//! The wire clients themselves live outside this crate (except the EIP-4844
//! chain client in `blockchain`). Each backend implements these traits for
//! its own envelope type and the dispatcher holds them as trait objects.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::blockchain::transaction::SignedBlobTransaction;
use crate::blockchain::types::ChainContext;
use crate::submission::error::DaResult;
use crate::submission::types::{BackendKind, BackendStatus, Commitment, FetchedBlob, SubmissionHandle};

/// Read side of a backend: status queries and re-fetch.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Query the current status of a submission.
    async fn status(&self, handle: &SubmissionHandle) -> DaResult<BackendStatus>;

    /// Read the stored blob back.
    async fn fetch(&self, handle: &SubmissionHandle) -> DaResult<FetchedBlob>;
}

/// Write side of a backend.
#[async_trait]
pub trait DaBackend: StatusProbe {
    type Envelope: Send + Sync + 'static;

    /// Commitment the backend must report for this envelope once stored.
    ///
    /// Computed locally without I/O.
    fn commitment(&self, envelope: &Self::Envelope) -> DaResult<Commitment>;

    /// Broadcast exactly once. Implementations must not retry.
    async fn broadcast(&self, envelope: Self::Envelope) -> DaResult<SubmissionHandle>;
}

/// Source of fresh nonce, fee and chain id for transaction assembly.
#[async_trait]
pub trait ChainContextSource: Send + Sync {
    async fn chain_context(&self, account: Address) -> DaResult<ChainContext>;
}

/// A chain that accepts signed blob transactions.
pub trait BlobChain: DaBackend<Envelope = SignedBlobTransaction> + ChainContextSource {}

impl<T> BlobChain for T where T: DaBackend<Envelope = SignedBlobTransaction> + ChainContextSource {}
