//! EIP-4844 chain as a DA backend.

use alloy::consensus::Transaction as _;
use alloy::network::ReceiptResponse as _;
use alloy::primitives::{Address, TxHash, B256};
use async_trait::async_trait;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::transaction::SignedBlobTransaction;
use crate::blockchain::types::ChainContext;
use crate::submission::backend::{ChainContextSource, DaBackend, StatusProbe};
use crate::submission::error::{DaResult, SubmitError};
use crate::submission::types::{BackendKind, BackendStatus, Commitment, FetchedBlob, SubmissionHandle};

/// Submits signed blob transactions and tracks their receipts.
#[derive(Debug, Clone)]
pub struct EthereumBlobBackend {
    client: BlockchainClient,
}

impl EthereumBlobBackend {
    pub fn new(client: BlockchainClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    fn tx_hash(handle: &SubmissionHandle) -> DaResult<TxHash> {
        match handle {
            SubmissionHandle::Transaction(hash) => Ok(*hash),
            other => Err(SubmitError::ForeignHandle {
                backend: BackendKind::Eip4844,
                handle: other.clone(),
            }),
        }
    }
}

/// Map inclusion depth onto a backend status.
///
/// The including block counts as the first confirmation.
pub fn receipt_status(
    succeeded: bool,
    included_at: u64,
    head: u64,
    confirmation_blocks: u32,
) -> BackendStatus {
    if !succeeded {
        return BackendStatus::Failed("transaction reverted".to_string());
    }
    let depth = head.saturating_sub(included_at) + 1;
    if depth >= u64::from(confirmation_blocks) {
        BackendStatus::Confirmed
    } else {
        BackendStatus::Processing
    }
}

/// Commitment reported by an included transaction.
///
/// `found` is `None` when the node does not know the transaction, which
/// happens on a lagging endpoint or after a reorg. That is a query failure,
/// not evidence of a tampered blob.
pub fn included_commitment(tx_hash: TxHash, found: Option<Option<&[B256]>>) -> DaResult<Commitment> {
    match found {
        Some(hashes) => Ok(Commitment::from_versioned_hashes(hashes.unwrap_or_default())),
        None => Err(SubmitError::network(
            BackendKind::Eip4844,
            format!("transaction {tx_hash} not found"),
        )),
    }
}

#[async_trait]
impl StatusProbe for EthereumBlobBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Eip4844
    }

    async fn status(&self, handle: &SubmissionHandle) -> DaResult<BackendStatus> {
        let tx_hash = Self::tx_hash(handle)?;

        let Some(receipt) = self.client.get_transaction_receipt(tx_hash).await? else {
            tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
            return Ok(BackendStatus::Pending);
        };

        let head = self.client.get_block_number().await?;
        let included_at = receipt.block_number.unwrap_or(head);
        let status = receipt_status(
            receipt.status(),
            included_at,
            head,
            self.client.confirmation_blocks(),
        );

        tracing::debug!(
            tx_hash = %tx_hash,
            included_at,
            head,
            required = self.client.confirmation_blocks(),
            status = ?status,
            "Receipt observed"
        );

        Ok(status)
    }

    async fn fetch(&self, handle: &SubmissionHandle) -> DaResult<FetchedBlob> {
        let tx_hash = Self::tx_hash(handle)?;
        let tx = self.client.get_transaction_by_hash(tx_hash).await?;
        let commitment = included_commitment(tx_hash, tx.as_ref().map(|tx| tx.blob_versioned_hashes()))?;

        Ok(FetchedBlob {
            commitment,
            data: None,
        })
    }
}

#[async_trait]
impl DaBackend for EthereumBlobBackend {
    type Envelope = SignedBlobTransaction;

    fn commitment(&self, envelope: &SignedBlobTransaction) -> DaResult<Commitment> {
        Ok(Commitment::from_versioned_hashes(envelope.versioned_hashes()))
    }

    async fn broadcast(&self, envelope: SignedBlobTransaction) -> DaResult<SubmissionHandle> {
        let tx_hash = self.client.send_raw_transaction(&envelope.encoded_2718()).await?;
        if tx_hash != envelope.hash() {
            tracing::warn!(
                local = %envelope.hash(),
                reported = %tx_hash,
                "Node reported a different transaction hash"
            );
        }
        tracing::info!(tx_hash = %tx_hash, blobs = envelope.versioned_hashes().len(), "Blob transaction broadcast");
        Ok(SubmissionHandle::Transaction(tx_hash))
    }
}

#[async_trait]
impl ChainContextSource for EthereumBlobBackend {
    async fn chain_context(&self, account: Address) -> DaResult<ChainContext> {
        Ok(self.client.chain_context(account).await?)
    }
}
