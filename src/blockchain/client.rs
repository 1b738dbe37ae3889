//! JSON-RPC access to the blob chain.
//!
//! # Responsibilities
//! - Hold one provider per configured endpoint, primary first
//! - Serve reads (nonce, fees, receipts, transactions) with per-call
//!   timeouts, falling through to the next endpoint on failure
//! - Send raw transactions on the primary endpoint only, at most once
//!
//! Reads are idempotent and safe to repeat on another endpoint. Sends are
//! not: a timed-out send may still have reached the mempool.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Transaction, TransactionReceipt};
use alloy::transports::{RpcError, TransportErrorKind, TransportResult};
use tokio::time::timeout;

use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainContext, ChainId,
};
use crate::observability::metrics;

type SharedProvider = Arc<dyn Provider<Ethereum> + Send + Sync>;

fn connect(url: url::Url) -> SharedProvider {
    Arc::new(ProviderBuilder::new().connect_http(url))
}

/// Endpoint set for the blob chain.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Index 0 is the primary; broadcasts only ever use it.
    endpoints: Vec<SharedProvider>,
    config: BlockchainConfig,
    call_timeout: Duration,
}

impl BlockchainClient {
    /// Build providers for every configured endpoint and probe the chain id.
    ///
    /// Only an unparsable primary URL is an error. A failed probe is logged
    /// and the first real query reports it.
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut endpoints = vec![connect(primary)];
        for raw in &config.failover_urls {
            match raw.parse::<url::Url>() {
                Ok(url) => endpoints.push(connect(url)),
                Err(_) => tracing::warn!(url = %raw, "Skipping unparsable failover URL"),
            }
        }

        let client = Self {
            endpoints,
            call_timeout: Duration::from_secs(config.rpc_timeout_secs),
            config,
        };

        if let Err(e) = client.verify_chain_id().await {
            tracing::warn!(
                rpc_url = %client.config.rpc_url,
                error = %e,
                "Chain id probe failed; continuing"
            );
        } else {
            tracing::info!(
                rpc_url = %client.config.rpc_url,
                chain_id = client.config.chain_id,
                endpoints = client.endpoints.len(),
                "Connected to blob chain"
            );
        }

        Ok(client)
    }

    async fn read<T, F, Fut>(&self, what: &'static str, call: F) -> BlockchainResult<T>
    where
        F: Fn(SharedProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (idx, endpoint) in self.endpoints.iter().enumerate() {
            match timeout(self.call_timeout, call(endpoint.clone())).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => tracing::warn!(endpoint = idx, what, error = %e, "RPC read failed"),
                Err(_) => tracing::warn!(endpoint = idx, what, "RPC read timed out"),
            }
        }
        Err(BlockchainError::Rpc(format!("All RPC providers failed to {what}")))
    }

    fn ensure_chain(&self, reported: ChainId) -> BlockchainResult<()> {
        if reported.0 == self.config.chain_id {
            Ok(())
        } else {
            Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: reported.0,
            })
        }
    }

    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let reported = self.get_chain_id().await?;
        self.ensure_chain(reported)
    }

    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.read("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.read("get block number", |p| async move { p.get_block_number().await })
            .await
    }

    /// Next usable nonce, counting transactions still in the mempool.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.read("get transaction count", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// `(max_fee_per_gas, max_priority_fee_per_gas)` as the node suggests them.
    pub async fn estimate_eip1559_fees(&self) -> BlockchainResult<(u128, u128)> {
        let fees = self
            .read("estimate fees", |p| async move { p.estimate_eip1559_fees().await })
            .await?;
        Ok((fees.max_fee_per_gas, fees.max_priority_fee_per_gas))
    }

    pub async fn get_blob_base_fee(&self) -> BlockchainResult<u128> {
        self.read("get blob base fee", |p| async move { p.get_blob_base_fee().await })
            .await
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.read("get receipt", |p| async move { p.get_transaction_receipt(tx_hash).await })
            .await
    }

    pub async fn get_transaction_by_hash(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<Transaction>> {
        self.read("get transaction", |p| async move { p.get_transaction_by_hash(tx_hash).await })
            .await
    }

    /// Nonce, fees and chain id for one assembly, queried concurrently.
    pub async fn chain_context(&self, account: Address) -> BlockchainResult<ChainContext> {
        let (chain_id, nonce, (max_fee_per_gas, max_priority_fee_per_gas), blob_base_fee) = tokio::try_join!(
            self.get_chain_id(),
            self.get_pending_nonce(account),
            self.estimate_eip1559_fees(),
            self.get_blob_base_fee(),
        )?;
        self.ensure_chain(chain_id)?;

        Ok(ChainContext {
            chain_id: chain_id.0,
            nonce,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            blob_base_fee,
        })
    }

    /// Send an EIP-2718 encoded transaction to the primary endpoint.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> BlockchainResult<TxHash> {
        let send = self.primary().send_raw_transaction(encoded);
        match timeout(self.call_timeout, send).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(classify_send_error(e)),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }

    /// Whether any endpoint answers a block-number query. Updates the
    /// `da_rpc_health` gauge.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_backend_health("blockchain_rpc", healthy);
        healthy
    }

    pub fn primary(&self) -> &(dyn Provider<Ethereum> + Send + Sync) {
        self.endpoints[0].as_ref()
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Blocks, counting the including one, before a receipt is confirmed.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

// A JSON-RPC error object means the node refused the transaction.
fn classify_send_error(e: RpcError<TransportErrorKind>) -> BlockchainError {
    match e.as_error_resp() {
        Some(payload) => BlockchainError::Rejected(payload.message.to_string()),
        None => BlockchainError::Rpc(e.to_string()),
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("failovers", &(self.endpoints.len() - 1))
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
