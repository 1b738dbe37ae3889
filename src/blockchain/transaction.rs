//! Blob transaction assembly and signing.
//!
//! # Responsibilities
//! - Bundle committed blobs into a type-3 transaction with its sidecar
//! - Apply fee margins to fresh network estimates
//! - Sign with the submitter wallet
//!
//! Assembly does no I/O; the caller supplies a fresh [`ChainContext`].

use alloy::consensus::{
    SignableTransaction, Signed, TxEip4844, TxEip4844Variant, TxEip4844WithSidecar,
};
use alloy::eips::eip2718::Encodable2718;
use alloy::eips::eip4844::{kzg_to_versioned_hash, BlobTransactionSidecar};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::Signature;

use crate::blob::CommittedBlob;
use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainContext};
use crate::blockchain::wallet::Wallet;

/// Conventional recipient for data-only blob transactions.
pub const DEFAULT_BLOB_RECIPIENT: Address =
    alloy::primitives::address!("b10000000000000000000000000000000000000b");

/// Builds signed type-3 transactions from committed blobs.
#[derive(Debug, Clone)]
pub struct BlobTransactionAssembler {
    recipient: Address,
    gas_limit: u64,
    fee_multiplier: f64,
    blob_fee_floor: u128,
}

impl BlobTransactionAssembler {
    pub fn new(recipient: Address) -> Self {
        Self {
            recipient,
            gas_limit: 21_000,
            fee_multiplier: 1.0,
            blob_fee_floor: 1_000_000_000,
        }
    }

    /// Build an assembler from validated configuration.
    pub fn from_config(config: &BlockchainConfig) -> BlockchainResult<Self> {
        let recipient = config.recipient.parse().map_err(|e| {
            BlockchainError::Assembly(format!("Invalid recipient '{}': {}", config.recipient, e))
        })?;

        Ok(Self::new(recipient)
            .with_gas_limit(config.gas_limit)
            .with_fee_multiplier(config.fee_multiplier)
            .with_blob_fee_floor(config.blob_fee_floor_wei as u128))
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_fee_multiplier(mut self, multiplier: f64) -> Self {
        self.fee_multiplier = multiplier;
        self
    }

    pub fn with_blob_fee_floor(mut self, floor_wei: u128) -> Self {
        self.blob_fee_floor = floor_wei;
        self
    }

    /// Assemble and sign one blob transaction.
    ///
    /// The versioned-hash list, in order, is exactly the list derived from
    /// the sidecar commitments. Any disagreement fails assembly.
    pub fn assemble(
        &self,
        wallet: &Wallet,
        entries: Vec<CommittedBlob>,
        context: &ChainContext,
    ) -> BlockchainResult<SignedBlobTransaction> {
        if entries.is_empty() {
            return Err(BlockchainError::Assembly(
                "a blob transaction needs at least one blob".to_string(),
            ));
        }

        let mut versioned_hashes = Vec::with_capacity(entries.len());
        let mut blobs = Vec::with_capacity(entries.len());
        let mut commitments = Vec::with_capacity(entries.len());
        let mut proofs = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            let derived = kzg_to_versioned_hash(entry.commitment.as_slice());
            if derived != entry.versioned_hash {
                return Err(BlockchainError::Assembly(format!(
                    "blob {} carries versioned hash {} but its commitment derives {}",
                    index, entry.versioned_hash, derived
                )));
            }
            versioned_hashes.push(derived);
            blobs.push(*entry.blob);
            commitments.push(entry.commitment);
            proofs.push(entry.proof);
        }

        let sidecar = BlobTransactionSidecar::new(blobs, commitments, proofs);
        if !sidecar.versioned_hashes().eq(versioned_hashes.iter().copied()) {
            return Err(BlockchainError::Assembly(
                "sidecar commitments disagree with the versioned hash list".to_string(),
            ));
        }

        let max_priority_fee_per_gas =
            with_margin(context.max_priority_fee_per_gas, self.fee_multiplier);
        let max_fee_per_gas = with_margin(context.max_fee_per_gas, self.fee_multiplier)
            .max(max_priority_fee_per_gas);
        let max_fee_per_blob_gas =
            with_margin(context.blob_base_fee, self.fee_multiplier).max(self.blob_fee_floor);

        let tx = TxEip4844 {
            chain_id: context.chain_id,
            nonce: context.nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to: self.recipient,
            value: U256::ZERO,
            access_list: Default::default(),
            blob_versioned_hashes: versioned_hashes,
            max_fee_per_blob_gas,
            input: Bytes::new(),
        };

        let variant = TxEip4844Variant::from(TxEip4844WithSidecar::from_tx_and_sidecar(tx, sidecar));
        let signature = wallet.sign_hash(&variant.signature_hash())?;
        let signed = variant.into_signed(signature);

        tracing::debug!(
            tx_hash = %signed.hash(),
            blobs = signed.tx().tx().blob_versioned_hashes.len(),
            nonce = context.nonce,
            max_fee_per_blob_gas,
            "Blob transaction assembled"
        );

        Ok(SignedBlobTransaction { inner: signed })
    }
}

impl Default for BlobTransactionAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_BLOB_RECIPIENT)
    }
}

// add a safety margin to a fee estimate
fn with_margin(value: u128, multiplier: f64) -> u128 {
    (value as f64 * multiplier) as u128
}

/// A signed type-3 transaction carrying its blob sidecar.
#[derive(Clone)]
pub struct SignedBlobTransaction {
    inner: Signed<TxEip4844Variant<BlobTransactionSidecar>>,
}

impl SignedBlobTransaction {
    pub fn hash(&self) -> B256 {
        *self.inner.hash()
    }

    /// The transaction without its sidecar.
    pub fn tx(&self) -> &TxEip4844 {
        self.inner.tx().tx()
    }

    pub fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    pub fn sidecar(&self) -> Option<&BlobTransactionSidecar> {
        match self.inner.tx() {
            TxEip4844Variant::TxEip4844WithSidecar(with_sidecar) => Some(&with_sidecar.sidecar),
            TxEip4844Variant::TxEip4844(_) => None,
        }
    }

    pub fn versioned_hashes(&self) -> &[B256] {
        &self.tx().blob_versioned_hashes
    }

    /// Hash the wallet signed.
    pub fn signature_hash(&self) -> B256 {
        self.inner.tx().signature_hash()
    }

    /// Network encoding (type byte, transaction, sidecar) for `eth_sendRawTransaction`.
    pub fn encoded_2718(&self) -> Vec<u8> {
        self.inner.encoded_2718()
    }

    /// Recover the sender from the signature.
    pub fn recover_signer(&self) -> BlockchainResult<Address> {
        self.signature()
            .recover_address_from_prehash(&self.signature_hash())
            .map_err(|e| BlockchainError::Wallet(format!("Signature recovery failed: {}", e)))
    }
}

impl std::fmt::Debug for SignedBlobTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedBlobTransaction")
            .field("hash", &self.hash())
            .field("nonce", &self.tx().nonce)
            .field("versioned_hashes", &self.versioned_hashes())
            .finish_non_exhaustive()
    }
}
