//! KZG commitment generation for EIP-4844 blobs.
//!
//! # Layout
//! ```text
//! payload (≤ capacity)
//!     → zero-padded to capacity            (BlobPayload)
//!     → 31 bytes per field element         (codec::pad_empty_byte)
//!     → zero-filled to 131,072 bytes       (Blob)
//!     → KZG commitment + blob proof        (c-kzg, Ethereum trusted setup)
//!     → versioned hash 0x01 ‖ sha256(c)[1..]
//! ```
//!
//! The padding is part of the committed data. Padding is always zeros, so a
//! payload commits to the same value under any capacity it fits.

use alloy::consensus::EnvKzgSettings;
use alloy::eips::eip4844::{kzg_to_versioned_hash, Blob, Bytes48};
use alloy::primitives::B256;
use c_kzg::{BYTES_PER_BLOB, FIELD_ELEMENTS_PER_BLOB};
use thiserror::Error;

use crate::blob::codec::{pad_empty_byte, PAYLOAD_BYTES_PER_SYMBOL};

/// Largest payload that fits a single blob with one zero byte per field element.
pub const MAX_BLOB_CAPACITY: usize = FIELD_ELEMENTS_PER_BLOB * PAYLOAD_BYTES_PER_SYMBOL;

/// Bytes of a full blob.
pub const BLOB_SIZE: usize = BYTES_PER_BLOB;

/// Errors raised while committing to a blob.
#[derive(Debug, Error)]
pub enum CommitmentError {
    /// Payload does not fit the configured capacity.
    #[error("malformed input: payload of {size} bytes exceeds blob capacity of {capacity} bytes")]
    MalformedInput { size: usize, capacity: usize },

    /// Capacity is zero or larger than a single blob can carry.
    #[error("invalid blob capacity {0} (must be 1..={max})", max = MAX_BLOB_CAPACITY)]
    InvalidCapacity(usize),

    /// The KZG library rejected the blob or failed internally.
    #[error("kzg: {0}")]
    Kzg(#[from] c_kzg::Error),
}

/// A payload zero-padded to a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobPayload {
    data: Vec<u8>,
    original_len: usize,
}

impl BlobPayload {
    /// Pad `payload` with zeros up to `capacity`. Never truncates.
    pub fn pad(payload: &[u8], capacity: usize) -> Result<Self, CommitmentError> {
        if capacity == 0 || capacity > MAX_BLOB_CAPACITY {
            return Err(CommitmentError::InvalidCapacity(capacity));
        }
        if payload.len() > capacity {
            return Err(CommitmentError::MalformedInput {
                size: payload.len(),
                capacity,
            });
        }

        let mut data = vec![0u8; capacity];
        data[..payload.len()].copy_from_slice(payload);

        Ok(Self {
            data,
            original_len: payload.len(),
        })
    }

    /// Padded bytes (length equals the capacity).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Length of the payload before padding.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Lay the padded bytes out as canonical field elements of a full blob.
    pub fn to_blob(&self) -> Box<Blob> {
        let encoded = pad_empty_byte(&self.data);
        let mut blob = Box::new(Blob::ZERO);
        blob[..encoded.len()].copy_from_slice(&encoded);
        blob
    }
}

/// A blob together with its commitment, proof and versioned hash.
#[derive(Clone)]
pub struct CommittedBlob {
    pub blob: Box<Blob>,
    pub commitment: Bytes48,
    pub proof: Bytes48,
    pub versioned_hash: B256,
}

impl std::fmt::Debug for CommittedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommittedBlob")
            .field("commitment", &self.commitment)
            .field("versioned_hash", &self.versioned_hash)
            .finish()
    }
}

/// Deterministic KZG commitment generator bound to one blob capacity.
#[derive(Debug, Clone)]
pub struct CommitmentGenerator {
    capacity: usize,
    settings: EnvKzgSettings,
}

impl CommitmentGenerator {
    /// Create a generator using the Ethereum mainnet trusted setup.
    pub fn new(capacity: usize) -> Result<Self, CommitmentError> {
        Self::with_settings(capacity, EnvKzgSettings::Default)
    }

    /// Create a generator with explicit KZG settings.
    pub fn with_settings(capacity: usize, settings: EnvKzgSettings) -> Result<Self, CommitmentError> {
        if capacity == 0 || capacity > MAX_BLOB_CAPACITY {
            return Err(CommitmentError::InvalidCapacity(capacity));
        }
        Ok(Self { capacity, settings })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero-pad a raw payload to this generator's capacity.
    pub fn pad(&self, payload: &[u8]) -> Result<BlobPayload, CommitmentError> {
        BlobPayload::pad(payload, self.capacity)
    }

    /// Commit to a padded payload.
    ///
    /// Pure: the same padded bytes always yield the same triple.
    pub fn generate(&self, payload: &BlobPayload) -> Result<CommittedBlob, CommitmentError> {
        if payload.capacity() != self.capacity {
            return Err(CommitmentError::MalformedInput {
                size: payload.capacity(),
                capacity: self.capacity,
            });
        }

        let blob = payload.to_blob();
        let kzg_blob = c_kzg::Blob::from_bytes(blob.as_slice())?;
        let settings = self.settings.get();

        let commitment = settings.blob_to_kzg_commitment(&kzg_blob)?.to_bytes();
        let proof = settings.compute_blob_kzg_proof(&kzg_blob, &commitment)?.to_bytes();

        let commitment = Bytes48::from(commitment.into_inner());
        let proof = Bytes48::from(proof.into_inner());
        let versioned_hash = kzg_to_versioned_hash(commitment.as_slice());

        tracing::debug!(
            payload_len = payload.original_len(),
            capacity = self.capacity,
            versioned_hash = %versioned_hash,
            "Blob committed"
        );

        Ok(CommittedBlob {
            blob,
            commitment,
            proof,
            versioned_hash,
        })
    }

    /// Verify the blob proof of a committed blob.
    pub fn verify(&self, committed: &CommittedBlob) -> Result<bool, CommitmentError> {
        let kzg_blob = c_kzg::Blob::from_bytes(committed.blob.as_slice())?;
        let commitment = c_kzg::Bytes48::from_bytes(committed.commitment.as_slice())?;
        let proof = c_kzg::Bytes48::from_bytes(committed.proof.as_slice())?;

        Ok(self
            .settings
            .get()
            .verify_blob_kzg_proof(&kzg_blob, &commitment, &proof)?)
    }
}
