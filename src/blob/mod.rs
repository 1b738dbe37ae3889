//! Blob encoding and commitment subsystem.
//!
//! # Data Flow
//! ```text
//! raw payload
//!     → commitment.rs (pad to capacity, lay out as field elements)
//!     → codec.rs (31 payload bytes per 32-byte symbol)
//!     → commitment.rs (KZG commitment, proof, versioned hash)
//!     → blockchain::transaction (sidecar entries)
//! ```
//!
//! # Design Decisions
//! - Generation is pure: no network, no randomness
//! - Oversized payloads are rejected, never truncated
//! - Trusted setup is the embedded Ethereum ceremony output

pub mod codec;
pub mod commitment;

pub use commitment::{BlobPayload, CommitmentError, CommitmentGenerator, CommittedBlob, MAX_BLOB_CAPACITY};
