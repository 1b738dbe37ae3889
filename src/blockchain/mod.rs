//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (assemble and sign blob transactions)
//!     → backend.rs (broadcast once, track receipts)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Broadcasts go to a single endpoint and are never retried here

pub mod backend;
pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use backend::EthereumBlobBackend;
pub use client::BlockchainClient;
pub use transaction::{BlobTransactionAssembler, SignedBlobTransaction};
pub use types::{BlockchainConfig, BlockchainError, ChainContext, ChainId};
pub use wallet::Wallet;
