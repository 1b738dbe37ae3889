//! Data-availability blob submission.
//!
//! Commits payloads to KZG blobs, assembles signed EIP-4844 transactions,
//! routes payloads to DA backends and confirms them with a bounded-time
//! polling state machine.

pub mod blob;
pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod submission;

pub use blob::{BlobPayload, CommitmentGenerator, CommittedBlob};
pub use config::schema::SubmitterConfig;
pub use submission::{SubmissionDispatcher, SubmissionResult, SubmitError};
