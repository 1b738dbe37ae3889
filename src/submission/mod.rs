//! Blob submission and confirmation.
//!
//! # Data Flow
//! ```text
//! payload + BackendParams
//!     → dispatcher.rs (validate, wrap, broadcast once)
//!     → SubmissionTicket (handle + expected commitment)
//!     → poller.rs (poll until terminal, re-fetch and compare)
//!     → SubmissionResult
//! ```
//!
//! Backends plug in through the traits in `backend.rs`; only the EIP-4844
//! chain client ships with this crate.

pub mod backend;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod poller;
pub mod types;

pub use backend::{BlobChain, ChainContextSource, DaBackend, StatusProbe};
pub use dispatcher::{
    BackendParams, CommitmentCarrying, DisperseAndTrack, ExternalBackends, NamespacedBlobs,
    PlainBroadcast, SubmissionDispatcher, SubmissionTicket,
};
pub use envelope::{AppDataEnvelope, DispersalRequest, Namespace, NamespacedBlob};
pub use error::{DaResult, SubmitError, ValidationError};
pub use poller::{ConfirmationPoller, PollPolicy, TerminalMarkers, MIN_POLL_INTERVAL};
pub use types::{
    BackendKind, BackendStatus, Commitment, ConfirmationState, FetchedBlob, SubmissionHandle,
    SubmissionResult, Verification,
};
