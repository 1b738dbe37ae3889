//! One submission front over every configured backend.
//!
//! # Responsibilities
//! - Validate payload and parameters before any network I/O
//! - Wrap the payload into the backend's envelope
//! - Broadcast exactly once and hand back a ticket
//! - Drive confirmation with read-after-write verification
//!
//! # Concurrency
//! Submissions share no mutable state. The EIP-4844 variant fetches the
//! nonce at assembly time, so concurrent submissions from the same account
//! can collide and must be serialized by the caller.

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::Bytes;
use tracing::Instrument;
use uuid::Uuid;

use crate::blob::codec::pad_empty_byte;
use crate::blob::CommitmentGenerator;
use crate::blockchain::transaction::BlobTransactionAssembler;
use crate::blockchain::wallet::Wallet;
use crate::config::schema::{AppDataConfig, DispersalConfig, NamespaceConfig, SubmitterConfig};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::submission::backend::{BlobChain, DaBackend};
use crate::submission::envelope::{AppDataEnvelope, DispersalRequest, Namespace, NamespacedBlob};
use crate::submission::error::{DaResult, SubmitError, ValidationError};
use crate::submission::poller::{ConfirmationPoller, PollPolicy, TerminalMarkers};
use crate::submission::types::{BackendKind, Commitment, SubmissionHandle, SubmissionResult};

/// Per-call parameters; the variant selects the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendParams {
    AppData { app_id: u32 },
    Namespace { namespace: Namespace },
    /// Empty quorums leave the choice to the dispersal service.
    Dispersal { quorums: Vec<u8> },
    Eip4844,
}

impl BackendParams {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendParams::AppData { .. } => BackendKind::AppData,
            BackendParams::Namespace { .. } => BackendKind::Namespace,
            BackendParams::Dispersal { .. } => BackendKind::Dispersal,
            BackendParams::Eip4844 => BackendKind::Eip4844,
        }
    }

    pub fn app_data(config: &AppDataConfig) -> Self {
        BackendParams::AppData {
            app_id: config.app_id,
        }
    }

    pub fn namespace(config: &NamespaceConfig) -> Result<Self, ValidationError> {
        Ok(BackendParams::Namespace {
            namespace: Namespace::from_hex(&config.namespace)?,
        })
    }

    pub fn dispersal(config: &DispersalConfig) -> Self {
        BackendParams::Dispersal {
            quorums: config.quorums.clone(),
        }
    }
}

/// Receipt of a broadcast. Not a durability guarantee.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    /// Correlation id used in logs.
    pub id: Uuid,
    pub backend: BackendKind,
    pub handle: SubmissionHandle,
    /// Commitment the backend must report back once the blob is stored.
    pub expected: Commitment,
}

fn check_size(backend: BackendKind, size: usize, capacity: usize) -> Result<(), ValidationError> {
    if size > capacity {
        return Err(ValidationError::PayloadTooLarge {
            backend,
            size,
            capacity,
        });
    }
    Ok(())
}

async fn broadcast_once<B>(backend: &B, envelope: B::Envelope) -> DaResult<(SubmissionHandle, Commitment)>
where
    B: DaBackend + ?Sized,
{
    let expected = backend.commitment(&envelope)?;
    let handle = backend.broadcast(envelope).await?;
    Ok((handle, expected))
}

/// App-id tagged payload, broadcast as is.
pub struct PlainBroadcast {
    backend: Arc<dyn DaBackend<Envelope = AppDataEnvelope>>,
    max_size: usize,
}

impl PlainBroadcast {
    pub fn new(backend: Arc<dyn DaBackend<Envelope = AppDataEnvelope>>, max_size: usize) -> Self {
        Self { backend, max_size }
    }

    pub fn from_config(backend: Arc<dyn DaBackend<Envelope = AppDataEnvelope>>, config: &AppDataConfig) -> Self {
        Self::new(backend, config.max_blob_size)
    }

    async fn submit(&self, payload: &[u8], app_id: u32) -> DaResult<(SubmissionHandle, Commitment)> {
        check_size(BackendKind::AppData, payload.len(), self.max_size)?;
        let envelope = AppDataEnvelope {
            app_id,
            data: Bytes::copy_from_slice(payload),
        };
        broadcast_once(self.backend.as_ref(), envelope).await
    }
}

/// Blob addressed to a namespace.
pub struct NamespacedBlobs {
    backend: Arc<dyn DaBackend<Envelope = NamespacedBlob>>,
    max_size: usize,
}

impl NamespacedBlobs {
    pub fn new(backend: Arc<dyn DaBackend<Envelope = NamespacedBlob>>, max_size: usize) -> Self {
        Self { backend, max_size }
    }

    pub fn from_config(backend: Arc<dyn DaBackend<Envelope = NamespacedBlob>>, config: &NamespaceConfig) -> Self {
        Self::new(backend, config.max_blob_size)
    }

    async fn submit(&self, payload: &[u8], namespace: Namespace) -> DaResult<(SubmissionHandle, Commitment)> {
        check_size(BackendKind::Namespace, payload.len(), self.max_size)?;
        let envelope = NamespacedBlob {
            namespace,
            data: Bytes::copy_from_slice(payload),
        };
        broadcast_once(self.backend.as_ref(), envelope).await
    }
}

/// Field-aligned payload handed to a dispersal service.
///
/// The broadcast returns a request id right away; inclusion happens later
/// and is only known through confirmation.
pub struct DisperseAndTrack {
    backend: Arc<dyn DaBackend<Envelope = DispersalRequest>>,
    max_size: usize,
}

impl DisperseAndTrack {
    pub fn new(backend: Arc<dyn DaBackend<Envelope = DispersalRequest>>, max_size: usize) -> Self {
        Self { backend, max_size }
    }

    /// Size limit applies to the padded encoding.
    pub fn from_config(backend: Arc<dyn DaBackend<Envelope = DispersalRequest>>, config: &DispersalConfig) -> Self {
        Self::new(backend, config.max_blob_size)
    }

    async fn submit(&self, payload: &[u8], quorums: Vec<u8>) -> DaResult<(SubmissionHandle, Commitment)> {
        let unique: HashSet<_> = quorums.iter().collect();
        if unique.len() != quorums.len() {
            return Err(ValidationError::InvalidQuorums(format!(
                "quorum ids must be unique: {:?}",
                quorums
            ))
            .into());
        }

        let encoded = pad_empty_byte(payload);
        check_size(BackendKind::Dispersal, encoded.len(), self.max_size)?;

        let envelope = DispersalRequest {
            data: encoded.into(),
            quorums,
        };
        broadcast_once(self.backend.as_ref(), envelope).await
    }
}

/// Commitment-carrying EIP-4844 transaction.
pub struct CommitmentCarrying {
    chain: Arc<dyn BlobChain>,
    generator: Arc<CommitmentGenerator>,
    assembler: BlobTransactionAssembler,
    wallet: Arc<Wallet>,
}

impl CommitmentCarrying {
    pub fn new(
        chain: Arc<dyn BlobChain>,
        generator: Arc<CommitmentGenerator>,
        assembler: BlobTransactionAssembler,
        wallet: Arc<Wallet>,
    ) -> Self {
        Self {
            chain,
            generator,
            assembler,
            wallet,
        }
    }

    async fn submit(&self, payload: &[u8]) -> DaResult<(SubmissionHandle, Commitment)> {
        let padded = self.generator.pad(payload)?;

        let generator = self.generator.clone();
        let committed = tokio::task::spawn_blocking(move || generator.generate(&padded))
            .await
            .map_err(|e| SubmitError::Commitment(format!("commitment task failed: {}", e)))??;

        let context = self.chain.chain_context(self.wallet.address()).await?;
        let tx = self.assembler.assemble(&self.wallet, vec![committed], &context)?;

        broadcast_once(self.chain.as_ref(), tx).await
    }
}

/// Clients for the backends that do not ship with this crate.
#[derive(Default)]
pub struct ExternalBackends {
    pub app_data: Option<Arc<dyn DaBackend<Envelope = AppDataEnvelope>>>,
    pub namespace: Option<Arc<dyn DaBackend<Envelope = NamespacedBlob>>>,
    pub dispersal: Option<Arc<dyn DaBackend<Envelope = DispersalRequest>>>,
}

/// Routes payloads to the configured backends and confirms them.
pub struct SubmissionDispatcher {
    app_data: Option<PlainBroadcast>,
    namespace: Option<NamespacedBlobs>,
    dispersal: Option<DisperseAndTrack>,
    eip4844: Option<CommitmentCarrying>,
    policy: PollPolicy,
}

impl SubmissionDispatcher {
    /// Dispatcher without backends; polling uses `policy`'s interval and deadline.
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            app_data: None,
            namespace: None,
            dispersal: None,
            eip4844: None,
            policy,
        }
    }

    /// Dispatcher polling with the configured interval and deadline.
    pub fn from_config(config: &SubmitterConfig) -> Self {
        Self::new(PollPolicy::from_config(&config.poller))
    }

    /// Attach every enabled section that has a client in `backends`.
    ///
    /// Disabled sections stay unavailable even when a client is given.
    pub fn with_configured_backends(mut self, config: &SubmitterConfig, backends: ExternalBackends) -> Self {
        if config.app_data.enabled {
            match backends.app_data {
                Some(backend) => self.app_data = Some(PlainBroadcast::from_config(backend, &config.app_data)),
                None => tracing::warn!(backend = %BackendKind::AppData, "Section enabled but no client supplied"),
            }
        }
        if config.namespace.enabled {
            match backends.namespace {
                Some(backend) => self.namespace = Some(NamespacedBlobs::from_config(backend, &config.namespace)),
                None => tracing::warn!(backend = %BackendKind::Namespace, "Section enabled but no client supplied"),
            }
        }
        if config.dispersal.enabled {
            match backends.dispersal {
                Some(backend) => self.dispersal = Some(DisperseAndTrack::from_config(backend, &config.dispersal)),
                None => tracing::warn!(backend = %BackendKind::Dispersal, "Section enabled but no client supplied"),
            }
        }
        self
    }

    pub fn with_app_data(mut self, variant: PlainBroadcast) -> Self {
        self.app_data = Some(variant);
        self
    }

    pub fn with_namespace(mut self, variant: NamespacedBlobs) -> Self {
        self.namespace = Some(variant);
        self
    }

    pub fn with_dispersal(mut self, variant: DisperseAndTrack) -> Self {
        self.dispersal = Some(variant);
        self
    }

    pub fn with_eip4844(mut self, variant: CommitmentCarrying) -> Self {
        self.eip4844 = Some(variant);
        self
    }

    /// Validate, wrap and broadcast once.
    ///
    /// Validation failures never reach the network. Nothing is retried.
    pub async fn submit(&self, payload: &[u8], params: BackendParams) -> DaResult<SubmissionTicket> {
        let id = Uuid::new_v4();
        let backend = params.kind();
        let span = tracing::info_span!("submission", id = %id, backend = %backend);

        async move {
            let outcome = self.route(payload, params).await;
            match &outcome {
                Ok((handle, _)) => {
                    tracing::info!(handle = %handle, size = payload.len(), "Payload broadcast");
                    metrics::record_submission(backend, "accepted");
                }
                Err(SubmitError::Validation(e)) => {
                    tracing::warn!(error = %e, size = payload.len(), "Payload rejected before broadcast");
                    metrics::record_submission(backend, "invalid");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Submission failed");
                    metrics::record_submission(backend, "failed");
                }
            }

            let (handle, expected) = outcome?;
            Ok(SubmissionTicket {
                id,
                backend,
                handle,
                expected,
            })
        }
        .instrument(span)
        .await
    }

    async fn route(&self, payload: &[u8], params: BackendParams) -> DaResult<(SubmissionHandle, Commitment)> {
        if payload.is_empty() {
            return Err(ValidationError::EmptyPayload.into());
        }

        let kind = params.kind();
        match params {
            BackendParams::AppData { app_id } => {
                let variant = self.app_data.as_ref().ok_or(SubmitError::BackendUnavailable(kind))?;
                variant.submit(payload, app_id).await
            }
            BackendParams::Namespace { namespace } => {
                let variant = self.namespace.as_ref().ok_or(SubmitError::BackendUnavailable(kind))?;
                variant.submit(payload, namespace).await
            }
            BackendParams::Dispersal { quorums } => {
                let variant = self.dispersal.as_ref().ok_or(SubmitError::BackendUnavailable(kind))?;
                variant.submit(payload, quorums).await
            }
            BackendParams::Eip4844 => {
                let variant = self.eip4844.as_ref().ok_or(SubmitError::BackendUnavailable(kind))?;
                variant.submit(payload).await
            }
        }
    }

    /// Poll the ticket's backend until a terminal state and verify the
    /// stored commitment.
    ///
    /// Dispersal waits for finality; the other backends succeed on inclusion.
    pub async fn confirm(
        &self,
        ticket: &SubmissionTicket,
        cancel: Option<&CancelSignal>,
    ) -> DaResult<SubmissionResult> {
        let span = tracing::info_span!("confirmation", id = %ticket.id, backend = %ticket.backend);
        let unavailable = || SubmitError::BackendUnavailable(ticket.backend);
        let expected = Some(&ticket.expected);

        async move {
            match ticket.backend {
                BackendKind::AppData => {
                    let variant = self.app_data.as_ref().ok_or_else(unavailable)?;
                    self.poller(TerminalMarkers::included())
                        .confirm(variant.backend.as_ref(), &ticket.handle, expected, cancel)
                        .await
                }
                BackendKind::Namespace => {
                    let variant = self.namespace.as_ref().ok_or_else(unavailable)?;
                    self.poller(TerminalMarkers::included())
                        .confirm(variant.backend.as_ref(), &ticket.handle, expected, cancel)
                        .await
                }
                BackendKind::Dispersal => {
                    let variant = self.dispersal.as_ref().ok_or_else(unavailable)?;
                    self.poller(TerminalMarkers::finalized())
                        .confirm(variant.backend.as_ref(), &ticket.handle, expected, cancel)
                        .await
                }
                BackendKind::Eip4844 => {
                    let variant = self.eip4844.as_ref().ok_or_else(unavailable)?;
                    self.poller(TerminalMarkers::included())
                        .confirm(variant.chain.as_ref(), &ticket.handle, expected, cancel)
                        .await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Submit, confirm, and turn any non-success outcome into an error.
    pub async fn submit_and_confirm(
        &self,
        payload: &[u8],
        params: BackendParams,
        cancel: Option<&CancelSignal>,
    ) -> DaResult<SubmissionResult> {
        let ticket = self.submit(payload, params).await?;
        self.confirm(&ticket, cancel).await?.into_result()
    }

    fn poller(&self, markers: TerminalMarkers) -> ConfirmationPoller {
        ConfirmationPoller::new(self.policy.with_markers(markers))
    }
}
