//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;

use da_submitter::blockchain::{ChainContext, SignedBlobTransaction};
use da_submitter::submission::{
    AppDataEnvelope, BackendKind, BackendStatus, ChainContextSource, Commitment, DaBackend,
    DaResult, DispersalRequest, FetchedBlob, NamespacedBlob, PollPolicy, StatusProbe,
    SubmissionHandle, SubmitError,
};

/// Anvil's first account.
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum Step {
    Status(BackendStatus),
    /// Transport failure.
    Unreachable,
}

/// In-memory backend that replays a status script.
///
/// Once the script runs out the last status repeats. `fetch` serves the
/// commitment of the last broadcast envelope unless overridden.
pub struct ScriptedBackend<E> {
    kind: BackendKind,
    commitment_of: fn(&E) -> Commitment,
    handle_of: fn(&E) -> SubmissionHandle,
    script: Mutex<VecDeque<Step>>,
    last: Mutex<BackendStatus>,
    stored: Mutex<Option<Commitment>>,
    fetch_override: Mutex<Option<Commitment>>,
    fetch_unreachable: bool,
    reject: Option<String>,
    context: ChainContext,
    envelopes: Mutex<Vec<E>>,
    pub broadcasts: AtomicU32,
    pub status_calls: AtomicU32,
    pub fetch_calls: AtomicU32,
    pub context_calls: AtomicU32,
}

impl<E> ScriptedBackend<E> {
    pub fn new(
        kind: BackendKind,
        commitment_of: fn(&E) -> Commitment,
        handle_of: fn(&E) -> SubmissionHandle,
    ) -> Self {
        Self {
            kind,
            commitment_of,
            handle_of,
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(BackendStatus::Pending),
            stored: Mutex::new(None),
            fetch_override: Mutex::new(None),
            fetch_unreachable: false,
            reject: None,
            context: test_context(),
            envelopes: Mutex::new(Vec::new()),
            broadcasts: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            fetch_calls: AtomicU32::new(0),
            context_calls: AtomicU32::new(0),
        }
    }

    pub fn with_statuses(self, statuses: Vec<BackendStatus>) -> Self {
        self.with_script(statuses.into_iter().map(Step::Status).collect())
    }

    pub fn with_script(self, steps: Vec<Step>) -> Self {
        *self.script.lock().unwrap() = steps.into();
        self
    }

    /// Serve this commitment on fetch instead of the stored one.
    pub fn with_fetched(self, commitment: Commitment) -> Self {
        *self.fetch_override.lock().unwrap() = Some(commitment);
        self
    }

    /// Fail every fetch as a transport error.
    pub fn with_unreachable_fetch(mut self) -> Self {
        self.fetch_unreachable = true;
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject = Some(reason.to_string());
        self
    }

    pub fn with_context(mut self, context: ChainContext) -> Self {
        self.context = context;
        self
    }

    pub fn envelopes(&self) -> std::sync::MutexGuard<'_, Vec<E>> {
        self.envelopes.lock().unwrap()
    }
}

pub fn count(counter: &AtomicU32) -> u32 {
    counter.load(Ordering::SeqCst)
}

#[async_trait]
impl<E> StatusProbe for ScriptedBackend<E>
where
    E: Send + Sync + 'static,
{
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn status(&self, _handle: &SubmissionHandle) -> DaResult<BackendStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Status(status)) => {
                *self.last.lock().unwrap() = status.clone();
                Ok(status)
            }
            Some(Step::Unreachable) => Err(SubmitError::network(self.kind, "connection refused")),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }

    async fn fetch(&self, _handle: &SubmissionHandle) -> DaResult<FetchedBlob> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fetch_unreachable {
            return Err(SubmitError::network(self.kind, "blob not found"));
        }
        let commitment = self
            .fetch_override
            .lock()
            .unwrap()
            .clone()
            .or_else(|| self.stored.lock().unwrap().clone())
            .unwrap_or_else(|| Commitment::new(Bytes::new()));
        Ok(FetchedBlob {
            commitment,
            data: None,
        })
    }
}

#[async_trait]
impl<E> DaBackend for ScriptedBackend<E>
where
    E: Send + Sync + 'static,
{
    type Envelope = E;

    fn commitment(&self, envelope: &E) -> DaResult<Commitment> {
        Ok((self.commitment_of)(envelope))
    }

    async fn broadcast(&self, envelope: E) -> DaResult<SubmissionHandle> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.reject {
            return Err(SubmitError::BroadcastRejected {
                backend: self.kind,
                reason: reason.clone(),
            });
        }
        *self.stored.lock().unwrap() = Some((self.commitment_of)(&envelope));
        let handle = (self.handle_of)(&envelope);
        self.envelopes.lock().unwrap().push(envelope);
        Ok(handle)
    }
}

#[async_trait]
impl ChainContextSource for ScriptedBackend<SignedBlobTransaction> {
    async fn chain_context(&self, _account: Address) -> DaResult<ChainContext> {
        self.context_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.context)
    }
}

pub fn test_context() -> ChainContext {
    ChainContext {
        chain_id: 31337,
        nonce: 3,
        max_fee_per_gas: 20_000_000_000,
        max_priority_fee_per_gas: 1_000_000_000,
        blob_base_fee: 1,
    }
}

pub fn policy(interval_secs: u64, deadline_ms: u64) -> PollPolicy {
    PollPolicy::new(
        Duration::from_secs(interval_secs),
        Duration::from_millis(deadline_ms),
    )
}

pub fn app_data_backend() -> ScriptedBackend<AppDataEnvelope> {
    ScriptedBackend::new(
        BackendKind::AppData,
        |env| Commitment::digest(&env.data),
        |env| SubmissionHandle::Extrinsic {
            block_hash: B256::repeat_byte(0xbb),
            tx_hash: keccak256(&env.data),
        },
    )
}

pub fn namespace_backend() -> ScriptedBackend<NamespacedBlob> {
    ScriptedBackend::new(
        BackendKind::Namespace,
        |env| Commitment::digest(&env.data),
        |env| SubmissionHandle::Inclusion {
            height: 42,
            namespace: env.namespace,
            commitment: Commitment::digest(&env.data),
        },
    )
}

pub fn dispersal_backend() -> ScriptedBackend<DispersalRequest> {
    ScriptedBackend::new(
        BackendKind::Dispersal,
        |env| Commitment::digest(&env.data),
        |env| SubmissionHandle::Request(Bytes::copy_from_slice(keccak256(&env.data).as_slice())),
    )
}

pub fn blob_chain() -> ScriptedBackend<SignedBlobTransaction> {
    ScriptedBackend::new(
        BackendKind::Eip4844,
        |tx| Commitment::from_versioned_hashes(tx.versioned_hashes()),
        |tx| SubmissionHandle::Transaction(tx.hash()),
    )
}
