//! da-submitter
//!
//! Command-line front for blob commitment and EIP-4844 submission.
//!
//! ```text
//!  file ─▶ CommitmentGenerator ─▶ BlobTransactionAssembler ─▶ broadcast
//!                                                               │
//!  result ◀── verify re-fetched hashes ◀── ConfirmationPoller ◀─┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::TxHash;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use da_submitter::blob::{CommitmentGenerator, MAX_BLOB_CAPACITY};
use da_submitter::blockchain::{
    BlobTransactionAssembler, BlockchainClient, EthereumBlobBackend, Wallet,
};
use da_submitter::config::{load_config, ObservabilityConfig, SubmitterConfig};
use da_submitter::lifecycle::{signals, CancelSignal};
use da_submitter::observability::{logging, metrics};
use da_submitter::submission::{
    BackendKind, BackendParams, CommitmentCarrying, StatusProbe, SubmissionDispatcher,
    SubmissionHandle, SubmissionResult, SubmissionTicket, SubmitError,
};

#[derive(Parser)]
#[command(name = "da-submitter")]
#[command(about = "Commit, submit and confirm data-availability blobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute commitment, proof and versioned hash of a file offline
    Commit {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, default_value_t = MAX_BLOB_CAPACITY)]
        capacity: usize,
    },
    /// Submit a file as an EIP-4844 blob transaction
    Submit {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long)]
        file: PathBuf,

        /// Return right after the broadcast
        #[arg(long)]
        no_wait: bool,
    },
    /// Query the status of a blob transaction once
    Status {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(long)]
        tx_hash: TxHash,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Commit { file, capacity } => {
            logging::init_logging(&ObservabilityConfig::default())?;
            commit(file, capacity).await?;
        }
        Commands::Submit {
            config,
            file,
            no_wait,
        } => {
            let config = init(config)?;
            submit(config, file, no_wait).await?;
        }
        Commands::Status { config, tx_hash } => {
            let config = init(config)?;
            let backend = EthereumBlobBackend::new(BlockchainClient::new(config.blockchain).await?);
            let status = backend.status(&SubmissionHandle::Transaction(tx_hash)).await?;
            print_json(&json!({
                "tx_hash": tx_hash.to_string(),
                "status": format!("{:?}", status),
            }))?;
        }
    }

    Ok(())
}

fn init(path: PathBuf) -> Result<SubmitterConfig, Box<dyn std::error::Error>> {
    let config = load_config(&path)?;
    logging::init_logging(&config.observability)?;

    tracing::info!(config = %path.display(), "da-submitter v0.1.0 starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    if !config.blockchain.enabled {
        return Err(SubmitError::BackendUnavailable(BackendKind::Eip4844).into());
    }

    Ok(config)
}

async fn commit(file: PathBuf, capacity: usize) -> Result<(), Box<dyn std::error::Error>> {
    let payload = tokio::fs::read(&file).await?;
    let generator = CommitmentGenerator::new(capacity)?;
    let committed = generator.generate(&generator.pad(&payload)?)?;

    print_json(&json!({
        "file": file.display().to_string(),
        "payload_len": payload.len(),
        "capacity": capacity,
        "commitment": committed.commitment.to_string(),
        "proof": committed.proof.to_string(),
        "versioned_hash": committed.versioned_hash.to_string(),
    }))
}

async fn submit(
    config: SubmitterConfig,
    file: PathBuf,
    no_wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = tokio::fs::read(&file).await?;

    let wallet = Wallet::from_env(&config.blockchain.private_key_env)?;
    let generator = CommitmentGenerator::new(config.blockchain.blob_capacity)?;
    let assembler = BlobTransactionAssembler::from_config(&config.blockchain)?;
    let client = BlockchainClient::new(config.blockchain.clone()).await?;
    client.is_healthy().await;

    let dispatcher = SubmissionDispatcher::from_config(&config).with_eip4844(CommitmentCarrying::new(
        Arc::new(EthereumBlobBackend::new(client)),
        Arc::new(generator),
        assembler,
        Arc::new(wallet),
    ));

    let ticket = dispatcher.submit(&payload, BackendParams::Eip4844).await?;
    print_json(&ticket_json(&ticket))?;
    if no_wait {
        return Ok(());
    }

    let cancel = CancelSignal::new();
    let listener = signals::cancel_on_ctrl_c(cancel.clone());
    let result = dispatcher.confirm(&ticket, Some(&cancel)).await;
    listener.abort();

    let result = result?;
    print_json(&result_json(&result))?;
    result.into_result()?;
    Ok(())
}

fn ticket_json(ticket: &SubmissionTicket) -> Value {
    json!({
        "id": ticket.id.to_string(),
        "backend": ticket.backend.as_str(),
        "handle": ticket.handle.to_string(),
        "expected_commitment": ticket.expected.to_string(),
    })
}

fn result_json(result: &SubmissionResult) -> Value {
    json!({
        "handle": result.handle.to_string(),
        "state": result.state.as_str(),
        "last_status": result.last_status.as_ref().map(|s| format!("{:?}", s)),
        "verification": result.verification.as_ref().map(|v| format!("{:?}", v)),
        "polls": result.polls,
        "elapsed_ms": result.elapsed.as_millis() as u64,
    })
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
