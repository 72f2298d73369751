//! Error types for registry transactions

use crate::types::{Address, TxHash};
use std::path::PathBuf;

/// A deployment or registration transaction failed
///
/// Never retried by this crate; the caller decides what to do.
#[derive(Debug, thiserror::Error)]
pub enum TransactionFailure {
    /// Node rejected the request (insufficient funds, unknown account, ...)
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Node could not be reached
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Node or proxy answered with a non-success HTTP status
    #[error("rpc endpoint {endpoint} answered {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Transaction was refused before mining
    #[error("transaction rejected: {reason}")]
    Rejected { reason: String },

    /// Transaction was mined but execution reverted
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    /// No receipt appeared in time
    #[error("no receipt for {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: TxHash, waited_secs: u64 },

    /// Node is on a different chain than configured
    #[error("chain id mismatch: expected {expected}, node reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Creation receipt lacks a contract address
    #[error("deployment {tx_hash} produced no contract address")]
    MissingContractAddress { tx_hash: TxHash },

    /// No contract at the attachment address
    #[error("no registry contract at {0}")]
    UnknownContract(Address),

    /// Compiled contract artifact could not be loaded
    #[error("cannot load artifact for {contract} at {path}: {reason}")]
    ContractArtifact {
        contract: String,
        path: PathBuf,
        reason: String,
    },

    /// Node response could not be understood
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),

    /// Operation not offered by this backend
    #[error("unsupported by {backend}: {operation}")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

impl TransactionFailure {
    /// Create rejected error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Transaction hash, when the failure happened after submission
    #[must_use]
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Reverted { tx_hash }
            | Self::ReceiptTimeout { tx_hash, .. }
            | Self::MissingContractAddress { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}
