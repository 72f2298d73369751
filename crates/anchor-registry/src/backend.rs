//! Chain backend seam
//!
//! Signing, nonce management and network selection live behind this trait.
//! Implementations submit one transaction per call and never retry.

use crate::error::TransactionFailure;
use crate::mode::{RegistryAttachment, RegistryDeploymentDescriptor};
use crate::types::{Address, TxHash};
use anchor_asset::IdentifierSet;
use std::sync::Arc;

/// Mined transaction as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinedTransaction {
    pub tx_hash: TxHash,
    /// Created contract, for deployments
    pub contract_address: Option<Address>,
}

/// Submits registry transactions to a chain
#[async_trait::async_trait]
pub trait ChainBackend: Send + Sync {
    /// Create a contract and wait until it is mined
    async fn deploy(
        &self,
        descriptor: &RegistryDeploymentDescriptor,
    ) -> Result<MinedTransaction, TransactionFailure>;

    /// Append identifiers to a deployed registry and wait until mined
    async fn append(
        &self,
        attachment: &RegistryAttachment,
        identifiers: &IdentifierSet,
    ) -> Result<MinedTransaction, TransactionFailure>;

    /// Identifiers currently stored by a registry
    async fn identifiers(&self, address: &Address) -> Result<IdentifierSet, TransactionFailure>;

    /// Network name, for diagnostics
    fn network(&self) -> String;
}

#[async_trait::async_trait]
impl<T: ChainBackend + ?Sized> ChainBackend for Arc<T> {
    async fn deploy(
        &self,
        descriptor: &RegistryDeploymentDescriptor,
    ) -> Result<MinedTransaction, TransactionFailure> {
        (**self).deploy(descriptor).await
    }

    async fn append(
        &self,
        attachment: &RegistryAttachment,
        identifiers: &IdentifierSet,
    ) -> Result<MinedTransaction, TransactionFailure> {
        (**self).append(attachment, identifiers).await
    }

    async fn identifiers(&self, address: &Address) -> Result<IdentifierSet, TransactionFailure> {
        (**self).identifiers(address).await
    }

    fn network(&self) -> String {
        (**self).network()
    }
}
