//! Registry Client
//!
//! Turns a [`RegistryMode`] into exactly one transaction on the backend.

use crate::backend::ChainBackend;
use crate::error::TransactionFailure;
use crate::mode::{
    ConstructorArgs, DeploymentReceipt, RegistrationReceipt, RegistryAttachment,
    RegistryDeploymentDescriptor, RegistryMode, RegistryOutcome,
};
use crate::types::Address;

/// Submits registry modes under one signer
#[derive(Debug, Clone)]
pub struct RegistryClient<B> {
    backend: B,
    signer: Address,
    contract: String,
}

impl<B: ChainBackend> RegistryClient<B> {
    /// Create client
    #[inline]
    #[must_use]
    pub fn new(backend: B, signer: Address, contract: impl Into<String>) -> Self {
        Self {
            backend,
            signer,
            contract: contract.into(),
        }
    }

    /// Underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Registry contract name
    #[inline]
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Deployment descriptor for a deploy-mode run
    #[must_use]
    pub fn descriptor(&self, args: ConstructorArgs) -> RegistryDeploymentDescriptor {
        RegistryDeploymentDescriptor {
            deployer: self.signer,
            contract: self.contract.clone(),
            args,
        }
    }

    /// Attachment to an existing registry
    #[must_use]
    pub fn attach(&self, address: Address) -> RegistryAttachment {
        RegistryAttachment {
            signer: self.signer,
            contract: self.contract.clone(),
            address,
        }
    }

    /// Submit the single transaction a mode calls for
    ///
    /// # Errors
    /// Any `TransactionFailure` from the backend, unchanged
    pub async fn submit(&self, mode: &RegistryMode) -> Result<RegistryOutcome, TransactionFailure> {
        let count = mode.identifiers().len();
        tracing::info!(
            "{} {} with {} identifiers on {}",
            mode.label(),
            self.contract,
            count,
            self.backend.network()
        );
        for id in mode.identifiers() {
            tracing::debug!("identifier {}", id);
        }

        match mode {
            RegistryMode::Deploy { identifiers } => {
                let descriptor = self.descriptor(ConstructorArgs::Identifiers(identifiers.clone()));
                self.deploy(&descriptor).await.map(RegistryOutcome::Deployed)
            }
            RegistryMode::Attach {
                address,
                identifiers,
            } => {
                let attachment = self.attach(*address);
                let mined = self
                    .backend
                    .append(&attachment, identifiers)
                    .await
                    .map_err(log_failure)?;
                tracing::info!("Appended {} identifiers to {} ({})", count, address, mined.tx_hash);
                Ok(RegistryOutcome::Appended(RegistrationReceipt {
                    contract: attachment.contract,
                    address: *address,
                    tx_hash: mined.tx_hash,
                    appended: count,
                }))
            }
        }
    }

    /// Deploy a contract by name with no constructor arguments
    ///
    /// # Errors
    /// Any `TransactionFailure` from the backend
    pub async fn deploy_bare(&self, contract: &str) -> Result<DeploymentReceipt, TransactionFailure> {
        let descriptor = RegistryDeploymentDescriptor {
            deployer: self.signer,
            contract: contract.to_string(),
            args: ConstructorArgs::None,
        };
        tracing::info!("deploy {} (no arguments) on {}", contract, self.backend.network());
        self.deploy(&descriptor).await
    }

    async fn deploy(
        &self,
        descriptor: &RegistryDeploymentDescriptor,
    ) -> Result<DeploymentReceipt, TransactionFailure> {
        let mined = self
            .backend
            .deploy(descriptor)
            .await
            .map_err(log_failure)?;
        let address = mined
            .contract_address
            .ok_or(TransactionFailure::MissingContractAddress {
                tx_hash: mined.tx_hash,
            })?;

        tracing::info!("Deployed {} at {} ({})", descriptor.contract, address, mined.tx_hash);
        Ok(DeploymentReceipt {
            contract: descriptor.contract.clone(),
            address,
            tx_hash: mined.tx_hash,
            registered: descriptor.args.identifiers().map_or(0, |ids| ids.len()),
        })
    }
}

fn log_failure(error: TransactionFailure) -> TransactionFailure {
    tracing::error!("Transaction failed: {}", error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryChain, RecordedCall};
    use anchor_asset::{derive, IdentifierSet};
    use std::sync::Arc;

    fn ids(keys: &[&str]) -> IdentifierSet {
        keys.iter().map(|k| derive(k).unwrap()).collect()
    }

    fn client(chain: &Arc<MemoryChain>) -> RegistryClient<Arc<MemoryChain>> {
        RegistryClient::new(Arc::clone(chain), Address::new([0xaa; 20]), "MyAssets")
    }

    #[tokio::test]
    async fn deploy_mode_seeds_registry() {
        let chain = Arc::new(MemoryChain::new());
        let outcome = client(&chain)
            .submit(&RegistryMode::Deploy {
                identifiers: ids(&["QmA", "QmB"]),
            })
            .await
            .unwrap();

        let RegistryOutcome::Deployed(receipt) = outcome else {
            panic!("expected deployment");
        };
        assert_eq!(receipt.registered, 2);
        assert_eq!(receipt.contract, "MyAssets");
        assert_eq!(chain.identifiers(&receipt.address).await.unwrap(), ids(&["QmA", "QmB"]));
    }

    #[tokio::test]
    async fn deploy_mode_with_no_identifiers() {
        let chain = Arc::new(MemoryChain::new());
        let outcome = client(&chain)
            .submit(&RegistryMode::Deploy {
                identifiers: IdentifierSet::new(),
            })
            .await
            .unwrap();

        assert!(chain.identifiers(&outcome.address()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn attach_mode_appends_in_one_transaction() {
        let chain = Arc::new(MemoryChain::new());
        let registry = client(&chain);
        let deployed = registry
            .submit(&RegistryMode::Deploy {
                identifiers: ids(&["QmA"]),
            })
            .await
            .unwrap()
            .address();

        let outcome = registry
            .submit(&RegistryMode::Attach {
                address: deployed,
                identifiers: ids(&["QmB", "QmC"]),
            })
            .await
            .unwrap();

        assert!(matches!(outcome, RegistryOutcome::Appended(ref r) if r.appended == 2));
        assert_eq!(chain.identifiers(&deployed).await.unwrap(), ids(&["QmA", "QmB", "QmC"]));
        let appends = chain
            .transactions()
            .into_iter()
            .filter(|(_, call)| matches!(call, RecordedCall::Append { .. }))
            .count();
        assert_eq!(appends, 1);
    }

    #[tokio::test]
    async fn resubmitting_a_batch_appends_duplicates() {
        let chain = Arc::new(MemoryChain::new());
        let registry = client(&chain);
        let address = registry
            .submit(&RegistryMode::Deploy {
                identifiers: IdentifierSet::new(),
            })
            .await
            .unwrap()
            .address();
        let mode = RegistryMode::Attach {
            address,
            identifiers: ids(&["QmA"]),
        };

        registry.submit(&mode).await.unwrap();
        registry.submit(&mode).await.unwrap();

        assert_eq!(chain.identifiers(&address).await.unwrap(), ids(&["QmA", "QmA"]));
    }

    #[tokio::test]
    async fn failure_surfaces_unchanged() {
        let chain = Arc::new(MemoryChain::new());
        chain.reject_next("insufficient funds");

        let err = client(&chain)
            .submit(&RegistryMode::Deploy {
                identifiers: ids(&["QmA"]),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
    }

    #[tokio::test]
    async fn bare_deployment_has_no_arguments() {
        let chain = Arc::new(MemoryChain::new());
        let receipt = client(&chain).deploy_bare("LoanNFT").await.unwrap();

        assert_eq!(receipt.contract, "LoanNFT");
        assert_eq!(receipt.registered, 0);
        assert_eq!(chain.contract(&receipt.address).unwrap().name, "LoanNFT");
    }
}
