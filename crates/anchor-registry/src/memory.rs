//! In-process chain
//!
//! Keeps a ledger of deployed registries and their identifier vectors.
//! Contract addresses and transaction hashes are derived from the deployer
//! and a nonce, so runs against a fresh chain are reproducible.

use crate::backend::{ChainBackend, MinedTransaction};
use crate::error::TransactionFailure;
use crate::mode::{RegistryAttachment, RegistryDeploymentDescriptor};
use crate::types::{Address, TxHash};
use anchor_asset::{keccak256, AssetIdentifier, IdentifierSet};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// A registry held by [`MemoryChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    pub name: String,
    pub deployer: Address,
    pub identifiers: Vec<AssetIdentifier>,
}

/// Kind of transaction recorded by [`MemoryChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Deploy { contract: Address, args: usize },
    Append { contract: Address, appended: usize },
}

#[derive(Debug, Default)]
struct Ledger {
    nonce: u64,
    contracts: IndexMap<Address, DeployedContract>,
    transactions: Vec<(TxHash, RecordedCall)>,
    reject_next: Option<String>,
}

impl Ledger {
    fn next_nonce(&mut self) -> u64 {
        self.nonce += 1;
        self.nonce
    }

    fn take_rejection(&mut self) -> Result<(), TransactionFailure> {
        match self.reject_next.take() {
            Some(reason) => Err(TransactionFailure::rejected(reason)),
            None => Ok(()),
        }
    }
}

fn derive_bytes(tag: &[u8], who: &Address, nonce: u64) -> [u8; 32] {
    let mut seed = Vec::with_capacity(tag.len() + 28);
    seed.extend_from_slice(tag);
    seed.extend_from_slice(who.as_bytes());
    seed.extend_from_slice(&nonce.to_be_bytes());
    keccak256(&seed).into_bytes()
}

/// In-memory [`ChainBackend`]
#[derive(Debug, Default)]
pub struct MemoryChain {
    ledger: Mutex<Ledger>,
}

impl MemoryChain {
    /// Create empty chain
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next submitted transaction with `reason`
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.ledger.lock().reject_next = Some(reason.into());
    }

    /// Place an empty registry at `address` without mining a transaction
    pub fn seed(&self, address: Address, name: impl Into<String>, deployer: Address) {
        self.ledger.lock().contracts.insert(
            address,
            DeployedContract {
                name: name.into(),
                deployer,
                identifiers: Vec::new(),
            },
        );
    }

    /// Contract held at an address
    #[must_use]
    pub fn contract(&self, address: &Address) -> Option<DeployedContract> {
        self.ledger.lock().contracts.get(address).cloned()
    }

    /// Every mined transaction, oldest first
    #[must_use]
    pub fn transactions(&self) -> Vec<(TxHash, RecordedCall)> {
        self.ledger.lock().transactions.clone()
    }

    /// Number of deployed contracts
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.ledger.lock().contracts.len()
    }
}

#[async_trait::async_trait]
impl ChainBackend for MemoryChain {
    async fn deploy(
        &self,
        descriptor: &RegistryDeploymentDescriptor,
    ) -> Result<MinedTransaction, TransactionFailure> {
        let mut ledger = self.ledger.lock();
        ledger.take_rejection()?;

        let nonce = ledger.next_nonce();
        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&derive_bytes(b"create", &descriptor.deployer, nonce)[12..]);
        let address = Address::new(address_bytes);
        let tx_hash = TxHash::new(derive_bytes(b"tx", &descriptor.deployer, nonce));

        let identifiers: Vec<AssetIdentifier> = descriptor
            .args
            .identifiers()
            .map(|ids| ids.as_slice().to_vec())
            .unwrap_or_default();
        let args = identifiers.len();

        ledger.contracts.insert(
            address,
            DeployedContract {
                name: descriptor.contract.clone(),
                deployer: descriptor.deployer,
                identifiers,
            },
        );
        ledger.transactions.push((
            tx_hash,
            RecordedCall::Deploy {
                contract: address,
                args,
            },
        ));

        Ok(MinedTransaction {
            tx_hash,
            contract_address: Some(address),
        })
    }

    async fn append(
        &self,
        attachment: &RegistryAttachment,
        identifiers: &IdentifierSet,
    ) -> Result<MinedTransaction, TransactionFailure> {
        let mut ledger = self.ledger.lock();
        ledger.take_rejection()?;

        if !ledger.contracts.contains_key(&attachment.address) {
            return Err(TransactionFailure::UnknownContract(attachment.address));
        }

        let nonce = ledger.next_nonce();
        let tx_hash = TxHash::new(derive_bytes(b"tx", &attachment.signer, nonce));

        if let Some(contract) = ledger.contracts.get_mut(&attachment.address) {
            contract.identifiers.extend(identifiers.iter().copied());
        }
        ledger.transactions.push((
            tx_hash,
            RecordedCall::Append {
                contract: attachment.address,
                appended: identifiers.len(),
            },
        ));

        Ok(MinedTransaction {
            tx_hash,
            contract_address: None,
        })
    }

    async fn identifiers(&self, address: &Address) -> Result<IdentifierSet, TransactionFailure> {
        self.ledger
            .lock()
            .contracts
            .get(address)
            .map(|c| c.identifiers.iter().copied().collect())
            .ok_or(TransactionFailure::UnknownContract(*address))
    }

    fn network(&self) -> String {
        "memory".to_string()
    }
}
