//! Registry operating modes and transaction descriptors
//!
//! Each invocation commits to exactly one [`RegistryMode`]. Neither mode is
//! idempotent: deploying again creates a new contract, and appending the
//! same batch again stores duplicates unless the contract itself dedupes.

use crate::types::{Address, TxHash};
use anchor_asset::IdentifierSet;
use serde::Serialize;

/// Default name of the registry contract
pub const DEFAULT_CONTRACT: &str = "MyAssets";

/// What this invocation does on-chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryMode {
    /// Create a new registry seeded with `identifiers`
    Deploy { identifiers: IdentifierSet },
    /// Append `identifiers` to the registry at `address`
    Attach {
        address: Address,
        identifiers: IdentifierSet,
    },
}

impl RegistryMode {
    /// Identifiers this mode submits
    #[inline]
    #[must_use]
    pub fn identifiers(&self) -> &IdentifierSet {
        match self {
            Self::Deploy { identifiers } | Self::Attach { identifiers, .. } => identifiers,
        }
    }

    /// Short label for logs
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::Attach { .. } => "register",
        }
    }
}

/// Constructor arguments of a deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArgs {
    /// Contract takes no arguments
    None,
    /// Single `bytes32[]` argument, possibly empty
    Identifiers(IdentifierSet),
}

impl ConstructorArgs {
    /// Identifiers passed to the constructor, if any
    #[must_use]
    pub fn identifiers(&self) -> Option<&IdentifierSet> {
        match self {
            Self::None => None,
            Self::Identifiers(ids) => Some(ids),
        }
    }
}

/// Parameters of a contract-creation transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDeploymentDescriptor {
    /// Signing account
    pub deployer: Address,
    /// Contract name, as compiled
    pub contract: String,
    /// Constructor arguments
    pub args: ConstructorArgs,
}

/// Reference to a deployed registry for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAttachment {
    /// Signing account
    pub signer: Address,
    /// Contract name, for diagnostics
    pub contract: String,
    /// Deployed address
    pub address: Address,
}

/// Mined contract creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReceipt {
    pub contract: String,
    pub address: Address,
    pub tx_hash: TxHash,
    /// Identifiers passed to the constructor
    pub registered: usize,
}

/// Mined append transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationReceipt {
    pub contract: String,
    pub address: Address,
    pub tx_hash: TxHash,
    /// Identifiers appended
    pub appended: usize,
}

/// Outcome of submitting a mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RegistryOutcome {
    Deployed(DeploymentReceipt),
    Appended(RegistrationReceipt),
}

impl RegistryOutcome {
    /// Transaction that carried the identifiers
    #[must_use]
    pub fn tx_hash(&self) -> TxHash {
        match self {
            Self::Deployed(r) => r.tx_hash,
            Self::Appended(r) => r.tx_hash,
        }
    }

    /// Registry address
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Self::Deployed(r) => r.address,
            Self::Appended(r) => r.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_asset::derive;

    #[test]
    fn mode_exposes_identifiers() {
        let ids: IdentifierSet = vec![derive("QmA").unwrap()].into();
        let deploy = RegistryMode::Deploy {
            identifiers: ids.clone(),
        };
        let attach = RegistryMode::Attach {
            address: Address::new([1; 20]),
            identifiers: ids.clone(),
        };

        assert_eq!(deploy.identifiers(), &ids);
        assert_eq!(attach.identifiers(), &ids);
        assert_eq!(deploy.label(), "deploy");
        assert_eq!(attach.label(), "register");
    }

    #[test]
    fn constructor_args_distinguish_none_from_empty() {
        assert!(ConstructorArgs::None.identifiers().is_none());
        assert_eq!(
            ConstructorArgs::Identifiers(IdentifierSet::new()).identifiers(),
            Some(&IdentifierSet::new())
        );
    }

    #[test]
    fn outcome_serializes_with_mode_tag() {
        let outcome = RegistryOutcome::Appended(RegistrationReceipt {
            contract: DEFAULT_CONTRACT.to_string(),
            address: Address::new([2; 20]),
            tx_hash: TxHash::new([3; 32]),
            appended: 2,
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["mode"], "appended");
        assert_eq!(json["appended"], 2);
    }
}
