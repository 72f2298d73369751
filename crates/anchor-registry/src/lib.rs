//! Anchor Registry Client
//!
//! Feeds derived asset identifiers to the on-chain registry contract.
//!
//! # Modes
//!
//! - [`RegistryMode::Deploy`]: create a new registry seeded with identifiers
//! - [`RegistryMode::Attach`]: append identifiers to a deployed registry
//!
//! Both modes submit exactly one transaction and neither is idempotent.
//!
//! # Example
//!
//! ```rust,ignore
//! use anchor_registry::{MemoryChain, RegistryClient, RegistryMode};
//!
//! # async fn example(signer: anchor_registry::Address, ids: anchor_asset::IdentifierSet) -> Result<(), Box<dyn std::error::Error>> {
//! let client = RegistryClient::new(MemoryChain::new(), signer, "MyAssets");
//! let outcome = client.submit(&RegistryMode::Deploy { identifiers: ids }).await?;
//! println!("registry at {}", outcome.address());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod abi;
pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod mode;
pub mod rpc;
mod types;

pub use backend::{ChainBackend, MinedTransaction};
pub use client::RegistryClient;
pub use error::TransactionFailure;
pub use memory::{DeployedContract, MemoryChain, RecordedCall};
pub use mode::{
    ConstructorArgs, DeploymentReceipt, RegistrationReceipt, RegistryAttachment,
    RegistryDeploymentDescriptor, RegistryMode, RegistryOutcome, DEFAULT_CONTRACT,
};
pub use rpc::{ContractArtifacts, JsonRpcBackend, NetworkConfig};
pub use types::{Address, ParseValueError, TxHash};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
