//! Backend selection
//!
//! A live run talks to the configured content store and JSON-RPC node; a
//! dry run swaps both for in-process stand-ins behind the same traits.

use crate::config::AnchorConfig;
use crate::error::ConfigError;
use anchor_publish::{ContentPublisher, IpfsPublisher, MemoryContentStore};
use anchor_registry::{Address, ChainBackend, ContractArtifacts, JsonRpcBackend, MemoryChain};
use std::sync::Arc;

/// Where side effects go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    /// Configured content store and network
    #[default]
    Live,
    /// In-process content store and chain
    DryRun,
}

impl Target {
    #[inline]
    #[must_use]
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Live
        }
    }
}

/// Publisher for a target
///
/// # Errors
/// `ConfigError::ContentStore` if the HTTP client cannot be built
pub fn publisher_for(
    config: &AnchorConfig,
    target: Target,
) -> Result<Arc<dyn ContentPublisher>, ConfigError> {
    match target {
        Target::Live => {
            tracing::debug!("content store {}", config.content_store);
            Ok(Arc::new(IpfsPublisher::new(config.content_store.clone())?))
        }
        Target::DryRun => {
            tracing::warn!("dry run: publishing to an in-memory content store");
            Ok(Arc::new(MemoryContentStore::new()))
        }
    }
}

/// Chain backend for a target
///
/// In a dry run `attach_to` is seeded with an empty registry so an
/// incremental registration has something to append to.
///
/// # Errors
/// `ConfigError::Backend` if the JSON-RPC client cannot be built
pub fn backend_for(
    config: &AnchorConfig,
    target: Target,
    attach_to: Option<Address>,
) -> Result<Arc<dyn ChainBackend>, ConfigError> {
    match target {
        Target::Live => {
            let artifacts = ContractArtifacts::new(config.paths.contract_artifacts.clone());
            let backend = JsonRpcBackend::new(config.network.clone(), artifacts)?;
            Ok(Arc::new(backend))
        }
        Target::DryRun => {
            tracing::warn!("dry run: submitting to an in-memory chain");
            let chain = MemoryChain::new();
            if let Some(address) = attach_to {
                let deployer = config.signer.address.unwrap_or_default();
                chain.seed(address, config.registry.contract.clone(), deployer);
            }
            Ok(Arc::new(chain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_flag_maps_to_target() {
        assert_eq!(Target::from_dry_run(true), Target::DryRun);
        assert_eq!(Target::from_dry_run(false), Target::Live);
    }

    #[tokio::test]
    async fn dry_run_backend_has_seeded_registry() {
        let address = Address::new([0x42; 20]);
        let backend = backend_for(&AnchorConfig::default(), Target::DryRun, Some(address)).unwrap();

        assert_eq!(backend.network(), "memory");
        assert!(backend.identifiers(&address).await.unwrap().is_empty());
    }

    #[test]
    fn live_backends_build_from_defaults() {
        let config = AnchorConfig::default();
        assert_eq!(publisher_for(&config, Target::Live).unwrap().endpoint(), "https://ipfs.infura.io:5001");
        assert_eq!(backend_for(&config, Target::Live, None).unwrap().network(), "localhost");
    }
}
