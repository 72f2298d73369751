//! Asset registration pipeline
//!
//! ```text
//! manifest → PublishStage (one round trip per record) → artifact
//!                                   ↓
//!                         AddressRecordMap → IdentifierSet → RegistryClient
//! ```
//!
//! Nothing reaches the chain until every record is published and the
//! artifact is written, so an aborted run never registers a partial set.

use crate::config::{AnchorConfig, PathsConfig};
use crate::error::{ConfigError, PipelineResult};
use anchor_asset::{derive, AddressRecordMap, AssetIdentifier, ContentAddress, IdentifierSet};
use anchor_publish::{
    load_artifact, load_manifest, CollapsedEntry, ContentPublisher, ManifestTransformer,
};
use anchor_registry::{
    Address, ChainBackend, DeploymentReceipt, RegistryClient, RegistryMode, RegistryOutcome,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Summary of a publishing pass
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// Entries in the manifest
    pub manifest_entries: usize,
    /// Distinct content addresses written to the artifact
    pub published: usize,
    /// Content store round trips
    pub round_trips: usize,
    /// Entries folded into an earlier identical entry
    pub collapsed: Vec<CollapsedEntry>,
    /// Artifact path
    pub artifact: PathBuf,
}

/// Published records plus the report describing them
#[derive(Debug, Clone)]
pub struct PublishedAssets {
    pub report: PublishReport,
    pub records: AddressRecordMap,
}

/// One row of a derivation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierEntry {
    pub address: ContentAddress,
    pub name: String,
    pub identifier: AssetIdentifier,
}

/// Identifier for every address in a map, with the asset name, in map order
#[must_use]
pub fn describe(records: &AddressRecordMap) -> Vec<IdentifierEntry> {
    records
        .iter()
        .map(|(address, record)| IdentifierEntry {
            address: address.clone(),
            name: record.name().to_string(),
            identifier: AssetIdentifier::for_address(address),
        })
        .collect()
}

/// Read an artifact and derive its identifiers
///
/// # Errors
/// `PipelineError::Artifact` if the artifact cannot be read
pub async fn derive_from_artifact(path: impl AsRef<Path>) -> PipelineResult<Vec<IdentifierEntry>> {
    let records = load_artifact(path).await?;
    Ok(describe(&records))
}

/// Derive the identifier of a single key
///
/// # Errors
/// `PipelineError::InvalidInput` for empty or malformed input
pub fn derive_key(key: &str) -> PipelineResult<AssetIdentifier> {
    Ok(derive(key)?)
}

/// Manifest → content store → artifact
#[derive(Debug, Clone)]
pub struct PublishStage<P> {
    transformer: ManifestTransformer<P>,
    paths: PathsConfig,
}

impl<P: ContentPublisher> PublishStage<P> {
    /// Create stage after validating the publishing configuration
    ///
    /// # Errors
    /// `ConfigError` naming the first invalid field
    pub fn new(publisher: P, config: &AnchorConfig) -> Result<Self, ConfigError> {
        config.validate_publishing()?;
        Ok(Self {
            transformer: ManifestTransformer::new(publisher),
            paths: config.paths.clone(),
        })
    }

    /// Load the manifest, publish every record, write the artifact
    ///
    /// # Errors
    /// - `PipelineError::Transform` for manifest, publish or artifact failures
    pub async fn run(&self) -> PipelineResult<PublishedAssets> {
        tracing::info!("Loading {}...", self.paths.manifest.display());
        let manifest = load_manifest(&self.paths.manifest)
            .await
            .map_err(anchor_publish::TransformError::from)?;

        let outcome = self
            .transformer
            .transform_and_persist(&manifest, &self.paths.artifact)
            .await?;

        let report = PublishReport {
            manifest_entries: manifest.len(),
            published: outcome.records.len(),
            round_trips: outcome.round_trips,
            collapsed: outcome.collapsed,
            artifact: self.paths.artifact.clone(),
        };
        Ok(PublishedAssets {
            report,
            records: outcome.records,
        })
    }

    /// Configured paths
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }
}

/// Where a registration run gets its address map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Publish the manifest now
    PublishManifest,
    /// Reuse the artifact of an earlier publishing run
    ExistingArtifact,
}

/// Which registry mode a run commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// New registry seeded with the identifiers
    Deploy,
    /// Append to the registry at `address`
    Register { address: Address },
}

/// Summary of a registration run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Present when the manifest was published in this run
    pub publish: Option<PublishReport>,
    /// Identifiers submitted, in submission order
    pub identifiers: IdentifierSet,
    /// Mined transaction
    pub outcome: RegistryOutcome,
}

/// Publish (or reuse), derive, register
#[derive(Debug, Clone)]
pub struct RegistrationPipeline<P, B> {
    publish: PublishStage<P>,
    registry: RegistryClient<B>,
}

impl<P: ContentPublisher, B: ChainBackend> RegistrationPipeline<P, B> {
    /// Create pipeline after validating the whole configuration
    ///
    /// # Errors
    /// `ConfigError` for a missing signer or the first invalid field
    pub fn new(publisher: P, backend: B, config: &AnchorConfig) -> Result<Self, ConfigError> {
        let signer = config.validate_registration()?;
        Ok(Self {
            publish: PublishStage::new(publisher, config)?,
            registry: RegistryClient::new(backend, signer, config.registry.contract.clone()),
        })
    }

    /// Registry client
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RegistryClient<B> {
        &self.registry
    }

    /// Run one registration
    ///
    /// # Errors
    /// - `PipelineError::Transform` if publishing fails; nothing is submitted
    /// - `PipelineError::Artifact` if a reused artifact cannot be read
    /// - `PipelineError::Transaction` if the transaction fails
    pub async fn run(&self, mode: RunMode, source: RecordSource) -> PipelineResult<RunReport> {
        let (publish, records) = match source {
            RecordSource::PublishManifest => {
                let published = self.publish.run().await?;
                (Some(published.report), published.records)
            }
            RecordSource::ExistingArtifact => {
                let path = &self.publish.paths().artifact;
                tracing::info!("Reading published assets from {}", path.display());
                (None, load_artifact(path).await?)
            }
        };

        let identifiers = IdentifierSet::from_records(&records);
        for entry in describe(&records) {
            tracing::info!("IPFS: {} hashed: {}", entry.address, entry.identifier);
        }

        let mode = match mode {
            RunMode::Deploy => RegistryMode::Deploy {
                identifiers: identifiers.clone(),
            },
            RunMode::Register { address } => RegistryMode::Attach {
                address,
                identifiers: identifiers.clone(),
            },
        };

        tracing::info!("Injecting {} assets into the registry...", identifiers.len());
        let outcome = self.registry.submit(&mode).await?;

        Ok(RunReport {
            publish,
            identifiers,
            outcome,
        })
    }

    /// Deploy an auxiliary contract that takes no constructor arguments
    ///
    /// # Errors
    /// `PipelineError::Transaction` if the deployment fails
    pub async fn deploy_bare(&self, contract: &str) -> PipelineResult<DeploymentReceipt> {
        Ok(self.registry.deploy_bare(contract).await?)
    }
}
