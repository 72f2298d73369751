//! Manifest Transformer
//!
//! Drives the publisher over every manifest record, in manifest order, and
//! builds the [`AddressRecordMap`]. Publishing is sequential so the map's
//! order, and hence the identifier order, is reproducible.

use crate::artifact::write_artifact;
use crate::error::TransformError;
use crate::publisher::ContentPublisher;
use anchor_asset::{AddressRecordMap, ContentAddress, Manifest};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A manifest entry whose content matched an earlier entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapsedEntry {
    /// Key of the later entry that was folded away
    pub key: String,
    /// Key of the entry that holds the address in the map
    pub kept_key: String,
    /// Shared content address
    pub address: ContentAddress,
}

/// Result of publishing a whole manifest
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    /// Published address → record map, in publish order
    pub records: AddressRecordMap,
    /// Entries that collapsed onto an existing address
    pub collapsed: Vec<CollapsedEntry>,
    /// Content store round trips made
    pub round_trips: usize,
}

/// Publishes manifests through a [`ContentPublisher`]
#[derive(Debug, Clone)]
pub struct ManifestTransformer<P> {
    publisher: P,
}

impl<P: ContentPublisher> ManifestTransformer<P> {
    /// Create transformer over a publisher
    #[inline]
    #[must_use]
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    /// Underlying publisher
    #[inline]
    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Publish every record and build the address map in memory
    ///
    /// Stops at the first failing record; nothing is returned for a
    /// partial run.
    ///
    /// # Errors
    /// `TransformError::Publish` naming the index and key of the failing record
    pub async fn transform(&self, manifest: &Manifest) -> Result<TransformOutcome, TransformError> {
        let mut outcome = TransformOutcome::default();
        let mut owners: HashMap<ContentAddress, String> = HashMap::with_capacity(manifest.len());

        tracing::info!(
            "Publishing {} records to {}",
            manifest.len(),
            self.publisher.endpoint()
        );

        for (index, (key, record)) in manifest.iter().enumerate() {
            tracing::info!("Uploading {}...", record.name());

            let address = self.publisher.publish(record).await.map_err(|source| {
                tracing::error!("Upload of '{}' failed: {}", key, source);
                TransformError::Publish {
                    index,
                    key: key.to_string(),
                    source,
                }
            })?;
            outcome.round_trips += 1;

            tracing::info!("{} ipfs: {}", record.name(), address);

            if outcome.records.insert(address.clone(), record.clone()) {
                owners.insert(address, key.to_string());
            } else {
                let kept_key = owners.get(&address).cloned().unwrap_or_default();
                tracing::warn!(
                    "'{}' has the same content as '{}' ({}); keeping one entry",
                    key,
                    kept_key,
                    address
                );
                outcome.collapsed.push(CollapsedEntry {
                    key: key.to_string(),
                    kept_key,
                    address,
                });
            }
        }

        Ok(outcome)
    }

    /// Publish every record, then persist the map to `artifact`
    ///
    /// The artifact is only touched after the full pass succeeds.
    ///
    /// # Errors
    /// - `TransformError::Publish` for the first failing record
    /// - `TransformError::Artifact` if the artifact cannot be written
    pub async fn transform_and_persist(
        &self,
        manifest: &Manifest,
        artifact: impl AsRef<Path>,
    ) -> Result<TransformOutcome, TransformError> {
        let outcome = self.transform(manifest).await?;
        write_artifact(artifact, &outcome.records).await?;
        Ok(outcome)
    }
}
