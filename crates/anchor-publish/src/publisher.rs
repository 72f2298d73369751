//! Content publisher seam
//!
//! A [`ContentPublisher`] pushes bytes to a content-addressable store and
//! returns the address the store assigned. Records are always encoded with
//! [`AssetRecord::canonical_bytes`] first, so identical records map to
//! identical addresses on every run and machine.

use crate::error::PublishFailure;
use anchor_asset::{AssetRecord, ContentAddress};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Content-addressable store client
#[async_trait::async_trait]
pub trait ContentPublisher: Send + Sync {
    /// Add raw bytes to the store; one round trip, no caching
    async fn add(&self, payload: Vec<u8>) -> Result<ContentAddress, PublishFailure>;

    /// Human-readable location of the store, for diagnostics
    fn endpoint(&self) -> String;

    /// Publish a record's canonical encoding
    async fn publish(&self, record: &AssetRecord) -> Result<ContentAddress, PublishFailure> {
        let payload = record.canonical_bytes()?;
        self.add(payload).await
    }
}

#[async_trait::async_trait]
impl<T: ContentPublisher + ?Sized> ContentPublisher for Arc<T> {
    async fn add(&self, payload: Vec<u8>) -> Result<ContentAddress, PublishFailure> {
        (**self).add(payload).await
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// In-process content store
///
/// Addresses are `mem-` followed by the hex SHA-256 of the payload. Used by
/// tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    objects: Mutex<HashMap<ContentAddress, Vec<u8>>>,
    round_trips: AtomicUsize,
}

impl MemoryContentStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address this store assigns to a payload
    ///
    /// # Errors
    /// Returns error if the generated address fails validation
    pub fn address_of(payload: &[u8]) -> Result<ContentAddress, PublishFailure> {
        let digest = Sha256::digest(payload);
        Ok(ContentAddress::new(format!("mem-{}", hex::encode(digest)))?)
    }

    /// Stored bytes for an address
    #[must_use]
    pub fn get(&self, address: &ContentAddress) -> Option<Vec<u8>> {
        self.objects.lock().get(address).cloned()
    }

    /// Number of distinct objects held
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.lock().len()
    }

    /// Number of `add` calls served
    #[must_use]
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ContentPublisher for MemoryContentStore {
    async fn add(&self, payload: Vec<u8>) -> Result<ContentAddress, PublishFailure> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let address = Self::address_of(&payload)?;
        self.objects.lock().insert(address.clone(), payload);
        Ok(address)
    }

    fn endpoint(&self) -> String {
        "memory://".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> AssetRecord {
        AssetRecord::from_value("test", value).unwrap()
    }

    #[tokio::test]
    async fn memory_store_is_content_addressed() {
        let store = MemoryContentStore::new();
        let a = store.publish(&record(json!({ "name": "Alpha", "x": 1 }))).await.unwrap();
        let b = store.publish(&record(json!({ "x": 1, "name": "Alpha" }))).await.unwrap();
        let c = store.publish(&record(json!({ "name": "Beta" }))).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.as_str().starts_with("mem-"));
    }

    #[tokio::test]
    async fn memory_store_round_trips_every_call() {
        let store = MemoryContentStore::new();
        let r = record(json!({ "name": "Alpha" }));
        store.publish(&r).await.unwrap();
        store.publish(&r).await.unwrap();

        assert_eq!(store.round_trips(), 2);
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn memory_store_keeps_canonical_bytes() {
        let store = MemoryContentStore::new();
        let address = store.publish(&record(json!({ "z": 0, "name": "Alpha" }))).await.unwrap();
        assert_eq!(store.get(&address).unwrap(), br#"{"name":"Alpha","z":0}"#.to_vec());
    }
}
