//! Testing utilities for the Anchor workspace
//!
//! Shared fixtures: sample manifests, a publisher that fails on demand,
//! a scratch workspace with a ready configuration and a stub HTTP server.

#![allow(missing_docs)]

mod stub;

pub use stub::{StubRequest, StubServer};

use anchor_asset::{ContentAddress, Manifest};
use anchor_core::AnchorConfig;
use anchor_publish::{ContentPublisher, MemoryContentStore, PublishFailure};
use anchor_registry::Address;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Hardhat's second default account
pub const SIGNER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

pub fn signer() -> Address {
    SIGNER.parse().unwrap()
}

/// Two distinct records, `a` then `b`
pub const ALPHA_BETA: &str = r#"{
  "a": { "name": "Alpha", "image": "ipfs://QmAlphaImage", "edition": 1 },
  "b": { "name": "Beta", "image": "ipfs://QmBetaImage", "edition": 2 }
}"#;

/// Three distinct records: `one`, `two`, `three`
pub const THREE_RECORDS: &str = r#"{
  "one": { "name": "One" },
  "two": { "name": "Two" },
  "three": { "name": "Three" }
}"#;

/// `copy` and `again` hold the same fields in a different order
pub const DUPLICATE_RECORDS: &str = r#"{
  "first": { "name": "Original" },
  "copy": { "name": "Twin", "edition": 7 },
  "again": { "edition": 7, "name": "Twin" }
}"#;

pub fn manifest(text: &str) -> Manifest {
    Manifest::from_json_str(text).unwrap()
}

/// Content store that fails on one call, by zero-based index
#[derive(Debug)]
pub struct FlakyPublisher {
    inner: MemoryContentStore,
    fail_on: usize,
    calls: AtomicUsize,
}

impl FlakyPublisher {
    pub fn failing_on(fail_on: usize) -> Self {
        Self {
            inner: MemoryContentStore::new(),
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &MemoryContentStore {
        &self.inner
    }
}

#[async_trait::async_trait]
impl ContentPublisher for FlakyPublisher {
    async fn add(&self, payload: Vec<u8>) -> Result<ContentAddress, PublishFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            return Err(PublishFailure::unavailable(self.endpoint(), "connection reset"));
        }
        self.inner.add(payload).await
    }

    fn endpoint(&self) -> String {
        "flaky://".to_string()
    }
}

/// Scratch directory with manifest and artifact paths wired into a config
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
    pub config: AnchorConfig,
}

impl TestWorkspace {
    /// Workspace with `manifest` written to `artwork.json` and a signer set
    pub fn with_manifest(manifest: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("artwork.json");
        std::fs::write(&manifest_path, manifest).unwrap();

        let config = AnchorConfig::new()
            .with_signer(signer())
            .with_paths(manifest_path, dir.path().join("uploaded.json"));
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.config.paths.artifact.clone()
    }

    /// Replace the manifest on disk
    pub fn write_manifest(&self, manifest: &str) {
        std::fs::write(&self.config.paths.manifest, manifest).unwrap();
    }

    pub fn read_artifact(&self) -> Value {
        serde_json::from_slice(&std::fs::read(self.artifact_path()).unwrap()).unwrap()
    }
}
