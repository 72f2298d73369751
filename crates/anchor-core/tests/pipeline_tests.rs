//! End-to-end registration runs against in-process backends

use anchor_asset::{derive, IdentifierSet};
use anchor_core::{
    derive_from_artifact, PipelineError, PublishStage, RecordSource, RegistrationPipeline, RunMode,
};
use anchor_publish::{MemoryContentStore, TransformError};
use anchor_registry::{ChainBackend, MemoryChain, RecordedCall, RegistryOutcome};
use anchor_test_utils::{FlakyPublisher, TestWorkspace, ALPHA_BETA, THREE_RECORDS};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn pipeline(
    workspace: &TestWorkspace,
    chain: &Arc<MemoryChain>,
) -> RegistrationPipeline<Arc<MemoryContentStore>, Arc<MemoryChain>> {
    RegistrationPipeline::new(
        Arc::new(MemoryContentStore::new()),
        Arc::clone(chain),
        &workspace.config,
    )
    .unwrap()
}

#[tokio::test]
async fn deploy_registers_manifest_in_order() {
    let workspace = TestWorkspace::with_manifest(ALPHA_BETA);
    let chain = Arc::new(MemoryChain::new());

    let report = pipeline(&workspace, &chain)
        .run(RunMode::Deploy, RecordSource::PublishManifest)
        .await
        .unwrap();

    let publish = report.publish.as_ref().unwrap();
    assert_eq!(publish.manifest_entries, 2);
    assert_eq!(publish.published, 2);
    assert_eq!(publish.round_trips, 2);

    let artifact = workspace.read_artifact();
    let entries = artifact.as_object().unwrap();
    assert_eq!(entries.len(), 2);

    let derived = derive_from_artifact(workspace.artifact_path()).await.unwrap();
    let names: Vec<_> = derived.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Beta"]);

    let expected: IdentifierSet = derived.iter().map(|e| e.identifier).collect();
    assert_eq!(report.identifiers, expected);
    assert!(matches!(report.outcome, RegistryOutcome::Deployed(ref r) if r.registered == 2));
    assert_eq!(chain.identifiers(&report.outcome.address()).await.unwrap(), expected);
    assert_eq!(chain.transactions().len(), 1);
}

#[tokio::test]
async fn empty_manifest_deploys_empty_registry() {
    let workspace = TestWorkspace::with_manifest("{}");
    let chain = Arc::new(MemoryChain::new());

    let report = pipeline(&workspace, &chain)
        .run(RunMode::Deploy, RecordSource::PublishManifest)
        .await
        .unwrap();

    assert_eq!(workspace.read_artifact(), serde_json::json!({}));
    assert!(report.identifiers.is_empty());
    assert!(chain.identifiers(&report.outcome.address()).await.unwrap().is_empty());
}

#[tokio::test]
async fn publish_failure_submits_nothing() {
    let workspace = TestWorkspace::with_manifest(THREE_RECORDS);
    let chain = Arc::new(MemoryChain::new());
    let pipeline = RegistrationPipeline::new(
        FlakyPublisher::failing_on(1),
        Arc::clone(&chain),
        &workspace.config,
    )
    .unwrap();

    let err = pipeline
        .run(RunMode::Deploy, RecordSource::PublishManifest)
        .await
        .unwrap_err();

    assert_eq!(err.step(), "publish");
    assert!(matches!(
        err,
        PipelineError::Transform(TransformError::Publish { ref key, .. }) if key == "two"
    ));
    assert!(!workspace.artifact_path().exists());
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn register_appends_after_existing_identifiers() {
    let workspace = TestWorkspace::with_manifest(ALPHA_BETA);
    let chain = Arc::new(MemoryChain::new());

    let first = pipeline(&workspace, &chain)
        .run(RunMode::Deploy, RecordSource::PublishManifest)
        .await
        .unwrap();
    let registry = first.outcome.address();
    let seeded = chain.identifiers(&registry).await.unwrap();

    workspace.write_manifest(r#"{ "c": { "name": "Gamma" } }"#);
    let second = pipeline(&workspace, &chain)
        .run(RunMode::Register { address: registry }, RecordSource::PublishManifest)
        .await
        .unwrap();

    assert!(matches!(second.outcome, RegistryOutcome::Appended(ref r) if r.appended == 1));
    let after = chain.identifiers(&registry).await.unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(&after.as_slice()[..2], seeded.as_slice());
    assert_eq!(after.as_slice()[2], second.identifiers.as_slice()[0]);
    assert!(matches!(
        chain.transactions().last(),
        Some((_, RecordedCall::Append { appended: 1, .. }))
    ));
}

#[tokio::test]
async fn existing_artifact_skips_publishing() {
    let workspace = TestWorkspace::with_manifest(ALPHA_BETA);
    let store = Arc::new(MemoryContentStore::new());
    PublishStage::new(Arc::clone(&store), &workspace.config)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(store.round_trips(), 2);

    let chain = Arc::new(MemoryChain::new());
    let pipeline =
        RegistrationPipeline::new(Arc::clone(&store), Arc::clone(&chain), &workspace.config).unwrap();
    let report = pipeline
        .run(RunMode::Deploy, RecordSource::ExistingArtifact)
        .await
        .unwrap();

    assert!(report.publish.is_none());
    assert_eq!(store.round_trips(), 2);
    assert_eq!(report.identifiers.len(), 2);
}

#[tokio::test]
async fn missing_artifact_is_reported() {
    let workspace = TestWorkspace::with_manifest(ALPHA_BETA);
    let chain = Arc::new(MemoryChain::new());

    let err = pipeline(&workspace, &chain)
        .run(RunMode::Deploy, RecordSource::ExistingArtifact)
        .await
        .unwrap_err();

    assert_eq!(err.step(), "artifact");
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn identifiers_follow_content_addresses() {
    let workspace = TestWorkspace::with_manifest(ALPHA_BETA);
    let chain = Arc::new(MemoryChain::new());
    pipeline(&workspace, &chain)
        .run(RunMode::Deploy, RecordSource::PublishManifest)
        .await
        .unwrap();

    for entry in derive_from_artifact(workspace.artifact_path()).await.unwrap() {
        assert_eq!(entry.identifier, derive(entry.address.as_str()).unwrap());
    }
}
