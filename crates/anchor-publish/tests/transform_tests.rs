//! Publishing against failing and duplicating content stores

use anchor_publish::{load_artifact, ManifestTransformer, PublishFailure, TransformError};
use anchor_test_utils::{manifest, FlakyPublisher, TestWorkspace, DUPLICATE_RECORDS, THREE_RECORDS};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn failing_record_aborts_without_artifact() {
    let workspace = TestWorkspace::with_manifest(THREE_RECORDS);
    let publisher = Arc::new(FlakyPublisher::failing_on(1));
    let transformer = ManifestTransformer::new(Arc::clone(&publisher));

    let err = transformer
        .transform_and_persist(&manifest(THREE_RECORDS), workspace.artifact_path())
        .await
        .unwrap_err();

    match err {
        TransformError::Publish { index, key, source } => {
            assert_eq!(index, 1);
            assert_eq!(key, "two");
            assert!(matches!(source, PublishFailure::Unavailable { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(publisher.calls(), 2);
    assert!(!workspace.artifact_path().exists());
}

#[tokio::test]
async fn failed_rerun_keeps_previous_artifact() {
    let workspace = TestWorkspace::with_manifest(THREE_RECORDS);
    let records = manifest(THREE_RECORDS);

    let healthy = ManifestTransformer::new(FlakyPublisher::failing_on(usize::MAX));
    healthy
        .transform_and_persist(&records, workspace.artifact_path())
        .await
        .unwrap();
    let before = workspace.read_artifact();

    let flaky = ManifestTransformer::new(FlakyPublisher::failing_on(2));
    assert!(flaky
        .transform_and_persist(&records, workspace.artifact_path())
        .await
        .is_err());

    assert_eq!(workspace.read_artifact(), before);
}

#[tokio::test]
async fn identical_content_collapses_to_first_key() {
    let workspace = TestWorkspace::with_manifest(DUPLICATE_RECORDS);
    let publisher = FlakyPublisher::failing_on(usize::MAX);
    let transformer = ManifestTransformer::new(publisher);

    let outcome = transformer
        .transform_and_persist(&manifest(DUPLICATE_RECORDS), workspace.artifact_path())
        .await
        .unwrap();

    assert_eq!(outcome.round_trips, 3);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.collapsed.len(), 1);
    assert_eq!(outcome.collapsed[0].key, "again");
    assert_eq!(outcome.collapsed[0].kept_key, "copy");
    assert_eq!(transformer.publisher().store().object_count(), 2);

    let reloaded = load_artifact(workspace.artifact_path()).await.unwrap();
    assert_eq!(reloaded, outcome.records);
}
