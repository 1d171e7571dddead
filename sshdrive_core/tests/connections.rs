use sshdrive_core::{
    AuthType, ConnectionDraft, MountStatus, Operation, ServiceError, SyncError, SyncOrchestrator,
};

mod common;
use common::fake_service::{Call, FakeService};
use common::{init_logging, letter, letters, profile};

fn dev_draft() -> ConnectionDraft {
    ConnectionDraft {
        name: "dev".into(),
        host: "10.0.0.1".into(),
        port: 22,
        username: "u".into(),
        auth_type: AuthType::Password,
        remote_path: "/".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn saving_a_new_profile_caches_the_assigned_id() {
    init_logging();
    let service = FakeService::new().with_profile(profile("c1", "existing"));
    let orchestrator = SyncOrchestrator::new(service.clone());
    orchestrator.refresh().await.unwrap();

    let draft = dev_draft().into_profile().expect("draft is valid");
    assert!(draft.is_new());
    let saved = orchestrator
        .save_connection(draft, Some("hunter2".into()))
        .await
        .expect("save should succeed");

    assert!(!saved.id.is_empty());
    let connections = orchestrator.connections().await;
    assert_eq!(connections.len(), 2);
    assert_eq!(connections.iter().filter(|p| p.id == saved.id).count(), 1);
    assert_eq!(connections.last().map(|p| p.id.as_str()), Some(saved.id.as_str()));

    let view = orchestrator.views().await.pop().unwrap();
    assert_eq!(view.profile.name, "dev");
    assert!(!view.is_connected);
}

#[tokio::test]
async fn editing_a_profile_keeps_its_position() {
    init_logging();
    let service = FakeService::new()
        .with_profile(profile("a", "first"))
        .with_profile(profile("b", "second"))
        .with_profile(profile("c", "third"));
    let orchestrator = SyncOrchestrator::new(service);
    orchestrator.refresh().await.unwrap();

    let mut edited = orchestrator.connection("b").await.unwrap();
    edited.name = "renamed".into();
    edited.port = 2222;
    orchestrator.save_connection(edited, None).await.unwrap();

    let names: Vec<String> = orchestrator
        .connections()
        .await
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["first", "renamed", "third"]);
}

#[tokio::test]
async fn failed_save_leaves_the_registry_alone() {
    init_logging();
    let service = FakeService::new();
    let orchestrator = SyncOrchestrator::new(service.clone());
    orchestrator.refresh().await.unwrap();
    service.fail(Call::SaveConnection);

    let err = orchestrator
        .save_connection(dev_draft().into_profile().unwrap(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::RemoteCallFailed {
            operation: Operation::SaveConnection,
            ..
        }
    ));
    assert!(orchestrator.connections().await.is_empty());
    assert!(orchestrator.errors().current().is_some());
}

#[tokio::test]
async fn invalid_profile_never_reaches_the_service() {
    init_logging();
    let service = FakeService::new();
    let orchestrator = SyncOrchestrator::new(service.clone());

    let mut keyless = profile("", "key box");
    keyless.auth_type = AuthType::Key;
    let err = orchestrator.save_connection(keyless, None).await.unwrap_err();

    assert!(matches!(err, SyncError::InvalidProfile(_)));
    assert_eq!(service.count(Call::SaveConnection), 0);
    assert!(orchestrator.errors().current().is_some());
}

#[tokio::test]
async fn deleting_an_unknown_id_still_asks_the_service() {
    init_logging();
    let service = FakeService::new().with_profile(profile("c1", "keep me"));
    let orchestrator = SyncOrchestrator::new(service.clone());
    orchestrator.refresh().await.unwrap();

    let err = orchestrator
        .delete_connection("missing")
        .await
        .expect_err("the service does not know this id");

    assert!(matches!(
        err,
        SyncError::RemoteCallFailed {
            operation: Operation::DeleteConnection,
            cause: ServiceError::NotFound(_),
        }
    ));
    assert_eq!(service.count(Call::DeleteConnection), 1);
    assert!(orchestrator
        .errors()
        .current()
        .is_some_and(|message| message.contains("delete_connection")));
    assert_eq!(orchestrator.connections().await.len(), 1);
}

#[tokio::test]
async fn deleting_removes_the_profile_from_the_view() {
    init_logging();
    let service = FakeService::new()
        .with_profile(profile("c1", "one"))
        .with_profile(profile("c2", "two"));
    let orchestrator = SyncOrchestrator::new(service);
    orchestrator.refresh().await.unwrap();

    orchestrator.delete_connection("c1").await.unwrap();
    let ids: Vec<String> = orchestrator
        .views()
        .await
        .iter()
        .map(|v| v.id().to_string())
        .collect();
    assert_eq!(ids, vec!["c2"]);
}

#[tokio::test]
async fn deleting_a_mounted_profile_leaves_its_mount_in_place() {
    init_logging();
    let service = FakeService::new()
        .with_profile(profile("c1", "mounted"))
        .with_mount(MountStatus::connected(letter('E'), "c1"))
        .with_letters(letters("FG"));
    let orchestrator = SyncOrchestrator::new(service);
    orchestrator.refresh().await.unwrap();

    orchestrator.delete_connection("c1").await.unwrap();

    assert!(orchestrator.views().await.is_empty());
    assert_eq!(orchestrator.mounts().await.len(), 1);
    assert_eq!(orchestrator.available_letters().await, letters("FG"));
}

#[tokio::test]
async fn connection_test_is_forwarded_and_failures_are_published() {
    init_logging();
    let service = FakeService::new();
    let orchestrator = SyncOrchestrator::new(service.clone());
    let candidate = dev_draft().into_profile().unwrap();

    assert!(orchestrator
        .test_connection(&candidate, Some("pw"))
        .await
        .unwrap());
    assert!(orchestrator.connections().await.is_empty());

    service.fail(Call::TestConnection);
    let err = orchestrator
        .test_connection(&candidate, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::RemoteCallFailed {
            operation: Operation::TestConnection,
            ..
        }
    ));
    assert!(orchestrator.errors().current().is_some());
}
