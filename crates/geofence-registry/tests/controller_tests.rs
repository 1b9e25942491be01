//! Controller tests against a mocked geofencing service.

mod common;

use async_trait::async_trait;
use common::{fence, ids, RecordingListener};
use geofence_registry::{ControllerSettings, GeofenceController, NamedGeofence, RegistryError};
use geofencing_client::{
    GeofencingError, GeofencingRequest, GeofencingService, InitialTrigger, SessionId, Status,
    TransitionTarget,
};
use mockall::{mock, Sequence};
use preference_store::{MemoryPreferences, PreferenceStore};
use std::sync::Arc;

mock! {
    pub Service {}

    #[async_trait]
    impl GeofencingService for Service {
        async fn connect(&self) -> Result<SessionId, GeofencingError>;
        async fn add_geofences(
            &self,
            session: &SessionId,
            request: &GeofencingRequest,
            target: &TransitionTarget,
        ) -> Result<Status, GeofencingError>;
        async fn remove_geofences(
            &self,
            session: &SessionId,
            ids: &[String],
        ) -> Result<Status, GeofencingError>;
        async fn disconnect(&self, session: &SessionId) -> Result<(), GeofencingError>;
    }
}

fn store() -> MemoryPreferences {
    MemoryPreferences::new("Geofences").unwrap()
}

async fn seeded_store(fences: &[NamedGeofence]) -> MemoryPreferences {
    let store = store();
    for f in fences {
        store.put(&f.id, &f.to_json().unwrap()).await.unwrap();
    }
    store
}

async fn create_controller(service: MockService, store: &MemoryPreferences) -> GeofenceController {
    GeofenceController::initialize(
        Arc::new(store.clone()),
        Arc::new(service),
        ControllerSettings::new(TransitionTarget::new("transitions")),
    )
    .await
    .unwrap()
}

/// Expect one session that is opened and closed.
fn expect_session(service: &mut MockService) {
    service
        .expect_connect()
        .times(1)
        .returning(|| Ok(SessionId("s1".into())));
    service
        .expect_disconnect()
        .withf(|session| session.as_str() == "s1")
        .times(1)
        .returning(|_| Ok(()));
}

#[tokio::test]
async fn test_initialize_loads_sorted_geofences() {
    let store = seeded_store(&[fence("c", "charlie"), fence("a", "Bravo"), fence("b", "alpha")]).await;

    let controller = create_controller(MockService::new(), &store).await;

    assert_eq!(ids(&controller.named_geofences().await), vec!["b", "a", "c"]);
    assert_eq!(controller.len().await, 3);
}

#[tokio::test]
async fn test_initialize_skips_corrupt_records() {
    let store = seeded_store(&[fence("a", "Alpha")]).await;
    store.put("broken", "{\"id\": 42").await.unwrap();

    let controller = create_controller(MockService::new(), &store).await;

    assert_eq!(ids(&controller.named_geofences().await), vec!["a"]);
    // The corrupt record is left for manual repair.
    assert!(store.get("broken").await.unwrap().is_some());
}

#[tokio::test]
async fn test_add_geofence_success() {
    let mut service = MockService::new();
    let mut seq = Sequence::new();

    service
        .expect_connect()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(SessionId("s1".into())));
    service
        .expect_add_geofences()
        .withf(|session, request, target| {
            session.as_str() == "s1"
                && request.initial_trigger == InitialTrigger::Enter
                && request.geofences.len() == 1
                && request.geofences[0].request_id == "home"
                && target.route == "transitions"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(Status::success()));
    service
        .expect_disconnect()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();
    let home = fence("home", "Home");

    controller.add_geofence(home.clone(), &listener).await.unwrap();

    assert_eq!(controller.named_geofences().await, vec![home.clone()]);
    let stored = store.get("home").await.unwrap().unwrap();
    assert_eq!(NamedGeofence::from_json(&stored).unwrap(), home);
    assert_eq!(listener.updated_count(), 1);
    assert_eq!(listener.error_count(), 0);
}

#[tokio::test]
async fn test_add_geofence_keeps_display_order() {
    let mut service = MockService::new();
    service
        .expect_connect()
        .times(2)
        .returning(|| Ok(SessionId("s1".into())));
    service
        .expect_add_geofences()
        .times(2)
        .returning(|_, _, _| Ok(Status::success()));
    service.expect_disconnect().times(2).returning(|_| Ok(()));

    let store = seeded_store(&[fence("m", "Market")]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller.add_geofence(fence("z", "Zoo"), &listener).await.unwrap();
    controller.add_geofence(fence("a", "airport"), &listener).await.unwrap();

    assert_eq!(ids(&controller.named_geofences().await), vec!["a", "m", "z"]);
    assert_eq!(listener.updated_count(), 2);
}

#[tokio::test]
async fn test_add_geofence_replaces_same_id() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_add_geofences()
        .times(1)
        .returning(|_, _, _| Ok(Status::success()));

    let store = seeded_store(&[fence("home", "Home")]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let mut moved = fence("home", "New home");
    moved.radius = 300.0;
    controller.add_geofence(moved.clone(), &listener).await.unwrap();

    assert_eq!(controller.named_geofences().await, vec![moved.clone()]);
    let stored = store.get("home").await.unwrap().unwrap();
    assert_eq!(NamedGeofence::from_json(&stored).unwrap(), moved);
}

#[tokio::test]
async fn test_add_geofence_rejected_leaves_state_unchanged() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_add_geofences()
        .times(1)
        .returning(|_, _, _| Ok(Status::error(1001, "GEOFENCE_TOO_MANY_GEOFENCES")));

    let store = seeded_store(&[fence("a", "Alpha")]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.add_geofence(fence("home", "Home"), &listener).await;

    assert!(matches!(
        result,
        Err(RegistryError::ServiceRejected { code: 1001, .. })
    ));
    assert_eq!(ids(&controller.named_geofences().await), vec!["a"]);
    assert_eq!(store.len().await, 1);
    assert!(store.get("home").await.unwrap().is_none());
    assert_eq!(listener.updated_count(), 0);
    assert_eq!(listener.error_count(), 1);
}

#[tokio::test]
async fn test_add_geofence_service_error_still_disconnects() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service.expect_add_geofences().times(1).returning(|_, _, _| {
        Err(GeofencingError::Api {
            status: 500,
            message: "boom".into(),
        })
    });

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.add_geofence(fence("home", "Home"), &listener).await;

    assert!(matches!(result, Err(RegistryError::Service(_))));
    assert!(controller.is_empty().await);
    assert_eq!(listener.error_count(), 1);
}

#[tokio::test]
async fn test_add_geofence_connection_failed_reports_error() {
    let mut service = MockService::new();
    service
        .expect_connect()
        .times(1)
        .returning(|| Err(GeofencingError::ConnectionFailed("refused".into())));
    service.expect_add_geofences().never();
    service.expect_disconnect().never();

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.add_geofence(fence("home", "Home"), &listener).await;

    assert!(matches!(result, Err(RegistryError::ConnectionFailed(_))));
    assert!(controller.is_empty().await);
    assert!(store.is_empty().await);
    assert_eq!(listener.error_count(), 1);
    assert_eq!(listener.updated_count(), 0);
}

#[tokio::test]
async fn test_add_invalid_geofence_skips_service() {
    let mut service = MockService::new();
    service.expect_connect().never();

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let mut bad = fence("home", "Home");
    bad.radius = -5.0;
    let result = controller.add_geofence(bad, &listener).await;

    assert!(matches!(result, Err(RegistryError::InvalidGeofence(_))));
    assert_eq!(listener.error_count(), 1);
    assert!(controller.is_empty().await);
}

#[tokio::test]
async fn test_remove_geofences_success() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_remove_geofences()
        .withf(|_, ids| ids.len() == 2 && ids[0] == "f1" && ids[1] == "f2")
        .times(1)
        .returning(|_, _| Ok(Status::success()));

    let f1 = fence("f1", "One");
    let f2 = fence("f2", "Two");
    let keep = fence("keep", "Keep");
    let store = seeded_store(&[f1.clone(), f2.clone(), keep.clone()]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller
        .remove_geofences(&[f1, f2], &listener)
        .await
        .unwrap();

    assert_eq!(controller.named_geofences().await, vec![keep]);
    let remaining = store.get_all().await.unwrap();
    assert_eq!(remaining.keys().collect::<Vec<_>>(), vec!["keep"]);
    assert_eq!(listener.updated_count(), 1);
    assert_eq!(listener.error_count(), 0);
}

#[tokio::test]
async fn test_remove_geofences_skips_unknown_ids() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_remove_geofences()
        .times(1)
        .returning(|_, _| Ok(Status::success()));

    let a = fence("a", "Alpha");
    let store = seeded_store(&[a.clone()]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller
        .remove_geofences(&[fence("ghost", "Ghost"), a], &listener)
        .await
        .unwrap();

    assert!(controller.is_empty().await);
    assert!(store.is_empty().await);
    assert_eq!(listener.updated_count(), 1);
}

#[tokio::test]
async fn test_remove_geofences_rejected_removes_nothing() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_remove_geofences()
        .times(1)
        .returning(|_, _| Ok(Status::error(13, "ERROR")));

    let a = fence("a", "Alpha");
    let b = fence("b", "Bravo");
    let store = seeded_store(&[a.clone(), b.clone()]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.remove_geofences(&[a], &listener).await;

    assert!(result.is_err());
    assert_eq!(ids(&controller.named_geofences().await), vec!["a", "b"]);
    assert_eq!(store.len().await, 2);
    assert_eq!(listener.error_count(), 1);
    assert_eq!(listener.updated_count(), 0);
}

#[tokio::test]
async fn test_remove_geofences_suspended_reports_error() {
    let mut service = MockService::new();
    service
        .expect_connect()
        .times(1)
        .returning(|| Err(GeofencingError::ConnectionSuspended("service restarting".into())));
    service.expect_remove_geofences().never();

    let a = fence("a", "Alpha");
    let store = seeded_store(&[a.clone()]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.remove_geofences(&[a], &listener).await;

    assert!(matches!(result, Err(RegistryError::ConnectionSuspended(_))));
    assert_eq!(controller.len().await, 1);
    assert_eq!(listener.error_count(), 1);
    assert!(listener.errors()[0].contains("service restarting"));
}

#[tokio::test]
async fn test_remove_geofences_suspended_mid_call_reports_error() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_remove_geofences()
        .times(1)
        .returning(|_, _| Err(GeofencingError::ConnectionSuspended("lost binding".into())));

    let a = fence("a", "Alpha");
    let b = fence("b", "Bravo");
    let store = seeded_store(&[a.clone(), b.clone()]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    let result = controller.remove_geofences(&[a, b], &listener).await;

    assert!(matches!(result, Err(RegistryError::ConnectionSuspended(_))));
    assert_eq!(ids(&controller.named_geofences().await), vec!["a", "b"]);
    assert_eq!(store.len().await, 2);
    assert_eq!(listener.error_count(), 1);
    assert_eq!(listener.updated_count(), 0);
}

#[tokio::test]
async fn test_remove_empty_batch_is_noop() {
    let mut service = MockService::new();
    service.expect_connect().never();
    service.expect_remove_geofences().never();

    let store = seeded_store(&[fence("a", "Alpha")]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller.remove_geofences(&[], &listener).await.unwrap();

    assert_eq!(controller.len().await, 1);
    assert_eq!(listener.updated_count(), 0);
    assert_eq!(listener.error_count(), 0);
}

#[tokio::test]
async fn test_remove_all_geofences_removes_current_list() {
    let mut service = MockService::new();
    expect_session(&mut service);
    service
        .expect_remove_geofences()
        .withf(|_, ids| ids.len() == 3 && ids[0] == "a" && ids[1] == "b" && ids[2] == "c")
        .times(1)
        .returning(|_, _| Ok(Status::success()));

    let store = seeded_store(&[fence("c", "Charlie"), fence("a", "Alpha"), fence("b", "Bravo")]).await;
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller.remove_all_geofences(&listener).await.unwrap();

    assert!(controller.is_empty().await);
    assert!(store.is_empty().await);
    assert_eq!(listener.updated_count(), 1);
    assert_eq!(listener.error_count(), 0);
}

#[tokio::test]
async fn test_remove_all_on_empty_registry_is_noop() {
    let mut service = MockService::new();
    service.expect_connect().never();

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller.remove_all_geofences(&listener).await.unwrap();

    assert_eq!(listener.updated_count(), 0);
    assert_eq!(listener.error_count(), 0);
}

#[tokio::test]
async fn test_disconnect_failure_does_not_fail_operation() {
    let mut service = MockService::new();
    service
        .expect_connect()
        .times(1)
        .returning(|| Ok(SessionId("s1".into())));
    service
        .expect_add_geofences()
        .times(1)
        .returning(|_, _, _| Ok(Status::success()));
    service.expect_disconnect().times(1).returning(|_| {
        Err(GeofencingError::Api {
            status: 404,
            message: "unknown session".into(),
        })
    });

    let store = store();
    let controller = create_controller(service, &store).await;
    let listener = RecordingListener::new();

    controller.add_geofence(fence("home", "Home"), &listener).await.unwrap();

    assert_eq!(controller.len().await, 1);
    assert_eq!(listener.updated_count(), 1);
}

#[tokio::test]
async fn test_named_geofences_is_a_copy() {
    let store = seeded_store(&[fence("a", "Alpha")]).await;
    let controller = create_controller(MockService::new(), &store).await;

    let mut snapshot = controller.named_geofences().await;
    snapshot.clear();

    assert_eq!(controller.len().await, 1);
    assert_eq!(controller.get("a").await.unwrap().name, "Alpha");
    assert!(controller.get("missing").await.is_none());
}
