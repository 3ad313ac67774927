//! Snapshot persistence suite for the in-memory backend: round-trip
//! fidelity, debounce coalescing, cold starts, and flush-failure
//! resilience.

mod common;

use std::time::Duration;

use common::{dollars, unique};
use kettle::{
    CreateOrganization, CreateSession, CreateTransaction, CreateUser, CreateWorkType, MemoryStore,
    OrganizationOps, RecordStore, SessionOps, StoreConfig, StoreError, TenantScope,
    TransactionOps, UserOps, WorkTypeOps,
};

async fn populate<S: RecordStore>(store: &S) -> String {
    let org = store
        .create_organization(CreateOrganization {
            name: unique("Relief Works"),
            subdomain: Some(unique("relief")),
            ..Default::default()
        })
        .await
        .unwrap();
    let user = store
        .create_user(CreateUser {
            org_id: Some(org.id.clone()),
            device_id: Some(unique("device")),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .create_work_type(CreateWorkType {
            org_id: Some(org.id.clone()),
            name: "Events".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let session = store
        .start_session(CreateSession {
            user_id: Some(user.id.clone()),
            org_id: Some(org.id.clone()),
            location: "Harbor".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .record_transaction(CreateTransaction {
            session_id: Some(session.id.clone()),
            user_id: Some(user.id.clone()),
            org_id: Some(org.id.clone()),
            amount: dollars(1250),
            pennies: Some(37),
            ..Default::default()
        })
        .await
        .unwrap();
    org.id
}

#[tokio::test]
async fn round_trip_reproduces_all_entities() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let config = StoreConfig::new().snapshot_path(&path);

    let store = MemoryStore::open(config.clone());
    let org_id = populate(&store).await;
    store.flush_now().await.unwrap();

    let reopened = MemoryStore::open(config);
    let scope = TenantScope::org(&org_id);

    // Field-for-field equality, timestamps included.
    assert_eq!(
        store.list_organizations().await.unwrap(),
        reopened.list_organizations().await.unwrap()
    );
    assert_eq!(
        store.list_users(&scope).await.unwrap(),
        reopened.list_users(&scope).await.unwrap()
    );
    assert_eq!(
        store.list_work_types(&scope).await.unwrap(),
        reopened.list_work_types(&scope).await.unwrap()
    );
    assert_eq!(
        store.list_sessions(&scope).await.unwrap(),
        reopened.list_sessions(&scope).await.unwrap()
    );
    assert_eq!(
        store.list_transactions(&scope).await.unwrap(),
        reopened.list_transactions(&scope).await.unwrap()
    );
    assert_eq!(reopened.list_transactions(&scope).await.unwrap().len(), 1);
}

#[tokio::test]
async fn writes_are_visible_before_any_flush() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    // Debounce far beyond the test's lifetime: nothing hits disk.
    let store = MemoryStore::open(
        StoreConfig::new()
            .snapshot_path(&path)
            .flush_debounce(Duration::from_secs(600)),
    );

    let org_id = populate(&store).await;
    assert!(!path.exists());

    // Reads come from the maps, not the (absent) snapshot.
    let fetched = store.get_organization(&org_id).await.unwrap();
    assert!(fetched.is_some());
}

#[tokio::test]
async fn debounced_flush_fires_after_quiet_period() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let config = StoreConfig::new()
        .snapshot_path(&path)
        .flush_debounce(Duration::from_millis(50));

    let store = MemoryStore::open(config.clone());
    // A burst of writes coalesces into one flush after the window.
    for sort_order in 0..3 {
        store
            .create_work_type(CreateWorkType {
                user_id: Some("u1".into()),
                name: format!("wt-{sort_order}"),
                sort_order: Some(sort_order),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(800)).await;
    assert!(path.exists());

    let reopened = MemoryStore::open(config);
    let listed = reopened
        .list_work_types(&TenantScope::user("u1"))
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn corrupt_snapshot_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, b"{\"organizations\": not json").unwrap();

    let config = StoreConfig::new().snapshot_path(&path);
    let store = MemoryStore::open(config.clone());
    assert!(store.list_organizations().await.unwrap().is_empty());

    // The store is fully usable afterwards, and the next flush replaces
    // the corrupt file.
    let org_id = populate(&store).await;
    store.flush_now().await.unwrap();

    let reopened = MemoryStore::open(config);
    assert!(
        reopened
            .get_organization(&org_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn missing_snapshot_is_a_cold_start() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(StoreConfig::new().snapshot_path(dir.path().join("absent.json")));
    assert!(store.list_organizations().await.unwrap().is_empty());
}

#[tokio::test]
async fn flush_failure_leaves_memory_authoritative() {
    let dir = tempfile::tempdir().unwrap();
    // Parent of the snapshot path is a regular file, so every write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = MemoryStore::open(
        StoreConfig::new().snapshot_path(blocker.join("snapshot.json")),
    );

    let org_id = populate(&store).await;
    assert!(matches!(
        store.flush_now().await,
        Err(StoreError::Snapshot(_))
    ));

    // Live state is untouched by the failed flush.
    assert!(store.get_organization(&org_id).await.unwrap().is_some());
}
