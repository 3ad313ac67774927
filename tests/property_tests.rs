//! Store-contract suite.
//!
//! Every property is written once, generically over the [`RecordStore`]
//! contract, and executed against the in-memory backend. The identical
//! functions run against the Postgres backend when built with
//! `--features sqlx-postgres` and pointed at a disposable database:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/kettle_test \
//!     cargo test --features sqlx-postgres -- --ignored
//! ```

mod common;

use common::{dollars, unique};
use kettle::{
    CreateCaseworker, CreateOrganization, CreateSession, CreateTransaction, CreateUser,
    CreateWorkType, MemoryStore, RecordStore, StoreError, TenantScope, Timeframe, UpdateWorkType,
    total,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Generic properties
// ---------------------------------------------------------------------------

async fn tenant_isolation<S: RecordStore>(store: &S) {
    let org_a = store
        .create_organization(CreateOrganization {
            name: unique("Org A"),
            ..Default::default()
        })
        .await
        .unwrap();
    let org_b = store
        .create_organization(CreateOrganization {
            name: unique("Org B"),
            ..Default::default()
        })
        .await
        .unwrap();

    let session_a = store
        .start_session(CreateSession {
            org_id: Some(org_a.id.clone()),
            location: "North Gate".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let session_b = store
        .start_session(CreateSession {
            org_id: Some(org_b.id.clone()),
            location: "South Gate".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let seen_by_a = store.list_sessions(&TenantScope::org(&org_a.id)).await.unwrap();
    assert_eq!(seen_by_a.len(), 1);
    assert_eq!(seen_by_a[0].id, session_a.id);

    let seen_by_b = store.list_sessions(&TenantScope::org(&org_b.id)).await.unwrap();
    assert_eq!(seen_by_b.len(), 1);
    assert_eq!(seen_by_b[0].id, session_b.id);
}

async fn single_active_session<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let scope = TenantScope::exact(Some(user_id.clone()), None);

    let first = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Corner".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(first.is_active);
    assert!(first.end_time.is_none());

    // Second create in the same scope is rejected atomically by the store.
    let second = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Other Corner".into(),
            ..Default::default()
        })
        .await;
    assert!(matches!(second, Err(StoreError::Conflict(_))));

    let active = store.find_active_session(&scope).await.unwrap().unwrap();
    assert_eq!(active.id, first.id);

    // Closing frees the scope; closed is terminal.
    let closed = store.close_session(&first.id).await.unwrap();
    assert!(!closed.is_active);
    assert!(closed.end_time.is_some());
    assert!(matches!(
        store.close_session(&first.id).await,
        Err(StoreError::Conflict(_))
    ));
    assert!(store.find_active_session(&scope).await.unwrap().is_none());

    let replacement = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Corner".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_ne!(replacement.id, first.id);
}

async fn work_type_soft_delete<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let scope = TenantScope::user(&user_id);

    let work_type = store
        .create_work_type(CreateWorkType {
            user_id: Some(user_id.clone()),
            name: "Street Corner".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let deleted = store.delete_work_type(&work_type.id).await.unwrap();
    assert!(!deleted.is_active);

    // Gone from listings, still retrievable by id.
    let listed = store.list_work_types(&scope).await.unwrap();
    assert!(listed.iter().all(|wt| wt.id != work_type.id));

    let fetched = store.get_work_type(&work_type.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, work_type.id);
    assert!(!fetched.is_active);
}

async fn work_type_ordering<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let scope = TenantScope::user(&user_id);

    for sort_order in [2, 0, 1] {
        store
            .create_work_type(CreateWorkType {
                user_id: Some(user_id.clone()),
                name: format!("wt-{sort_order}"),
                sort_order: Some(sort_order),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let listed = store.list_work_types(&scope).await.unwrap();
    let orders: Vec<i32> = listed.iter().map(|wt| wt.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

async fn aggregation_excludes_test_sessions<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let scope = TenantScope::exact(Some(user_id.clone()), None);

    let test_session = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Rehearsal".into(),
            is_test: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .record_transaction(CreateTransaction {
            session_id: Some(test_session.id.clone()),
            user_id: Some(user_id.clone()),
            amount: dollars(500),
            ..Default::default()
        })
        .await
        .unwrap();
    store.close_session(&test_session.id).await.unwrap();

    let real_session = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Market".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .record_transaction(CreateTransaction {
            session_id: Some(real_session.id.clone()),
            user_id: Some(user_id.clone()),
            amount: dollars(300),
            ..Default::default()
        })
        .await
        .unwrap();

    let sum = total(store, &scope, Timeframe::AllTime).await.unwrap();
    assert_eq!(sum, dollars(300));
}

async fn aggregation_includes_quick_transactions<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let scope = TenantScope::exact(Some(user_id.clone()), None);

    store
        .record_transaction(CreateTransaction {
            user_id: Some(user_id.clone()),
            amount: dollars(200),
            ..Default::default()
        })
        .await
        .unwrap();

    let sum = total(store, &scope, Timeframe::AllTime).await.unwrap();
    assert_eq!(sum, dollars(200));
}

/// The end-to-end scenario: org, user, one session, two transactions.
async fn org_scenario<S: RecordStore>(store: &S) {
    let org1 = store
        .create_organization(CreateOrganization {
            name: unique("Org1"),
            ..Default::default()
        })
        .await
        .unwrap();
    let u1 = store
        .create_user(CreateUser {
            org_id: Some(org1.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    let s1 = store
        .start_session(CreateSession {
            user_id: Some(u1.id.clone()),
            org_id: Some(org1.id.clone()),
            location: "Corner".into(),
            is_test: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    for cents in [500, 1000] {
        store
            .record_transaction(CreateTransaction {
                session_id: Some(s1.id.clone()),
                user_id: Some(u1.id.clone()),
                org_id: Some(org1.id.clone()),
                amount: dollars(cents),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let org_total = total(store, &TenantScope::org(&org1.id), Timeframe::AllTime)
        .await
        .unwrap();
    assert_eq!(org_total, dollars(1500));

    // U1's records all belong to Org1, so the free-tier scope sees nothing.
    let free_tier = TenantScope::free_tier_org().with_user(&u1.id);
    let leaked = total(store, &free_tier, Timeframe::AllTime).await.unwrap();
    assert_eq!(leaked, Decimal::ZERO);
}

async fn transaction_inherits_session_work_type<S: RecordStore>(store: &S) {
    let user_id = unique("user");

    let work_type = store
        .create_work_type(CreateWorkType {
            user_id: Some(user_id.clone()),
            name: "Events".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let session = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            work_type_id: Some(work_type.id.clone()),
            location: "Fairgrounds".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let transaction = store
        .record_transaction(CreateTransaction {
            session_id: Some(session.id.clone()),
            user_id: Some(user_id.clone()),
            amount: dollars(125),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(transaction.work_type_id, Some(work_type.id.clone()));

    let listed = store
        .list_session_transactions(&session.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, transaction.id);
}

async fn transaction_under_unknown_session_is_not_found<S: RecordStore>(store: &S) {
    let result = store
        .record_transaction(CreateTransaction {
            session_id: Some(unique("missing-session")),
            amount: dollars(100),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

async fn validation_and_not_found_surface_explicitly<S: RecordStore>(store: &S) {
    // Missing required field.
    let empty_location = store
        .start_session(CreateSession {
            user_id: Some(unique("user")),
            location: String::new(),
            ..Default::default()
        })
        .await;
    assert!(matches!(
        empty_location,
        Err(StoreError::Validation { ref field, .. }) if field == "location"
    ));

    // Malformed amount.
    let sub_cent = store
        .record_transaction(CreateTransaction {
            amount: Decimal::new(1234, 3), // 1.234
            ..Default::default()
        })
        .await;
    assert!(matches!(
        sub_cent,
        Err(StoreError::Validation { ref field, .. }) if field == "amount"
    ));

    // Unknown id.
    let missing = store
        .update_work_type(&unique("missing"), UpdateWorkType::default())
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    // Caseworkers require an existing organization.
    let orphan = store
        .create_caseworker(CreateCaseworker {
            org_id: unique("missing-org"),
            email: format!("{}@example.com", unique("cw")),
            name: "Orphan".into(),
            password_hash: "hash".into(),
            role: None,
        })
        .await;
    assert!(matches!(orphan, Err(StoreError::NotFound(_))));
}

async fn hard_session_delete_cascades_transactions<S: RecordStore>(store: &S) {
    let user_id = unique("user");
    let session = store
        .start_session(CreateSession {
            user_id: Some(user_id.clone()),
            location: "Pier".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let transaction = store
        .record_transaction(CreateTransaction {
            session_id: Some(session.id.clone()),
            user_id: Some(user_id.clone()),
            amount: dollars(700),
            ..Default::default()
        })
        .await
        .unwrap();

    store.delete_session(&session.id).await.unwrap();
    assert!(store.get_session(&session.id).await.unwrap().is_none());
    assert!(
        store
            .get_transaction(&transaction.id)
            .await
            .unwrap()
            .is_none()
    );
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[tokio::test]
async fn memory_tenant_isolation() {
    tenant_isolation(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_single_active_session() {
    single_active_session(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_work_type_soft_delete() {
    work_type_soft_delete(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_work_type_ordering() {
    work_type_ordering(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_aggregation_excludes_test_sessions() {
    aggregation_excludes_test_sessions(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_aggregation_includes_quick_transactions() {
    aggregation_includes_quick_transactions(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_org_scenario() {
    org_scenario(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_transaction_inherits_session_work_type() {
    transaction_inherits_session_work_type(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_transaction_under_unknown_session_is_not_found() {
    transaction_under_unknown_session_is_not_found(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_validation_and_not_found_surface_explicitly() {
    validation_and_not_found_surface_explicitly(&MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_hard_session_delete_cascades_transactions() {
    hard_session_delete_cascades_transactions(&MemoryStore::new()).await;
}

// ---------------------------------------------------------------------------
// Postgres backend — identical suite, run explicitly against a disposable
// database named by DATABASE_URL.
// ---------------------------------------------------------------------------

#[cfg(feature = "sqlx-postgres")]
mod postgres {
    use super::*;
    use kettle::SqlxStore;

    async fn connect() -> SqlxStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = SqlxStore::connect(&url).await.expect("connect");
        store.migrate().await.expect("migrate");
        store
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_tenant_isolation() {
        tenant_isolation(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_single_active_session() {
        single_active_session(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_work_type_soft_delete() {
        work_type_soft_delete(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_work_type_ordering() {
        work_type_ordering(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_aggregation_excludes_test_sessions() {
        aggregation_excludes_test_sessions(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_aggregation_includes_quick_transactions() {
        aggregation_includes_quick_transactions(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_org_scenario() {
        org_scenario(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_transaction_inherits_session_work_type() {
        transaction_inherits_session_work_type(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_transaction_under_unknown_session_is_not_found() {
        transaction_under_unknown_session_is_not_found(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_validation_and_not_found_surface_explicitly() {
        validation_and_not_found_surface_explicitly(&connect().await).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_hard_session_delete_cascades_transactions() {
        hard_session_delete_cascades_transactions(&connect().await).await;
    }
}
