//! In-memory record store with debounced snapshot persistence.
//!
//! The maps are the source of truth for every read; the snapshot file is a
//! best-effort mirror read back only at cold start. Writes made within the
//! debounce window before a crash are lost — that durability trade-off is
//! deliberate. Deployments that need per-write durability use the
//! relational backend instead.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::scope::TenantScope;
use crate::store::snapshot::{self, Tables};
use crate::store::traits::{
    CaseworkerOps, OrganizationOps, SessionOps, TransactionOps, UserOps, WorkTypeOps,
};
use crate::types::{
    Caseworker, CreateCaseworker, CreateOrganization, CreateSession, CreateTransaction, CreateUser,
    CreateWorkType, Organization, Session, Transaction, UpdateCaseworker, UpdateOrganization,
    UpdateUser, UpdateWorkType, User, WorkType,
};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory backend.
///
/// Cheap to clone; all clones share the same maps and flush scheduling
/// state. Construct one instance at process start and hand clones to
/// consumers — there is no global.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    snapshot_path: Option<Arc<PathBuf>>,
    flush_debounce: Duration,
    /// Bumped on every mutation; a sleeping flush task only writes if its
    /// epoch is still current, so later writes supersede earlier timers
    /// instead of stacking flushes.
    flush_epoch: Arc<AtomicU64>,
    /// Serializes file writes so flushes never overlap.
    flush_gate: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryStore {
    /// Ephemeral store with no snapshot file.
    pub fn new() -> Self {
        Self::open(StoreConfig::ephemeral())
    }

    /// Open a store, loading the snapshot at `config.snapshot_path` when
    /// one exists. A missing file is a cold start; a corrupt file is
    /// logged and the store starts empty.
    pub fn open(config: StoreConfig) -> Self {
        let tables = match &config.snapshot_path {
            Some(path) => snapshot::load(path),
            None => Tables::default(),
        };

        Self {
            tables: Arc::new(Mutex::new(tables)),
            snapshot_path: config.snapshot_path.map(Arc::new),
            flush_debounce: config.flush_debounce,
            flush_epoch: Arc::new(AtomicU64::new(0)),
            flush_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Schedule a debounced snapshot flush. Called after every mutation.
    fn schedule_flush(&self) {
        let Some(path) = self.snapshot_path.clone() else {
            return;
        };
        let epoch = self.flush_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let tables = Arc::clone(&self.tables);
        let flush_epoch = Arc::clone(&self.flush_epoch);
        let gate = Arc::clone(&self.flush_gate);
        let debounce = self.flush_debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if flush_epoch.load(Ordering::SeqCst) != epoch {
                // A newer mutation reset the timer.
                return;
            }
            let _write = gate.lock().await;
            if flush_epoch.load(Ordering::SeqCst) != epoch {
                return;
            }

            let bytes = {
                let tables = tables.lock().unwrap();
                match tables.serialize() {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        tracing::warn!(error = %err, "snapshot serialization failed");
                        return;
                    }
                }
            };

            if let Err(err) = snapshot::persist(&path, bytes).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "snapshot flush failed; in-memory state remains authoritative"
                );
            }
        });
    }

    /// Flush the current state immediately, superseding any pending
    /// debounce timer. Used by tests and graceful shutdown.
    pub async fn flush_now(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        self.flush_epoch.fetch_add(1, Ordering::SeqCst);
        let _write = self.flush_gate.lock().await;
        let bytes = {
            let tables = self.tables.lock().unwrap();
            tables.serialize()?
        };
        snapshot::persist(path, bytes).await?;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationOps for MemoryStore {
    async fn create_organization(&self, create: CreateOrganization) -> StoreResult<Organization> {
        create.validate()?;
        let organization = Organization {
            id: new_id(),
            name: create.name,
            tier: create.tier.unwrap_or_default(),
            features: create.features.unwrap_or_default(),
            subdomain: create.subdomain,
            branding: create.branding.unwrap_or_default(),
            created_at: Utc::now(),
            is_active: true,
        };

        let mut tables = self.tables.lock().unwrap();
        tables
            .organizations
            .insert(organization.id.clone(), organization.clone());
        drop(tables);

        self.schedule_flush();
        Ok(organization)
    }

    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.organizations.get(id).cloned())
    }

    async fn get_organization_by_subdomain(
        &self,
        subdomain: &str,
    ) -> StoreResult<Option<Organization>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .organizations
            .values()
            .find(|org| org.subdomain.as_deref() == Some(subdomain))
            .cloned())
    }

    async fn update_organization(
        &self,
        id: &str,
        update: UpdateOrganization,
    ) -> StoreResult<Organization> {
        update.validate()?;
        let mut tables = self.tables.lock().unwrap();
        let org = tables
            .organizations
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("organization"))?;

        if let Some(name) = update.name {
            org.name = name;
        }
        if let Some(tier) = update.tier {
            org.tier = tier;
        }
        if let Some(features) = update.features {
            org.features = features;
        }
        if let Some(subdomain) = update.subdomain {
            org.subdomain = Some(subdomain);
        }
        if let Some(branding) = update.branding {
            org.branding = branding;
        }

        let updated = org.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn deactivate_organization(&self, id: &str) -> StoreResult<Organization> {
        let mut tables = self.tables.lock().unwrap();
        let org = tables
            .organizations
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("organization"))?;
        org.is_active = false;
        let updated = org.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn list_organizations(&self) -> StoreResult<Vec<Organization>> {
        let tables = self.tables.lock().unwrap();
        let mut orgs: Vec<Organization> = tables.organizations.values().cloned().collect();
        orgs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orgs)
    }
}

#[async_trait]
impl CaseworkerOps for MemoryStore {
    async fn create_caseworker(&self, create: CreateCaseworker) -> StoreResult<Caseworker> {
        create.validate()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.organizations.contains_key(&create.org_id) {
            return Err(StoreError::not_found("organization"));
        }

        let caseworker = Caseworker {
            id: new_id(),
            org_id: create.org_id,
            email: create.email,
            name: create.name,
            password_hash: create.password_hash,
            role: create.role.unwrap_or_default(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables
            .caseworkers
            .insert(caseworker.id.clone(), caseworker.clone());
        drop(tables);

        self.schedule_flush();
        Ok(caseworker)
    }

    async fn get_caseworker(&self, id: &str) -> StoreResult<Option<Caseworker>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.caseworkers.get(id).cloned())
    }

    async fn get_caseworker_by_email(&self, email: &str) -> StoreResult<Option<Caseworker>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .caseworkers
            .values()
            .find(|cw| cw.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update_caseworker(
        &self,
        id: &str,
        update: UpdateCaseworker,
    ) -> StoreResult<Caseworker> {
        update.validate()?;
        let mut tables = self.tables.lock().unwrap();
        let cw = tables
            .caseworkers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("caseworker"))?;

        if let Some(email) = update.email {
            cw.email = email;
        }
        if let Some(name) = update.name {
            cw.name = name;
        }
        if let Some(password_hash) = update.password_hash {
            cw.password_hash = password_hash;
        }
        if let Some(role) = update.role {
            cw.role = role;
        }

        let updated = cw.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn deactivate_caseworker(&self, id: &str) -> StoreResult<Caseworker> {
        let mut tables = self.tables.lock().unwrap();
        let cw = tables
            .caseworkers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("caseworker"))?;
        cw.is_active = false;
        let updated = cw.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn list_caseworkers(&self, org_id: &str) -> StoreResult<Vec<Caseworker>> {
        let tables = self.tables.lock().unwrap();
        let mut caseworkers: Vec<Caseworker> = tables
            .caseworkers
            .values()
            .filter(|cw| cw.org_id == org_id && cw.is_active)
            .cloned()
            .collect();
        caseworkers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(caseworkers)
    }
}

#[async_trait]
impl UserOps for MemoryStore {
    async fn create_user(&self, create: CreateUser) -> StoreResult<User> {
        create.validate()?;
        let user = User {
            id: new_id(),
            org_id: create.org_id,
            caseworker_id: create.caseworker_id,
            name: create.name,
            pin_hash: create.pin_hash,
            device_id: create.device_id,
            created_at: Utc::now(),
        };

        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(user.id.clone(), user.clone());
        drop(tables);

        self.schedule_flush();
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.get(id).cloned())
    }

    async fn get_user_by_device(&self, device_id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .values()
            .find(|user| user.device_id.as_deref() == Some(device_id))
            .cloned())
    }

    async fn update_user(&self, id: &str, update: UpdateUser) -> StoreResult<User> {
        update.validate()?;
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user"))?;

        if let Some(caseworker_id) = update.caseworker_id {
            user.caseworker_id = Some(caseworker_id);
        }
        if let Some(name) = update.name {
            user.name = Some(name);
        }
        if let Some(pin_hash) = update.pin_hash {
            user.pin_hash = Some(pin_hash);
        }
        if let Some(device_id) = update.device_id {
            user.device_id = Some(device_id);
        }

        let updated = user.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>> {
        let tables = self.tables.lock().unwrap();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| scope.matches(Some(&user.id), user.org_id.as_deref()))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl WorkTypeOps for MemoryStore {
    async fn create_work_type(&self, create: CreateWorkType) -> StoreResult<WorkType> {
        create.validate()?;
        let work_type = WorkType {
            id: new_id(),
            user_id: create.user_id,
            org_id: create.org_id,
            name: create.name,
            icon: create.icon,
            color: create.color,
            is_default: create.is_default.unwrap_or(false),
            sort_order: create.sort_order.unwrap_or(0),
            is_active: true,
            created_at: Utc::now(),
        };

        let mut tables = self.tables.lock().unwrap();
        tables
            .work_types
            .insert(work_type.id.clone(), work_type.clone());
        drop(tables);

        self.schedule_flush();
        Ok(work_type)
    }

    async fn get_work_type(&self, id: &str) -> StoreResult<Option<WorkType>> {
        // No is_active filter: soft-deleted rows stay retrievable by id.
        let tables = self.tables.lock().unwrap();
        Ok(tables.work_types.get(id).cloned())
    }

    async fn update_work_type(&self, id: &str, update: UpdateWorkType) -> StoreResult<WorkType> {
        update.validate()?;
        let mut tables = self.tables.lock().unwrap();
        let work_type = tables
            .work_types
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("work type"))?;

        if let Some(name) = update.name {
            work_type.name = name;
        }
        if let Some(icon) = update.icon {
            work_type.icon = Some(icon);
        }
        if let Some(color) = update.color {
            work_type.color = Some(color);
        }
        if let Some(is_default) = update.is_default {
            work_type.is_default = is_default;
        }
        if let Some(sort_order) = update.sort_order {
            work_type.sort_order = sort_order;
        }

        let updated = work_type.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn delete_work_type(&self, id: &str) -> StoreResult<WorkType> {
        let mut tables = self.tables.lock().unwrap();
        let work_type = tables
            .work_types
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("work type"))?;
        work_type.is_active = false;
        let updated = work_type.clone();
        drop(tables);

        self.schedule_flush();
        Ok(updated)
    }

    async fn list_work_types(&self, scope: &TenantScope) -> StoreResult<Vec<WorkType>> {
        let tables = self.tables.lock().unwrap();
        let mut work_types: Vec<WorkType> = tables
            .work_types
            .values()
            .filter(|wt| wt.is_active && scope.matches(wt.user_id.as_deref(), wt.org_id.as_deref()))
            .cloned()
            .collect();
        work_types.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(work_types)
    }
}

#[async_trait]
impl SessionOps for MemoryStore {
    async fn start_session(&self, create: CreateSession) -> StoreResult<Session> {
        create.validate()?;
        let mut tables = self.tables.lock().unwrap();

        // Check and insert under one lock: the single-active-session
        // invariant is enforced here, not by caller sequencing.
        let scope = TenantScope::exact(create.user_id.clone(), create.org_id.clone());
        let already_active = tables
            .sessions
            .values()
            .any(|s| s.is_active && scope.matches(s.user_id.as_deref(), s.org_id.as_deref()));
        if already_active {
            return Err(StoreError::conflict(
                "an active session already exists for this scope",
            ));
        }

        let session = Session {
            id: new_id(),
            user_id: create.user_id,
            org_id: create.org_id,
            work_type_id: create.work_type_id,
            location: create.location,
            start_time: Utc::now(),
            end_time: None,
            is_test: create.is_test.unwrap_or(false),
            is_active: true,
        };
        tables.sessions.insert(session.id.clone(), session.clone());
        drop(tables);

        self.schedule_flush();
        Ok(session)
    }

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.sessions.get(id).cloned())
    }

    async fn find_active_session(&self, scope: &TenantScope) -> StoreResult<Option<Session>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .sessions
            .values()
            .filter(|s| s.is_active && scope.matches(s.user_id.as_deref(), s.org_id.as_deref()))
            .max_by(|a, b| a.start_time.cmp(&b.start_time).then(b.id.cmp(&a.id)))
            .cloned())
    }

    async fn close_session(&self, id: &str) -> StoreResult<Session> {
        let mut tables = self.tables.lock().unwrap();
        let session = tables
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("session"))?;
        if !session.is_active {
            return Err(StoreError::conflict("session is already closed"));
        }
        session.end_time = Some(Utc::now());
        session.is_active = false;
        let closed = session.clone();
        drop(tables);

        self.schedule_flush();
        Ok(closed)
    }

    async fn list_sessions(&self, scope: &TenantScope) -> StoreResult<Vec<Session>> {
        let tables = self.tables.lock().unwrap();
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| scope.matches(s.user_id.as_deref(), s.org_id.as_deref()))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn delete_session(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if tables.sessions.remove(id).is_none() {
            return Err(StoreError::not_found("session"));
        }
        tables
            .transactions
            .retain(|_, txn| txn.session_id.as_deref() != Some(id));
        drop(tables);

        self.schedule_flush();
        Ok(())
    }
}

#[async_trait]
impl TransactionOps for MemoryStore {
    async fn record_transaction(&self, create: CreateTransaction) -> StoreResult<Transaction> {
        create.validate()?;
        let amount = create.normalized_amount()?;

        let mut tables = self.tables.lock().unwrap();
        let work_type_id = match (&create.session_id, create.work_type_id) {
            (Some(session_id), None) => {
                let session = tables
                    .sessions
                    .get(session_id)
                    .ok_or_else(|| StoreError::not_found("session"))?;
                session.work_type_id.clone()
            }
            (Some(session_id), explicit) => {
                if !tables.sessions.contains_key(session_id) {
                    return Err(StoreError::not_found("session"));
                }
                explicit
            }
            (None, explicit) => explicit,
        };

        let transaction = Transaction {
            id: new_id(),
            session_id: create.session_id,
            user_id: create.user_id,
            org_id: create.org_id,
            work_type_id,
            amount,
            kind: create.kind.unwrap_or_default(),
            note: create.note,
            product_id: create.product_id,
            pennies: create.pennies.unwrap_or(0),
            timestamp: Utc::now(),
        };
        tables
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        drop(tables);

        self.schedule_flush();
        Ok(transaction)
    }

    async fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.transactions.get(id).cloned())
    }

    async fn list_transactions(&self, scope: &TenantScope) -> StoreResult<Vec<Transaction>> {
        let tables = self.tables.lock().unwrap();
        let mut transactions: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|txn| scope.matches(txn.user_id.as_deref(), txn.org_id.as_deref()))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
        Ok(transactions)
    }

    async fn list_session_transactions(&self, session_id: &str) -> StoreResult<Vec<Transaction>> {
        let tables = self.tables.lock().unwrap();
        let mut transactions: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|txn| txn.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(transactions)
    }
}
