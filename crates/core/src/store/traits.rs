use async_trait::async_trait;

use crate::error::StoreResult;
use crate::scope::TenantScope;
use crate::types::{
    Caseworker, CreateCaseworker, CreateOrganization, CreateSession, CreateTransaction, CreateUser,
    CreateWorkType, Organization, Session, Transaction, UpdateCaseworker, UpdateOrganization,
    UpdateUser, UpdateWorkType, User, WorkType,
};

/// Organization persistence operations.
#[async_trait]
pub trait OrganizationOps: Send + Sync + 'static {
    async fn create_organization(&self, create: CreateOrganization) -> StoreResult<Organization>;
    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>>;
    async fn get_organization_by_subdomain(
        &self,
        subdomain: &str,
    ) -> StoreResult<Option<Organization>>;
    async fn update_organization(
        &self,
        id: &str,
        update: UpdateOrganization,
    ) -> StoreResult<Organization>;
    /// Soft-deactivate. Organizations are never hard-deleted.
    async fn deactivate_organization(&self, id: &str) -> StoreResult<Organization>;
    async fn list_organizations(&self) -> StoreResult<Vec<Organization>>;
}

/// Caseworker persistence operations.
#[async_trait]
pub trait CaseworkerOps: Send + Sync + 'static {
    async fn create_caseworker(&self, create: CreateCaseworker) -> StoreResult<Caseworker>;
    async fn get_caseworker(&self, id: &str) -> StoreResult<Option<Caseworker>>;
    async fn get_caseworker_by_email(&self, email: &str) -> StoreResult<Option<Caseworker>>;
    async fn update_caseworker(
        &self,
        id: &str,
        update: UpdateCaseworker,
    ) -> StoreResult<Caseworker>;
    async fn deactivate_caseworker(&self, id: &str) -> StoreResult<Caseworker>;
    /// Active caseworkers of one organization, newest first.
    async fn list_caseworkers(&self, org_id: &str) -> StoreResult<Vec<Caseworker>>;
}

/// User persistence operations.
#[async_trait]
pub trait UserOps: Send + Sync + 'static {
    async fn create_user(&self, create: CreateUser) -> StoreResult<User>;
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;
    /// Free-tier device lookup.
    async fn get_user_by_device(&self, device_id: &str) -> StoreResult<Option<User>>;
    async fn update_user(&self, id: &str, update: UpdateUser) -> StoreResult<User>;
    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>>;
}

/// Work type persistence operations.
///
/// Work types are soft-deleted: `delete_work_type` flips `is_active` off,
/// listings exclude inactive rows, `get_work_type` does not.
#[async_trait]
pub trait WorkTypeOps: Send + Sync + 'static {
    async fn create_work_type(&self, create: CreateWorkType) -> StoreResult<WorkType>;
    async fn get_work_type(&self, id: &str) -> StoreResult<Option<WorkType>>;
    async fn update_work_type(&self, id: &str, update: UpdateWorkType) -> StoreResult<WorkType>;
    async fn delete_work_type(&self, id: &str) -> StoreResult<WorkType>;
    /// Active work types in scope, ordered by `sort_order` ascending, ties
    /// by creation order.
    async fn list_work_types(&self, scope: &TenantScope) -> StoreResult<Vec<WorkType>>;
}

/// Session persistence operations.
#[async_trait]
pub trait SessionOps: Send + Sync + 'static {
    /// Create a session, atomically rejecting with a conflict when an
    /// active session already exists in the exact (userId, orgId) scope.
    /// The check and the insert are one store-level operation; callers do
    /// not sequence a finder call before this.
    async fn start_session(&self, create: CreateSession) -> StoreResult<Session>;
    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>>;
    /// Most recently started session with `is_active = true` in scope.
    async fn find_active_session(&self, scope: &TenantScope) -> StoreResult<Option<Session>>;
    /// Close the session: sets `end_time`, clears `is_active`. Closed is
    /// terminal — closing twice is a conflict.
    async fn close_session(&self, id: &str) -> StoreResult<Session>;
    /// Sessions in scope, most recently started first.
    async fn list_sessions(&self, scope: &TenantScope) -> StoreResult<Vec<Session>>;
    /// Hard delete (rare; soft-close is the norm). The session's
    /// transactions cascade away with it.
    async fn delete_session(&self, id: &str) -> StoreResult<()>;
}

/// Transaction persistence operations. Transactions are append-only: there
/// is no update and no single-row delete.
#[async_trait]
pub trait TransactionOps: Send + Sync + 'static {
    /// Record a monetary event. When `session_id` is given the session must
    /// exist, and its work type is inherited unless the create supplies one.
    async fn record_transaction(&self, create: CreateTransaction) -> StoreResult<Transaction>;
    async fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>>;
    /// Transactions in scope, newest first.
    async fn list_transactions(&self, scope: &TenantScope) -> StoreResult<Vec<Transaction>>;
    async fn list_session_transactions(&self, session_id: &str) -> StoreResult<Vec<Transaction>>;
}

/// The full record-store contract.
///
/// Combines all entity-specific operation traits. Any type implementing
/// every sub-trait implements `RecordStore` via the blanket impl; consumers
/// that only touch a subset (the aggregation engine, the seeding utility)
/// bound on the sub-traits directly.
pub trait RecordStore:
    OrganizationOps + CaseworkerOps + UserOps + WorkTypeOps + SessionOps + TransactionOps
{
}

impl<T> RecordStore for T where
    T: OrganizationOps + CaseworkerOps + UserOps + WorkTypeOps + SessionOps + TransactionOps
{
}
