//! # Kettle Core
//!
//! Storage and aggregation engine for field donation collection: a
//! tenant-isolated entity store with two interchangeable backends and a
//! timeframe-bounded monetary aggregation routine that gives identical
//! answers on both.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod scope;
pub mod seed;
pub mod store;
pub mod types;

pub use aggregate::{Timeframe, Totals, total, totals};
pub use config::StoreConfig;
pub use error::{DatabaseError, StoreError, StoreResult};
pub use scope::{ScopeDim, TenantScope};
pub use seed::{WorkTypeOwner, ensure_default_work_types};
pub use store::{
    CaseworkerOps, MemoryStore, OrganizationOps, RecordStore, SessionOps, TransactionOps, UserOps,
    WorkTypeOps,
};
#[cfg(feature = "sqlx-postgres")]
pub use store::{PoolConfig, PoolStats, SqlxStore};
pub use types::{
    Caseworker, CaseworkerRole, CreateCaseworker, CreateOrganization, CreateSession,
    CreateTransaction, CreateUser, CreateWorkType, Organization, OrgTier, Session, Transaction,
    TransactionKind, UpdateCaseworker, UpdateOrganization, UpdateUser, UpdateWorkType, User,
    WorkType,
};
