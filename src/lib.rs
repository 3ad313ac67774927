//! # Kettle
//!
//! Record-keeping engine for field donation collection: collection
//! sessions, an append-only transaction ledger, and a tenant hierarchy
//! (organizations, caseworkers, end users) behind one store contract with
//! two interchangeable backends.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kettle::{MemoryStore, StoreConfig, TenantScope, Timeframe};
//! use kettle::{CreateSession, CreateTransaction};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     use kettle::{SessionOps, TransactionOps};
//!
//!     // One store instance per process, injected into consumers.
//!     let store = MemoryStore::open(
//!         StoreConfig::new().snapshot_path("/var/lib/kettle/snapshot.json"),
//!     );
//!
//!     let session = store
//!         .start_session(CreateSession {
//!             user_id: Some("user-1".into()),
//!             location: "Main & 5th".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     store
//!         .record_transaction(CreateTransaction {
//!             session_id: Some(session.id.clone()),
//!             user_id: Some("user-1".into()),
//!             amount: Decimal::new(500, 2), // $5.00
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let raised = kettle::total(
//!         &store,
//!         &TenantScope::user("user-1"),
//!         Timeframe::Today,
//!     )
//!     .await?;
//!     println!("collected today: {raised}");
//!
//!     Ok(())
//! }
//! ```

pub use kettle_core::{
    Caseworker, CaseworkerOps, CaseworkerRole, CreateCaseworker, CreateOrganization, CreateSession,
    CreateTransaction, CreateUser, CreateWorkType, DatabaseError, MemoryStore, Organization,
    OrganizationOps, OrgTier, RecordStore, ScopeDim, Session, SessionOps, StoreConfig, StoreError,
    StoreResult, TenantScope, Timeframe, Totals, Transaction, TransactionKind, TransactionOps,
    UpdateCaseworker, UpdateOrganization, UpdateUser, UpdateWorkType, User, UserOps, WorkType,
    WorkTypeOps, WorkTypeOwner, ensure_default_work_types, total, totals,
};

#[cfg(feature = "sqlx-postgres")]
pub use kettle_core::{PoolConfig, PoolStats, SqlxStore};

pub mod store {
    pub use kettle_core::store::*;
}

pub mod aggregate {
    pub use kettle_core::aggregate::*;
}

pub mod seed {
    pub use kettle_core::seed::*;
}
