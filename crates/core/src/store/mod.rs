pub mod memory;
mod snapshot;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{
    CaseworkerOps, OrganizationOps, RecordStore, SessionOps, TransactionOps, UserOps, WorkTypeOps,
};

#[cfg(feature = "sqlx-postgres")]
pub mod database;

#[cfg(feature = "sqlx-postgres")]
pub use database::{PoolConfig, PoolStats, SqlxStore};
