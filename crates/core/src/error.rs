use thiserror::Error;

/// Storage engine error types.
///
/// Expected conditions (validation, not-found, conflict) are explicit
/// variants so the route layer can translate them without string matching.
/// Snapshot-flush failures and corrupt snapshot files are *not* represented
/// here: the in-memory backend logs and absorbs them (see
/// [`MemoryStore`](crate::store::MemoryStore)).
#[derive(Error, Debug)]
pub enum StoreError {
    /// A malformed or missing input field, named so callers can report it.
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    /// The referenced record does not exist — or exists outside the caller's
    /// tenant scope, which is deliberately indistinguishable.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation would violate a uniqueness rule, e.g. starting a second
    /// active session in a scope that already has one.
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// An explicitly requested snapshot flush failed. Background debounced
    /// flushes never surface this — they log a warning and retry on the
    /// next mutation.
    #[error("snapshot write failed: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

#[cfg(feature = "sqlx-postgres")]
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    DatabaseError::Constraint(db_err.to_string())
                } else {
                    DatabaseError::Query(db_err.to_string())
                }
            }
            sqlx::Error::PoolClosed => DatabaseError::Connection("pool closed".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::Connection("pool timed out".to_string()),
            _ => DatabaseError::Query(err.to_string()),
        }
    }
}

#[cfg(feature = "sqlx-postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::from(err))
    }
}

#[cfg(feature = "sqlx-postgres")]
impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Database(DatabaseError::Migration(err.to_string()))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map `validator` derive output to a [`StoreError::Validation`] naming the
/// first offending field.
pub fn first_validation_error(errors: &validator::ValidationErrors) -> StoreError {
    if let Some((field, errs)) = errors.field_errors().into_iter().next() {
        let message = errs
            .first()
            .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| format!("invalid value for {field}"));
        return StoreError::validation(field.to_string(), message);
    }
    StoreError::validation("input", "validation failed")
}
