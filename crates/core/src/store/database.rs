//! PostgreSQL record store via SQLx.
//!
//! Every call maps to one indexed query (two where a referenced session
//! must be resolved first); all mutations are durable on return. Scope
//! filtering goes through the same [`ScopeDim`] resolution the in-memory
//! backend uses — the free-tier sentinel becomes `IS NULL`, never an
//! absent predicate.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::scope::{ScopeDim, TenantScope};
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

/// Append `AND <column> …` for one scope dimension.
fn push_dim(query: &mut QueryBuilder<'_, Postgres>, column: &str, dim: &ScopeDim) {
    match dim {
        ScopeDim::Any => {}
        ScopeDim::Is(Some(value)) => {
            query.push(format!(" AND {column} = "));
            query.push_bind(value.clone());
        }
        ScopeDim::Is(None) => {
            query.push(format!(" AND {column} IS NULL"));
        }
    }
}

/// Append the tenant predicate over the standard `user_id`/`org_id` pair.
fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: &TenantScope) {
    push_dim(query, "user_id", &scope.user);
    push_dim(query, "org_id", &scope.org);
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: std::time::Duration,
    pub idle_timeout: Option<std::time::Duration>,
    pub max_lifetime: Option<std::time::Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: std::time::Duration::from_secs(30),
            idle_timeout: Some(std::time::Duration::from_secs(600)),
            max_lifetime: Some(std::time::Duration::from_secs(1800)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// Durable relational backend.
#[derive(Clone)]
pub struct SqlxStore {
    pool: PgPool,
}

impl SqlxStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn with_config(database_url: &str, config: PoolConfig) -> Result<Self, sqlx::Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the shipped schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn test_connection(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl OrganizationOps for SqlxStore {
    async fn create_organization(&self, create: CreateOrganization) -> StoreResult<Organization> {
        create.validate()?;
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (id, name, tier, features, subdomain, branding, created_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.name)
        .bind(create.tier.unwrap_or_default().as_str())
        .bind(sqlx::types::Json(create.features.unwrap_or_default()))
        .bind(&create.subdomain)
        .bind(sqlx::types::Json(create.branding.unwrap_or_default()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(organization)
    }

    async fn get_organization(&self, id: &str) -> StoreResult<Option<Organization>> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(organization)
    }

    async fn get_organization_by_subdomain(
        &self,
        subdomain: &str,
    ) -> StoreResult<Option<Organization>> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE subdomain = $1")
                .bind(subdomain)
                .fetch_optional(&self.pool)
                .await?;
        Ok(organization)
    }

    async fn update_organization(
        &self,
        id: &str,
        update: UpdateOrganization,
    ) -> StoreResult<Organization> {
        update.validate()?;

        let mut query = QueryBuilder::new("UPDATE organizations SET ");
        let mut fields = query.separated(", ");
        let mut has_updates = false;

        if let Some(name) = &update.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
            has_updates = true;
        }
        if let Some(tier) = update.tier {
            fields.push("tier = ").push_bind_unseparated(tier.as_str());
            has_updates = true;
        }
        if let Some(features) = update.features {
            fields
                .push("features = ")
                .push_bind_unseparated(sqlx::types::Json(features));
            has_updates = true;
        }
        if let Some(subdomain) = &update.subdomain {
            fields
                .push("subdomain = ")
                .push_bind_unseparated(subdomain.clone());
            has_updates = true;
        }
        if let Some(branding) = update.branding {
            fields
                .push("branding = ")
                .push_bind_unseparated(sqlx::types::Json(branding));
            has_updates = true;
        }

        if !has_updates {
            return self
                .get_organization(id)
                .await?
                .ok_or_else(|| StoreError::not_found("organization"));
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query
            .build_query_as::<Organization>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("organization"))
    }

    async fn deactivate_organization(&self, id: &str) -> StoreResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET is_active = FALSE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("organization"))
    }

    async fn list_organizations(&self) -> StoreResult<Vec<Organization>> {
        let organizations = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(organizations)
    }
}

#[async_trait]
impl CaseworkerOps for SqlxStore {
    async fn create_caseworker(&self, create: CreateCaseworker) -> StoreResult<Caseworker> {
        create.validate()?;
        if self.get_organization(&create.org_id).await?.is_none() {
            return Err(StoreError::not_found("organization"));
        }

        let caseworker = sqlx::query_as::<_, Caseworker>(
            r#"
            INSERT INTO caseworkers (id, org_id, email, name, password_hash, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.org_id)
        .bind(&create.email)
        .bind(&create.name)
        .bind(&create.password_hash)
        .bind(create.role.unwrap_or_default().as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(caseworker)
    }

    async fn get_caseworker(&self, id: &str) -> StoreResult<Option<Caseworker>> {
        let caseworker =
            sqlx::query_as::<_, Caseworker>("SELECT * FROM caseworkers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(caseworker)
    }

    async fn get_caseworker_by_email(&self, email: &str) -> StoreResult<Option<Caseworker>> {
        let caseworker = sqlx::query_as::<_, Caseworker>(
            "SELECT * FROM caseworkers WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(caseworker)
    }

    async fn update_caseworker(
        &self,
        id: &str,
        update: UpdateCaseworker,
    ) -> StoreResult<Caseworker> {
        update.validate()?;

        let mut query = QueryBuilder::new("UPDATE caseworkers SET ");
        let mut fields = query.separated(", ");
        let mut has_updates = false;

        if let Some(email) = &update.email {
            fields.push("email = ").push_bind_unseparated(email.clone());
            has_updates = true;
        }
        if let Some(name) = &update.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
            has_updates = true;
        }
        if let Some(password_hash) = &update.password_hash {
            fields
                .push("password_hash = ")
                .push_bind_unseparated(password_hash.clone());
            has_updates = true;
        }
        if let Some(role) = update.role {
            fields.push("role = ").push_bind_unseparated(role.as_str());
            has_updates = true;
        }

        if !has_updates {
            return self
                .get_caseworker(id)
                .await?
                .ok_or_else(|| StoreError::not_found("caseworker"));
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query
            .build_query_as::<Caseworker>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("caseworker"))
    }

    async fn deactivate_caseworker(&self, id: &str) -> StoreResult<Caseworker> {
        sqlx::query_as::<_, Caseworker>(
            "UPDATE caseworkers SET is_active = FALSE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("caseworker"))
    }

    async fn list_caseworkers(&self, org_id: &str) -> StoreResult<Vec<Caseworker>> {
        let caseworkers = sqlx::query_as::<_, Caseworker>(
            "SELECT * FROM caseworkers WHERE org_id = $1 AND is_active ORDER BY created_at DESC, id ASC",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(caseworkers)
    }
}

#[async_trait]
impl UserOps for SqlxStore {
    async fn create_user(&self, create: CreateUser) -> StoreResult<User> {
        create.validate()?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, org_id, caseworker_id, name, pin_hash, device_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.org_id)
        .bind(&create.caseworker_id)
        .bind(&create.name)
        .bind(&create.pin_hash)
        .bind(&create.device_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_device(&self, device_id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE device_id = $1")
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: &str, update: UpdateUser) -> StoreResult<User> {
        update.validate()?;

        let mut query = QueryBuilder::new("UPDATE users SET ");
        let mut fields = query.separated(", ");
        let mut has_updates = false;

        if let Some(caseworker_id) = &update.caseworker_id {
            fields
                .push("caseworker_id = ")
                .push_bind_unseparated(caseworker_id.clone());
            has_updates = true;
        }
        if let Some(name) = &update.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
            has_updates = true;
        }
        if let Some(pin_hash) = &update.pin_hash {
            fields
                .push("pin_hash = ")
                .push_bind_unseparated(pin_hash.clone());
            has_updates = true;
        }
        if let Some(device_id) = &update.device_id {
            fields
                .push("device_id = ")
                .push_bind_unseparated(device_id.clone());
            has_updates = true;
        }

        if !has_updates {
            return self
                .get_user(id)
                .await?
                .ok_or_else(|| StoreError::not_found("user"));
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user"))
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<User>> {
        let mut query = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        // A user's own id is its user dimension.
        push_dim(&mut query, "id", &scope.user);
        push_dim(&mut query, "org_id", &scope.org);
        query.push(" ORDER BY created_at DESC, id ASC");

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}

#[async_trait]
impl WorkTypeOps for SqlxStore {
    async fn create_work_type(&self, create: CreateWorkType) -> StoreResult<WorkType> {
        create.validate()?;
        let work_type = sqlx::query_as::<_, WorkType>(
            r#"
            INSERT INTO work_types (id, user_id, org_id, name, icon, color, is_default, sort_order, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.user_id)
        .bind(&create.org_id)
        .bind(&create.name)
        .bind(&create.icon)
        .bind(&create.color)
        .bind(create.is_default.unwrap_or(false))
        .bind(create.sort_order.unwrap_or(0))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(work_type)
    }

    async fn get_work_type(&self, id: &str) -> StoreResult<Option<WorkType>> {
        // No is_active filter: soft-deleted rows stay retrievable by id.
        let work_type = sqlx::query_as::<_, WorkType>("SELECT * FROM work_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(work_type)
    }

    async fn update_work_type(&self, id: &str, update: UpdateWorkType) -> StoreResult<WorkType> {
        update.validate()?;

        let mut query = QueryBuilder::new("UPDATE work_types SET ");
        let mut fields = query.separated(", ");
        let mut has_updates = false;

        if let Some(name) = &update.name {
            fields.push("name = ").push_bind_unseparated(name.clone());
            has_updates = true;
        }
        if let Some(icon) = &update.icon {
            fields.push("icon = ").push_bind_unseparated(icon.clone());
            has_updates = true;
        }
        if let Some(color) = &update.color {
            fields.push("color = ").push_bind_unseparated(color.clone());
            has_updates = true;
        }
        if let Some(is_default) = update.is_default {
            fields
                .push("is_default = ")
                .push_bind_unseparated(is_default);
            has_updates = true;
        }
        if let Some(sort_order) = update.sort_order {
            fields
                .push("sort_order = ")
                .push_bind_unseparated(sort_order);
            has_updates = true;
        }

        if !has_updates {
            return self
                .get_work_type(id)
                .await?
                .ok_or_else(|| StoreError::not_found("work type"));
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query
            .build_query_as::<WorkType>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("work type"))
    }

    async fn delete_work_type(&self, id: &str) -> StoreResult<WorkType> {
        sqlx::query_as::<_, WorkType>(
            "UPDATE work_types SET is_active = FALSE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("work type"))
    }

    async fn list_work_types(&self, scope: &TenantScope) -> StoreResult<Vec<WorkType>> {
        let mut query = QueryBuilder::new("SELECT * FROM work_types WHERE is_active");
        push_scope(&mut query, scope);
        query.push(" ORDER BY sort_order ASC, created_at ASC, id ASC");

        let work_types = query
            .build_query_as::<WorkType>()
            .fetch_all(&self.pool)
            .await?;
        Ok(work_types)
    }
}

#[async_trait]
impl SessionOps for SqlxStore {
    async fn start_session(&self, create: CreateSession) -> StoreResult<Session> {
        create.validate()?;

        // Check and insert in one statement; the partial unique index in the
        // migration backstops it against concurrent writers.
        let inserted = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, org_id, work_type_id, location, start_time, end_time, is_test, is_active)
            SELECT $1, $2, $3, $4, $5, $6, NULL, $7, TRUE
            WHERE NOT EXISTS (
                SELECT 1 FROM sessions
                WHERE is_active
                  AND user_id IS NOT DISTINCT FROM $2
                  AND org_id IS NOT DISTINCT FROM $3
            )
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.user_id)
        .bind(&create.org_id)
        .bind(&create.work_type_id)
        .bind(&create.location)
        .bind(Utc::now())
        .bind(create.is_test.unwrap_or(false))
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(StoreError::conflict(
                "an active session already exists for this scope",
            )),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::conflict("an active session already exists for this scope"),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    async fn find_active_session(&self, scope: &TenantScope) -> StoreResult<Option<Session>> {
        let mut query = QueryBuilder::new("SELECT * FROM sessions WHERE is_active");
        push_scope(&mut query, scope);
        query.push(" ORDER BY start_time DESC, id ASC LIMIT 1");

        let session = query
            .build_query_as::<Session>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    async fn close_session(&self, id: &str) -> StoreResult<Session> {
        let closed = sqlx::query_as::<_, Session>(
            "UPDATE sessions SET is_active = FALSE, end_time = $2 WHERE id = $1 AND is_active RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match closed {
            Some(session) => Ok(session),
            None => {
                if self.get_session(id).await?.is_some() {
                    Err(StoreError::conflict("session is already closed"))
                } else {
                    Err(StoreError::not_found("session"))
                }
            }
        }
    }

    async fn list_sessions(&self, scope: &TenantScope) -> StoreResult<Vec<Session>> {
        let mut query = QueryBuilder::new("SELECT * FROM sessions WHERE TRUE");
        push_scope(&mut query, scope);
        query.push(" ORDER BY start_time DESC, id ASC");

        let sessions = query
            .build_query_as::<Session>()
            .fetch_all(&self.pool)
            .await?;
        Ok(sessions)
    }

    async fn delete_session(&self, id: &str) -> StoreResult<()> {
        // Transactions cascade via the FK.
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("session"));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionOps for SqlxStore {
    async fn record_transaction(&self, create: CreateTransaction) -> StoreResult<Transaction> {
        create.validate()?;
        let amount = create.normalized_amount()?;

        let work_type_id = match &create.session_id {
            Some(session_id) => {
                let session = self
                    .get_session(session_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("session"))?;
                create.work_type_id.clone().or(session.work_type_id)
            }
            None => create.work_type_id.clone(),
        };

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, session_id, user_id, org_id, work_type_id, amount, type, note, product_id, pennies, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&create.session_id)
        .bind(&create.user_id)
        .bind(&create.org_id)
        .bind(&work_type_id)
        .bind(amount)
        .bind(create.kind.unwrap_or_default().as_str())
        .bind(&create.note)
        .bind(&create.product_id)
        .bind(create.pennies.unwrap_or(0))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn get_transaction(&self, id: &str) -> StoreResult<Option<Transaction>> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(transaction)
    }

    async fn list_transactions(&self, scope: &TenantScope) -> StoreResult<Vec<Transaction>> {
        let mut query = QueryBuilder::new("SELECT * FROM transactions WHERE TRUE");
        push_scope(&mut query, scope);
        query.push(" ORDER BY timestamp DESC, id ASC");

        let transactions = query
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    async fn list_session_transactions(&self, session_id: &str) -> StoreResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE session_id = $1 ORDER BY timestamp ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }
}

// Manual FromRow implementations: enum columns are TEXT and decode through
// FromStr, JSONB maps come through sqlx::types::Json.

fn decode_enum<T>(value: String, index: &'static str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = StoreError>,
{
    value.parse().map_err(|err: StoreError| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(err),
    })
}

impl sqlx::FromRow<'_, PgRow> for Organization {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            tier: decode_enum(row.try_get("tier")?, "tier")?,
            features: row
                .try_get::<sqlx::types::Json<std::collections::HashMap<String, bool>>, _>(
                    "features",
                )?
                .0,
            subdomain: row.try_get("subdomain")?,
            branding: row
                .try_get::<sqlx::types::Json<std::collections::HashMap<String, String>>, _>(
                    "branding",
                )?
                .0,
            created_at: row.try_get("created_at")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Caseworker {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            org_id: row.try_get("org_id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            role: decode_enum(row.try_get("role")?, "role")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            org_id: row.try_get("org_id")?,
            caseworker_id: row.try_get("caseworker_id")?,
            name: row.try_get("name")?,
            pin_hash: row.try_get("pin_hash")?,
            device_id: row.try_get("device_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for WorkType {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            org_id: row.try_get("org_id")?,
            name: row.try_get("name")?,
            icon: row.try_get("icon")?,
            color: row.try_get("color")?,
            is_default: row.try_get("is_default")?,
            sort_order: row.try_get("sort_order")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Session {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            org_id: row.try_get("org_id")?,
            work_type_id: row.try_get("work_type_id")?,
            location: row.try_get("location")?,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            is_test: row.try_get("is_test")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl sqlx::FromRow<'_, PgRow> for Transaction {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            user_id: row.try_get("user_id")?,
            org_id: row.try_get("org_id")?,
            work_type_id: row.try_get("work_type_id")?,
            amount: row.try_get("amount")?,
            kind: decode_enum(row.try_get("type")?, "type")?,
            note: row.try_get("note")?,
            product_id: row.try_get("product_id")?,
            pennies: row.try_get("pennies")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}
