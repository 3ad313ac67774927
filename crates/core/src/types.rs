use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{StoreError, StoreResult, first_validation_error};

/// Subscription tier of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgTier {
    #[default]
    Free,
    Basic,
    Professional,
    Enterprise,
}

impl OrgTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for OrgTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrgTier {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(StoreError::validation(
                "tier",
                format!("unknown tier `{other}`"),
            )),
        }
    }
}

/// Role of a caseworker within its organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseworkerRole {
    Admin,
    #[default]
    Caseworker,
    Readonly,
}

impl CaseworkerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Caseworker => "caseworker",
            Self::Readonly => "readonly",
        }
    }
}

impl fmt::Display for CaseworkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseworkerRole {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "caseworker" => Ok(Self::Caseworker),
            "readonly" => Ok(Self::Readonly),
            other => Err(StoreError::validation(
                "role",
                format!("unknown role `{other}`"),
            )),
        }
    }
}

/// Kind of a recorded monetary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Donation,
    Product,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "donation" => Ok(Self::Donation),
            "product" => Ok(Self::Product),
            other => Err(StoreError::validation(
                "type",
                format!("unknown transaction type `{other}`"),
            )),
        }
    }
}

/// Tenant root. Soft-deactivated, never hard-deleted — caseworkers, users,
/// work types, sessions and transactions all reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub tier: OrgTier,
    pub features: HashMap<String, bool>,
    pub subdomain: Option<String>,
    pub branding: HashMap<String, String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// Staff account belonging to exactly one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caseworker {
    pub id: String,
    #[serde(rename = "orgId")]
    pub org_id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
    pub role: CaseworkerRole,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// End user collecting donations. `org_id` of `None` means free tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    #[serde(rename = "caseworkerId")]
    pub caseworker_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "pinHash")]
    pub pin_hash: Option<String>,
    #[serde(rename = "deviceId")]
    pub device_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Label for a category of income, owned by a user or an organization.
/// Soft-deleted: deactivated rows stay retrievable by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkType {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "isDefault")]
    pub is_default: bool,
    #[serde(rename = "sortOrder")]
    pub sort_order: i32,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A bounded collection period. Starts active, transitions once to closed;
/// closed is terminal. At most one active session per (user, org) scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    #[serde(rename = "workTypeId")]
    pub work_type_id: Option<String>,
    pub location: String,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "isTest")]
    pub is_test: bool,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// Immutable ledger entry. `session_id` of `None` is a quick transaction
/// recorded outside any session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    #[serde(rename = "workTypeId")]
    pub work_type_id: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub note: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub pennies: i32,
    pub timestamp: DateTime<Utc>,
}

// ─── Insert shapes ──────────────────────────────────────────────────────
//
// Client-supplied fields only. Server-owned fields (id, createdAt,
// startTime, timestamp, endTime) do not exist here, and unknown fields are
// rejected at deserialization instead of silently dropped.

/// Organization creation data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateOrganization {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub tier: Option<OrgTier>,
    #[serde(default)]
    pub features: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub branding: Option<HashMap<String, String>>,
}

impl CreateOrganization {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}

/// Caseworker creation data. The password arrives pre-hashed; the engine
/// never sees plaintext credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCaseworker {
    #[serde(rename = "orgId")]
    #[validate(length(min = 1, message = "orgId must not be empty"))]
    pub org_id: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(rename = "passwordHash")]
    #[validate(length(min = 1, message = "passwordHash must not be empty"))]
    pub password_hash: String,
    #[serde(default)]
    pub role: Option<CaseworkerRole>,
}

impl CreateCaseworker {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}

/// User creation data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUser {
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    #[serde(rename = "caseworkerId", default)]
    pub caseworker_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "pinHash", default)]
    pub pin_hash: Option<String>,
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

impl CreateUser {
    pub fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Work type creation data. `user_id` and `org_id` are mutually exclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateWorkType {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "isDefault", default)]
    pub is_default: Option<bool>,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: Option<i32>,
}

impl CreateWorkType {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))?;
        if self.user_id.is_some() && self.org_id.is_some() {
            return Err(StoreError::validation(
                "orgId",
                "userId and orgId are mutually exclusive",
            ));
        }
        Ok(())
    }
}

/// Session creation data. `start_time` is server-owned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateSession {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    #[serde(rename = "workTypeId", default)]
    pub work_type_id: Option<String>,
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: String,
    #[serde(rename = "isTest", default)]
    pub is_test: Option<bool>,
}

impl CreateSession {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}

/// Transaction creation data. `timestamp` is server-owned; the amount must
/// carry at most two decimal places and is stored at exactly scale 2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransaction {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,
    #[serde(rename = "workTypeId", default)]
    pub work_type_id: Option<String>,
    pub amount: Decimal,
    #[serde(rename = "type", default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "productId", default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub pennies: Option<i32>,
}

impl CreateTransaction {
    pub fn validate(&self) -> StoreResult<()> {
        self.normalized_amount()?;
        if self.pennies.is_some_and(|p| p < 0) {
            return Err(StoreError::validation(
                "pennies",
                "pennies must not be negative",
            ));
        }
        Ok(())
    }

    /// The amount rescaled to exactly two decimal places, rejecting negative
    /// values and sub-cent precision.
    pub fn normalized_amount(&self) -> StoreResult<Decimal> {
        if self.amount.is_sign_negative() {
            return Err(StoreError::validation(
                "amount",
                "amount must not be negative",
            ));
        }
        if self.amount.scale() > 2 {
            return Err(StoreError::validation(
                "amount",
                "amount must have at most two decimal places",
            ));
        }
        let mut amount = self.amount;
        amount.rescale(2);
        Ok(amount)
    }
}

// ─── Update shapes ──────────────────────────────────────────────────────
//
// Partial updates: `None` leaves the field untouched. Sessions mutate only
// through `close_session`, and transactions never — neither has an update
// shape.

/// Organization update data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrganization {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<OrgTier>,
    #[serde(default)]
    pub features: Option<HashMap<String, bool>>,
    #[serde(default)]
    pub subdomain: Option<String>,
    #[serde(default)]
    pub branding: Option<HashMap<String, String>>,
}

impl UpdateOrganization {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}

/// Caseworker update data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateCaseworker {
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(rename = "passwordHash", default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub role: Option<CaseworkerRole>,
}

impl UpdateCaseworker {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}

/// User update data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    #[serde(rename = "caseworkerId", default)]
    pub caseworker_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "pinHash", default)]
    pub pin_hash: Option<String>,
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
}

impl UpdateUser {
    pub fn validate(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Work type update data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateWorkType {
    #[serde(default)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "isDefault", default)]
    pub is_default: Option<bool>,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: Option<i32>,
}

impl UpdateWorkType {
    pub fn validate(&self) -> StoreResult<()> {
        Validate::validate(self).map_err(|e| first_validation_error(&e))
    }
}
