//! Default work type seeding for first-time tenants.

use crate::error::StoreResult;
use crate::scope::TenantScope;
use crate::store::traits::WorkTypeOps;
use crate::types::{CreateWorkType, WorkType};

/// Scope owner a set of defaults is seeded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkTypeOwner {
    User(String),
    Org(String),
}

impl WorkTypeOwner {
    fn scope(&self) -> TenantScope {
        match self {
            Self::User(id) => TenantScope::user(id.clone()),
            Self::Org(id) => TenantScope::org(id.clone()),
        }
    }
}

/// name, icon, color — seeded in order, sort_order = position.
const DEFAULT_WORK_TYPES: &[(&str, &str, &str)] = &[
    ("General", "hand-heart", "#2E7D32"),
    ("Events", "calendar", "#1565C0"),
    ("Products", "shopping-bag", "#EF6C00"),
    ("Pledges", "clipboard", "#6A1B9A"),
];

/// Ensure the owner has work types, creating the default set when none
/// exist. Idempotent: called on every login, it no-ops once any work type
/// (seeded or user-created) exists for the scope.
pub async fn ensure_default_work_types<S>(
    store: &S,
    owner: WorkTypeOwner,
) -> StoreResult<Vec<WorkType>>
where
    S: WorkTypeOps + ?Sized,
{
    let existing = store.list_work_types(&owner.scope()).await?;
    if !existing.is_empty() {
        return Ok(Vec::new());
    }

    let (user_id, org_id) = match &owner {
        WorkTypeOwner::User(id) => (Some(id.clone()), None),
        WorkTypeOwner::Org(id) => (None, Some(id.clone())),
    };

    let mut created = Vec::with_capacity(DEFAULT_WORK_TYPES.len());
    for (position, (name, icon, color)) in DEFAULT_WORK_TYPES.iter().enumerate() {
        let work_type = store
            .create_work_type(CreateWorkType {
                user_id: user_id.clone(),
                org_id: org_id.clone(),
                name: (*name).to_string(),
                icon: Some((*icon).to_string()),
                color: Some((*color).to_string()),
                is_default: Some(true),
                sort_order: Some(position as i32),
            })
            .await?;
        created.push(work_type);
    }

    Ok(created)
}
