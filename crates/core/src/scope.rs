//! Tenant scope resolution.
//!
//! A scope is a pair of independent filters over an entity's `user_id` and
//! `org_id`. Each dimension is either unfiltered or pinned to an exact
//! value — where the pinned value may be the null sentinel, meaning "free
//! tier only". Both store backends resolve visibility through this one
//! type: the in-memory backend evaluates [`TenantScope::matches`] directly,
//! the relational backend translates each [`ScopeDim`] into a SQL predicate
//! (`IS NULL` for the sentinel, never an absent parameter).

use serde::{Deserialize, Serialize};

/// Filter for one tenant dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScopeDim {
    /// Dimension is not filtered; every value matches.
    #[default]
    Any,
    /// Exact match. `Is(None)` matches only entities with no value set
    /// (the free-tier sentinel).
    Is(Option<String>),
}

impl ScopeDim {
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Is(want) => want.as_deref() == value,
        }
    }
}

/// The (userId, orgId) filter pair shared by every query operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TenantScope {
    pub user: ScopeDim,
    pub org: ScopeDim,
}

impl TenantScope {
    /// No filtering on either dimension.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to a concrete user id.
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            user: ScopeDim::Is(Some(id.into())),
            org: ScopeDim::Any,
        }
    }

    /// Restrict to a concrete organization id.
    pub fn org(id: impl Into<String>) -> Self {
        Self {
            user: ScopeDim::Any,
            org: ScopeDim::Is(Some(id.into())),
        }
    }

    /// Restrict to entities with no organization (free tier).
    pub fn free_tier_org() -> Self {
        Self {
            user: ScopeDim::Any,
            org: ScopeDim::Is(None),
        }
    }

    /// The exact ownership scope of an entity: both dimensions pinned,
    /// nulls included. This is the scope the active-session invariant is
    /// keyed by.
    pub fn exact(user_id: Option<String>, org_id: Option<String>) -> Self {
        Self {
            user: ScopeDim::Is(user_id),
            org: ScopeDim::Is(org_id),
        }
    }

    /// Pin the user dimension on an existing scope.
    pub fn with_user(mut self, id: impl Into<String>) -> Self {
        self.user = ScopeDim::Is(Some(id.into()));
        self
    }

    /// Pin the org dimension on an existing scope.
    pub fn with_org(mut self, id: impl Into<String>) -> Self {
        self.org = ScopeDim::Is(Some(id.into()));
        self
    }

    pub fn matches(&self, user_id: Option<&str>, org_id: Option<&str>) -> bool {
        self.user.matches(user_id) && self.org.matches(org_id)
    }
}
