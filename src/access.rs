//! Role-based access control over retrieval candidates.
//!
//! Visibility is decided by intersecting a chunk's `required_roles` with the
//! requester's *effective* role set, which is computed from an injected
//! [`RoleHierarchy`] rather than any process-wide table. The filter is
//! non-leaking: nothing about a hidden chunk crosses the filter boundary
//! except its contribution to the `hidden` count.

use std::collections::HashMap;
use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{DalilError, Result};
use crate::fusion::FusedCandidate;

/// Access roles recognized by the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// General staff.
    Staff,
    /// Legal advisors; may read restricted documents.
    Legal,
    /// Administrators; implies all other roles.
    Admin,
}

impl Role {
    /// Get the canonical name of this role.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Legal => "legal",
            Role::Admin => "admin",
        }
    }

    /// Parse a role from a string (case-insensitive).
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "legal" => Ok(Role::Legal),
            "admin" => Ok(Role::Admin),
            other => Err(DalilError::authorization(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Injected role → implied-roles configuration.
///
/// The default table implements the corpus policy: admin implies
/// {admin, legal, staff}, legal implies {legal, staff}, staff implies
/// {staff}. A role missing from the table implies only itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleHierarchy {
    implied: HashMap<Role, Vec<Role>>,
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        let mut implied = HashMap::new();
        implied.insert(Role::Admin, vec![Role::Admin, Role::Legal, Role::Staff]);
        implied.insert(Role::Legal, vec![Role::Legal, Role::Staff]);
        implied.insert(Role::Staff, vec![Role::Staff]);
        Self { implied }
    }
}

impl RoleHierarchy {
    /// Create a hierarchy from an explicit role → implied-roles table.
    pub fn new(implied: HashMap<Role, Vec<Role>>) -> Self {
        Self { implied }
    }

    /// Expand held roles into the effective role set.
    pub fn effective(&self, roles: &[Role]) -> AHashSet<Role> {
        let mut effective = AHashSet::new();
        for role in roles {
            match self.implied.get(role) {
                Some(implied) => effective.extend(implied.iter().copied()),
                None => {
                    effective.insert(*role);
                }
            }
        }
        effective
    }
}

/// Outcome of access filtering: the visible candidates in their incoming
/// order, plus the exact number of candidates removed.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Candidates the requester may see, original order preserved.
    pub visible: Vec<FusedCandidate>,
    /// Number of candidates removed from the pre-truncation fused list.
    pub hidden: usize,
}

/// Role-based candidate filter.
///
/// Pure and total over well-formed input: filtering never fails, it only
/// partitions.
#[derive(Debug, Clone, Default)]
pub struct AccessFilter {
    hierarchy: RoleHierarchy,
}

impl AccessFilter {
    /// Create a filter over the given role hierarchy.
    pub fn new(hierarchy: RoleHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Compute the effective role set for a request.
    pub fn effective_roles(&self, roles: &[Role]) -> AHashSet<Role> {
        self.hierarchy.effective(roles)
    }

    /// Retain the candidates whose required roles intersect the requester's
    /// effective role set.
    ///
    /// `required_roles_of` maps a chunk id to its build-time `required_roles`
    /// attribute; candidates whose ids are unknown to the corpus are treated
    /// as hidden rather than leaked.
    pub fn filter<'a, F>(
        &self,
        candidates: Vec<FusedCandidate>,
        roles: &[Role],
        required_roles_of: F,
    ) -> FilterOutcome
    where
        F: Fn(u64) -> Option<&'a [Role]>,
    {
        let effective = self.hierarchy.effective(roles);
        let before = candidates.len();

        let visible: Vec<FusedCandidate> = candidates
            .into_iter()
            .filter(|candidate| match required_roles_of(candidate.chunk_id) {
                Some(required) => required.iter().any(|r| effective.contains(r)),
                None => false,
            })
            .collect();

        let hidden = before - visible.len();
        FilterOutcome { visible, hidden }
    }
}
