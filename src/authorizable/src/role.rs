//! Roles and role sets

use crate::types::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A named bundle of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier
    pub id: RoleId,

    /// Human readable role name (e.g., "Forum Moderator")
    pub name: String,

    /// Permission tokens granted by this role
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl Role {
    /// Create a new role
    pub fn new<I, S>(id: impl Into<RoleId>, name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a role from a comma-delimited permission list
    ///
    /// Entries are trimmed and blank entries are dropped, so
    /// `"read, moderate,,"` yields `{"read", "moderate"}`.
    pub fn from_delimited(id: impl Into<RoleId>, name: impl Into<String>, raw: &str) -> Self {
        let permissions = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            id: id.into(),
            name: name.into(),
            permissions,
        }
    }

    /// Exact, case-sensitive membership test
    pub fn allows(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Set of roles deduplicated by role identity
///
/// Iteration is ordered by role id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeMap<RoleId, Arc<Role>>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a role; returns false if a role with the same id was present
    pub fn insert(&mut self, role: Arc<Role>) -> bool {
        if self.roles.contains_key(&role.id) {
            return false;
        }
        self.roles.insert(role.id.clone(), role);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.roles.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Role>> {
        self.roles.get(id)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Role>> {
        self.roles.values()
    }

    /// Role ids in iteration order
    pub fn ids(&self) -> Vec<RoleId> {
        self.roles.keys().cloned().collect()
    }

    /// Role names in iteration (id) order
    pub fn names(&self) -> Vec<String> {
        self.roles.values().map(|r| r.name.clone()).collect()
    }

    /// Whether every role in `self` is also in `other`
    pub fn is_subset(&self, other: &RoleSet) -> bool {
        self.roles.keys().all(|id| other.contains(id))
    }
}

impl FromIterator<Arc<Role>> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Arc<Role>>>(iter: T) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl IntoIterator for RoleSet {
    type Item = Arc<Role>;
    type IntoIter = std::collections::btree_map::IntoValues<RoleId, Arc<Role>>;

    fn into_iter(self) -> Self::IntoIter {
        self.roles.into_values()
    }
}
