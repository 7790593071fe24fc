//! Role locators
//!
//! A fixed-key direct-user source (e.g. `role: "Thread Moderator"`) does not
//! carry a role itself. The key is handed to the locator configured for the
//! entity type, identified by a `(role_type, locate_method)` pair. A lookup
//! miss is not an error: it yields `None` and the source grants nothing.

use crate::error::RelationError;
use crate::role::Role;
use crate::types::RoleId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default role type name
pub const DEFAULT_ROLE_TYPE: &str = "Role";

/// Default locate method name
pub const DEFAULT_LOCATE_METHOD: &str = "locate";

/// Per entity type role lookup options
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Role type the lookup is performed against
    #[serde(default = "default_role_type")]
    pub role_type: String,

    /// Lookup method on the role type
    #[serde(default = "default_locate_method")]
    pub locate_method: String,
}

fn default_role_type() -> String {
    DEFAULT_ROLE_TYPE.to_string()
}

fn default_locate_method() -> String {
    DEFAULT_LOCATE_METHOD.to_string()
}

impl LocatorConfig {
    pub fn new(role_type: impl Into<String>, locate_method: impl Into<String>) -> Self {
        Self {
            role_type: role_type.into(),
            locate_method: locate_method.into(),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_TYPE, DEFAULT_LOCATE_METHOD)
    }
}

impl fmt::Display for LocatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.role_type, self.locate_method)
    }
}

/// Looks up a role by a fixed key
pub trait RoleLocator: Send + Sync {
    /// Locate a role, returning `Ok(None)` when no role matches the key
    fn locate(&self, key: &str) -> Result<Option<Arc<Role>>, RelationError>;
}

impl<F> RoleLocator for F
where
    F: Fn(&str) -> Option<Arc<Role>> + Send + Sync,
{
    fn locate(&self, key: &str) -> Result<Option<Arc<Role>>, RelationError> {
        Ok(self(key))
    }
}

/// Bindings from `(role_type, locate_method)` to locators
#[derive(Clone, Default)]
pub struct LocatorRegistry {
    bindings: HashMap<LocatorConfig, Arc<dyn RoleLocator>>,
}

impl LocatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a locator, replacing any previous binding for the same pair
    pub fn bind(
        &mut self,
        role_type: impl Into<String>,
        locate_method: impl Into<String>,
        locator: Arc<dyn RoleLocator>,
    ) -> &mut Self {
        self.bindings
            .insert(LocatorConfig::new(role_type, locate_method), locator);
        self
    }

    pub fn get(&self, config: &LocatorConfig) -> Option<&Arc<dyn RoleLocator>> {
        self.bindings.get(config)
    }

    pub fn is_bound(&self, config: &LocatorConfig) -> bool {
        self.bindings.contains_key(config)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for LocatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bound: Vec<String> = self.bindings.keys().map(|k| k.to_string()).collect();
        bound.sort();
        f.debug_struct("LocatorRegistry").field("bound", &bound).finish()
    }
}

/// Thread-safe in-memory role store
///
/// Roles are indexed by id and by name. Cloning shares the underlying maps.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    by_id: Arc<DashMap<RoleId, Arc<Role>>>,
    by_name: Arc<DashMap<String, Arc<Role>>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a role, replacing any role with the same id
    pub fn insert(&self, role: Role) -> Arc<Role> {
        let role = Arc::new(role);
        self.by_name.insert(role.name.clone(), Arc::clone(&role));
        let previous = self.by_id.insert(role.id.clone(), Arc::clone(&role));

        // Drop the old name only while it still points at this id
        if let Some(previous) = previous.filter(|p| p.name != role.name) {
            self.by_name
                .remove_if(&previous.name, |_, current| current.id == previous.id);
        }
        role
    }

    pub fn get(&self, id: &str) -> Option<Arc<Role>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<Role>> {
        self.by_name.get(name).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Locator resolving keys against role ids
    pub fn by_id(&self) -> Arc<dyn RoleLocator> {
        Arc::new(TableLocator {
            table: self.clone(),
            index: TableIndex::Id,
        })
    }

    /// Locator resolving keys against role names
    pub fn by_name(&self) -> Arc<dyn RoleLocator> {
        Arc::new(TableLocator {
            table: self.clone(),
            index: TableIndex::Name,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum TableIndex {
    Id,
    Name,
}

struct TableLocator {
    table: RoleTable,
    index: TableIndex,
}

impl RoleLocator for TableLocator {
    fn locate(&self, key: &str) -> Result<Option<Arc<Role>>, RelationError> {
        Ok(match self.index {
            TableIndex::Id => self.table.get(key),
            TableIndex::Name => self.table.find_by_name(key),
        })
    }
}
