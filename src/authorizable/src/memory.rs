//! In-memory entity graph
//!
//! A self-contained implementation of the entity adapter contract, backed by
//! plain records. Used by the `authz-check` binary, tests and benchmarks.
//! Fixtures are JSON documents:
//!
//! ```json
//! {
//!   "roles": [ { "id": "1", "name": "Forum Moderator", "permissions": "moderate, edit" } ],
//!   "entities": [
//!     { "type": "forum_membership", "id": "1",
//!       "users": { "user": "matt" }, "roles": { "role": "1" } }
//!   ],
//!   "types": {
//!     "forum_membership": {
//!       "sources": [ { "type": "direct_user", "user": "user", "role_relation": "role" } ]
//!     }
//!   }
//! }
//! ```

use crate::config::RegistryConfig;
use crate::entity::{Authorizable, EntityRef};
use crate::error::{AuthzError, RelationError};
use crate::locator::{LocatorRegistry, RoleTable, DEFAULT_LOCATE_METHOD, DEFAULT_ROLE_TYPE};
use crate::role::Role;
use crate::source::{ScopeTable, SourceRegistry};
use crate::types::{EntityKey, RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Locate method resolving role names
pub const FIND_BY_NAME: &str = "find_by_name";

/// Stored role with a comma-delimited permission list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub permissions: String,
}

impl RoleRecord {
    pub fn to_role(&self) -> Role {
        Role::from_delimited(self.id.clone(), self.name.clone(), &self.permissions)
    }
}

/// Stored entity and its relations
///
/// A relation present with a `null` value is declared but unset; a relation
/// absent from the maps is unknown to the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: String,
    #[serde(default)]
    pub users: BTreeMap<String, Option<UserId>>,
    #[serde(default)]
    pub roles: BTreeMap<String, Option<RoleId>>,
    #[serde(default)]
    pub parent: BTreeMap<String, Option<EntityKey>>,
    #[serde(default)]
    pub parents: BTreeMap<String, Vec<EntityKey>>,
}

impl EntityRecord {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            users: BTreeMap::new(),
            roles: BTreeMap::new(),
            parent: BTreeMap::new(),
            parents: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.entity_type.clone(), self.id.clone())
    }

    pub fn with_user(mut self, relation: impl Into<String>, user: Option<&str>) -> Self {
        self.users.insert(relation.into(), user.map(UserId::from));
        self
    }

    pub fn with_role(mut self, relation: impl Into<String>, role: Option<&str>) -> Self {
        self.roles.insert(relation.into(), role.map(str::to_string));
        self
    }

    pub fn with_parent(mut self, relation: impl Into<String>, parent: Option<EntityKey>) -> Self {
        self.parent.insert(relation.into(), parent);
        self
    }

    pub fn with_parents(mut self, relation: impl Into<String>, parents: Vec<EntityKey>) -> Self {
        self.parents.insert(relation.into(), parents);
        self
    }
}

/// Roles, entities and type declarations in one document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub types: RegistryConfig,
}

impl GraphFixture {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Source registry declared by the fixture
    pub fn registry(&self, scopes: &ScopeTable) -> crate::Result<SourceRegistry> {
        Ok(SourceRegistry::from_config(&self.types, scopes)?)
    }

    /// Entity graph holding the fixture's roles and entities
    pub fn graph(&self) -> crate::Result<MemoryGraph> {
        let graph = MemoryGraph::new();
        for role in &self.roles {
            graph.add_role(role.to_role());
        }
        graph.with_records(self.entities.iter().cloned())
    }
}

struct GraphInner {
    records: HashMap<EntityKey, EntityRecord>,
    roles: RoleTable,
}

/// Immutable in-memory entity graph
///
/// Cloning shares the underlying records. The role table stays writable.
#[derive(Clone)]
pub struct MemoryGraph {
    inner: Arc<GraphInner>,
}

impl MemoryGraph {
    /// Empty graph with an empty role table
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GraphInner {
                records: HashMap::new(),
                roles: RoleTable::new(),
            }),
        }
    }

    /// Graph extended with `records`, sharing this graph's role table
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidInput`] on duplicate entity keys.
    pub fn with_records(
        self,
        records: impl IntoIterator<Item = EntityRecord>,
    ) -> crate::Result<Self> {
        let mut map = self.inner.records.clone();
        for record in records {
            let key = record.key();
            if map.insert(key.clone(), record).is_some() {
                return Err(AuthzError::InvalidInput(format!("Duplicate entity {}", key)));
            }
        }

        info!(entities = map.len(), roles = self.inner.roles.len(), "Loaded entity graph");
        Ok(Self {
            inner: Arc::new(GraphInner {
                records: map,
                roles: self.inner.roles.clone(),
            }),
        })
    }

    /// Role table backing role relations and locators
    pub fn roles(&self) -> &RoleTable {
        &self.inner.roles
    }

    /// Insert a role into the shared role table
    pub fn add_role(&self, role: Role) -> Arc<Role> {
        self.inner.roles.insert(role)
    }

    /// Locators over the role table: `Role::locate` by id and
    /// `Role::find_by_name` by name
    pub fn locators(&self) -> LocatorRegistry {
        let mut locators = LocatorRegistry::new();
        locators
            .bind(DEFAULT_ROLE_TYPE, DEFAULT_LOCATE_METHOD, self.inner.roles.by_id())
            .bind(DEFAULT_ROLE_TYPE, FIND_BY_NAME, self.inner.roles.by_name());
        locators
    }

    /// Handle to a stored entity
    pub fn entity(&self, key: &EntityKey) -> Option<EntityRef> {
        handle(&self.inner, key)
    }

    /// Handle to a stored entity by type and id
    pub fn get(&self, entity_type: &str, id: &str) -> Option<EntityRef> {
        self.entity(&EntityKey::new(entity_type, id))
    }

    pub fn len(&self) -> usize {
        self.inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.is_empty()
    }
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryGraph")
            .field("entities", &self.inner.records.len())
            .field("roles", &self.inner.roles.len())
            .finish()
    }
}

fn handle(inner: &Arc<GraphInner>, key: &EntityKey) -> Option<EntityRef> {
    inner.records.contains_key(key).then(|| {
        Arc::new(MemoryEntity {
            graph: Arc::clone(inner),
            key: key.clone(),
        }) as EntityRef
    })
}

/// Handle to one record of a [`MemoryGraph`]
struct MemoryEntity {
    graph: Arc<GraphInner>,
    key: EntityKey,
}

impl MemoryEntity {
    fn record(&self) -> Result<&EntityRecord, RelationError> {
        self.graph
            .records
            .get(&self.key)
            .ok_or_else(|| RelationError::Backend(format!("Record {} vanished", self.key)))
    }

    fn dangling(&self, relation: &str, target: String) -> RelationError {
        RelationError::Dangling {
            entity: self.key.clone(),
            relation: relation.to_string(),
            target,
        }
    }

    fn resolve(&self, relation: &str, key: &EntityKey) -> Result<EntityRef, RelationError> {
        handle(&self.graph, key).ok_or_else(|| self.dangling(relation, key.to_string()))
    }
}

impl fmt::Debug for MemoryEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MemoryEntity").field(&self.key.to_string()).finish()
    }
}

impl Authorizable for MemoryEntity {
    fn key(&self) -> EntityKey {
        self.key.clone()
    }

    fn user(&self, relation: &str) -> Result<Option<UserId>, RelationError> {
        match self.record()?.users.get(relation) {
            Some(user) => Ok(user.clone()),
            None => Err(self.unknown(relation, "user")),
        }
    }

    fn role(&self, relation: &str) -> Result<Option<Arc<Role>>, RelationError> {
        match self.record()?.roles.get(relation) {
            Some(Some(id)) => self
                .graph
                .roles
                .get(id)
                .map(Some)
                .ok_or_else(|| self.dangling(relation, format!("role {}", id))),
            Some(None) => Ok(None),
            None => Err(self.unknown(relation, "role")),
        }
    }

    fn parent(&self, relation: &str) -> Result<Option<EntityRef>, RelationError> {
        match self.record()?.parent.get(relation) {
            Some(Some(key)) => self.resolve(relation, key).map(Some),
            Some(None) => Ok(None),
            None => Err(self.unknown(relation, "parent")),
        }
    }

    fn parents(&self, relation: &str) -> Result<Vec<EntityRef>, RelationError> {
        match self.record()?.parents.get(relation) {
            Some(keys) => keys.iter().map(|key| self.resolve(relation, key)).collect(),
            None => Err(self.unknown(relation, "parents")),
        }
    }
}
