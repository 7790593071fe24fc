//! User scope filters for parent collections
//!
//! A scope narrows a parent collection to the entries relevant to the
//! querying user before the resolver recurses into them, e.g. "only the
//! memberships belonging to this user".

use crate::entity::EntityRef;
use crate::error::{ConfigError, RelationError};
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Narrows a parent collection for a user
pub trait UserScope: Send + Sync + fmt::Debug {
    /// Scope name, used for configuration and diagnostics
    fn name(&self) -> &str;

    /// Return the subset of `parents` relevant to `user`, preserving order
    fn narrow(
        &self,
        parents: Vec<EntityRef>,
        user: &UserId,
    ) -> Result<Vec<EntityRef>, RelationError>;
}

/// Keep parents whose user relation equals the querying user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedBy {
    name: String,
    user_relation: String,
}

impl OwnedBy {
    pub fn new(user_relation: impl Into<String>) -> Self {
        let user_relation = user_relation.into();
        Self {
            name: format!("owned_by:{}", user_relation),
            user_relation,
        }
    }

    pub fn user_relation(&self) -> &str {
        &self.user_relation
    }
}

impl UserScope for OwnedBy {
    fn name(&self) -> &str {
        &self.name
    }

    fn narrow(
        &self,
        parents: Vec<EntityRef>,
        user: &UserId,
    ) -> Result<Vec<EntityRef>, RelationError> {
        let mut kept = Vec::with_capacity(parents.len());
        for parent in parents {
            if parent.user(&self.user_relation)?.as_ref() == Some(user) {
                kept.push(parent);
            }
        }
        Ok(kept)
    }
}

/// Named closure scope
pub struct ScopeFn<F> {
    name: String,
    f: F,
}

impl<F> ScopeFn<F>
where
    F: Fn(Vec<EntityRef>, &UserId) -> Result<Vec<EntityRef>, RelationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> fmt::Debug for ScopeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeFn").field("name", &self.name).finish()
    }
}

impl<F> UserScope for ScopeFn<F>
where
    F: Fn(Vec<EntityRef>, &UserId) -> Result<Vec<EntityRef>, RelationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn narrow(
        &self,
        parents: Vec<EntityRef>,
        user: &UserId,
    ) -> Result<Vec<EntityRef>, RelationError> {
        (self.f)(parents, user)
    }
}

/// Configuration form of a user scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserScopeSpec {
    /// Built-in [`OwnedBy`] scope over the given user relation
    OwnedBy(String),

    /// A scope registered in the [`ScopeTable`] under this name
    Named(String),
}

/// Named user scopes available to configuration
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    scopes: HashMap<String, Arc<dyn UserScope>>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope under its own name
    pub fn register(&mut self, scope: Arc<dyn UserScope>) -> &mut Self {
        self.scopes.insert(scope.name().to_string(), scope);
        self
    }

    /// Register a scope under an alias
    pub fn register_as(&mut self, name: impl Into<String>, scope: Arc<dyn UserScope>) -> &mut Self {
        self.scopes.insert(name.into(), scope);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn UserScope>> {
        self.scopes.get(name)
    }

    /// Resolve a configured scope
    pub fn resolve(&self, spec: &UserScopeSpec) -> Result<Arc<dyn UserScope>, ConfigError> {
        match spec {
            UserScopeSpec::OwnedBy(relation) if relation.is_empty() => {
                Err(ConfigError::EmptyRelation { kind: "user scope" })
            }
            UserScopeSpec::OwnedBy(relation) => Ok(Arc::new(OwnedBy::new(relation.clone()))),
            UserScopeSpec::Named(name) => self
                .scopes
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownScope(name.clone())),
        }
    }
}
