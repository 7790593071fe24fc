//! Declarative configuration
//!
//! Entity types and their sources can be declared in code through
//! [`SourceRegistry::entity`](crate::source::SourceRegistry::entity) or loaded
//! from JSON:
//!
//! ```json
//! {
//!   "forum_thread": {
//!     "role_locator": { "locate_method": "find_by_name" },
//!     "sources": [
//!       { "type": "direct_user", "user": "moderator", "role": "Thread Moderator" },
//!       { "type": "parent", "relation": "forum" }
//!     ]
//!   }
//! }
//! ```

use crate::error::ConfigError;
use crate::locator::LocatorConfig;
use crate::source::{RoleSpec, ScopeTable, Source, UserScopeSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entity type declarations keyed by entity type name
pub type RegistryConfig = BTreeMap<String, EntityTypeDecl>;

/// Declaration of one entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDecl {
    /// Role lookup options for fixed-key direct-user sources
    #[serde(default)]
    pub role_locator: LocatorConfig,

    /// Sources in declaration order
    #[serde(default)]
    pub sources: Vec<SourceDecl>,
}

/// Serialized form of a [`Source`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDecl {
    /// Direct user relation with either a fixed role or a role relation
    DirectUser {
        user: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role_relation: Option<String>,
    },

    /// Zero-or-one parent (belongs-to)
    Parent { relation: String },

    /// Zero-or-one parent (has-one); same semantics as `parent`
    HasOneParent { relation: String },

    /// Parent collection with an optional user scope
    ManyParents {
        relation: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_scope: Option<UserScopeSpec>,
    },
}

impl SourceDecl {
    /// Convert into a validated source
    pub fn build(&self, scopes: &ScopeTable) -> Result<Source, ConfigError> {
        let source = match self {
            SourceDecl::DirectUser {
                user,
                role,
                role_relation,
            } => {
                let role = RoleSpec::from_options(user, role.clone(), role_relation.clone())?;
                Source::direct_user(user.clone(), role)
            }
            SourceDecl::Parent { relation } | SourceDecl::HasOneParent { relation } => {
                Source::parent(relation.clone())
            }
            SourceDecl::ManyParents {
                relation,
                user_scope: None,
            } => Source::parents(relation.clone()),
            SourceDecl::ManyParents {
                relation,
                user_scope: Some(spec),
            } => Source::scoped_parents(relation.clone(), scopes.resolve(spec)?),
        };

        source.validate()?;
        Ok(source)
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Stop a boolean check at the first grant
    #[serde(default = "default_true")]
    pub short_circuit_check: bool,

    /// Maximum traversal depth below the queried entity (unbounded when unset)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            short_circuit_check: true,
            max_depth: None,
        }
    }
}
