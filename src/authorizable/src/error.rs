//! Error types for the authorization resolver

use crate::types::EntityKey;
use thiserror::Error;

/// Malformed or missing authorization declarations
///
/// Always fatal to the call that raised it. A configuration error is never
/// folded into a "deny" result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A direct-user source names both a fixed role and a role relation
    #[error("Direct user source on '{user_relation}' has both a role and a role relation")]
    ConflictingRoleSpec { user_relation: String },

    /// A direct-user source names neither a fixed role nor a role relation
    #[error("Need a role or role relation for direct user source on '{user_relation}'")]
    MissingRoleSpec { user_relation: String },

    /// A source was declared with an empty relation name
    #[error("Empty relation name in {kind} source")]
    EmptyRelation { kind: &'static str },

    /// An entity type was queried without any declared sources
    #[error("No authorizable sources declared for entity type '{0}'")]
    NoSources(String),

    /// No role locator is bound for the configured role type and method
    #[error("No role locator bound for {role_type}::{locate_method} (entity type '{entity_type}')")]
    UnboundLocator {
        entity_type: String,
        role_type: String,
        locate_method: String,
    },

    /// A configured user scope name is not registered
    #[error("Unknown user scope '{0}'")]
    UnknownScope(String),

    /// An operation referenced an entity type that was never registered
    #[error("Unknown entity type '{0}'")]
    UnknownEntityType(String),
}

/// Failure of an entity adapter to resolve a relation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelationError {
    /// The entity does not expose the named relation
    #[error("{entity} has no {kind} relation '{relation}'")]
    Unknown {
        entity: EntityKey,
        relation: String,
        kind: &'static str,
    },

    /// The relation points at a record that does not exist
    #[error("{entity}.{relation} references missing {target}")]
    Dangling {
        entity: EntityKey,
        relation: String,
        target: String,
    },

    /// The backing store failed while reading the relation
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Authorization resolver errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Relation read error
    #[error("Relation error: {0}")]
    Relation(#[from] RelationError),

    /// Traversal went deeper than the configured limit
    #[error("Traversal depth limit {limit} exceeded at {entity}")]
    DepthExceeded { limit: usize, entity: EntityKey },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fixture or configuration parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Whether this error originates from a declaration problem
    pub fn is_config(&self) -> bool {
        matches!(self, AuthzError::Config(_))
    }

    /// Whether this error originates from an entity adapter
    pub fn is_relation(&self) -> bool {
        matches!(self, AuthzError::Relation(_))
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
