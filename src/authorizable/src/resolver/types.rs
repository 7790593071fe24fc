//! Resolver result types

use crate::role::{Role, RoleSet};
use crate::types::{EntityKey, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// One granting role occurrence and the entities traversed to reach it
#[derive(Debug, Clone, Serialize)]
pub struct GrantPath {
    /// Queried entity first, granting entity last
    pub path: Vec<EntityKey>,

    /// Role that granted the permission
    pub role: Arc<Role>,
}

impl GrantPath {
    /// Entity whose direct-user source produced the grant
    pub fn granted_by(&self) -> Option<&EntityKey> {
        self.path.last()
    }

    /// Number of delegation hops from the queried entity
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Counters collected during one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    /// Entities entered
    pub entities_visited: usize,

    /// Sources evaluated across all visited entities
    pub sources_evaluated: usize,

    /// Branches cut because the entity was already visited
    pub cycles_skipped: usize,

    /// Direct-user matches whose role resolved to nothing
    pub role_misses: usize,
}

/// Explained authorization decision
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    /// Unique decision identifier
    pub id: Uuid,

    /// Queried entity
    pub entity: EntityKey,

    /// Querying user
    pub user: UserId,

    /// Requested permission
    pub permission: String,

    /// Whether any role grants the permission
    pub allowed: bool,

    /// Distinct granting roles
    pub roles: RoleSet,

    /// Every granting path, in traversal order
    pub grants: Vec<GrantPath>,

    /// Traversal counters
    pub stats: TraversalStats,

    /// Evaluation timestamp
    pub evaluated_at: DateTime<Utc>,

    /// Evaluation time in microseconds
    pub duration_us: u64,
}
