//! Entity adapter contract
//!
//! The resolver never touches storage. It reads relations through
//! [`Authorizable`], one typed capability per relation kind. Relation names
//! come from source declarations and are bound late, at call time.
//!
//! Implementations must be deterministic and side-effect free for the
//! duration of one resolver call.

use crate::error::RelationError;
use crate::role::Role;
use crate::types::{EntityKey, UserId};
use std::fmt;
use std::sync::Arc;

/// Shared handle to an authorizable entity
pub type EntityRef = Arc<dyn Authorizable>;

/// An entity that can be the target of a permission check
///
/// Every relation capability defaults to [`RelationError::Unknown`], so an
/// implementor only overrides the kinds its type actually exposes.
pub trait Authorizable: Send + Sync + fmt::Debug {
    /// Identity of this entity
    fn key(&self) -> EntityKey;

    /// Read a user-valued relation (`None` when unset)
    fn user(&self, relation: &str) -> Result<Option<UserId>, RelationError> {
        Err(self.unknown(relation, "user"))
    }

    /// Read a role-valued relation (`None` when unset)
    fn role(&self, relation: &str) -> Result<Option<Arc<Role>>, RelationError> {
        Err(self.unknown(relation, "role"))
    }

    /// Read a zero-or-one parent relation
    fn parent(&self, relation: &str) -> Result<Option<EntityRef>, RelationError> {
        Err(self.unknown(relation, "parent"))
    }

    /// Read a parent collection, in a stable order
    fn parents(&self, relation: &str) -> Result<Vec<EntityRef>, RelationError> {
        Err(self.unknown(relation, "parents"))
    }

    #[doc(hidden)]
    fn unknown(&self, relation: &str, kind: &'static str) -> RelationError {
        RelationError::Unknown {
            entity: self.key(),
            relation: relation.to_string(),
            kind,
        }
    }
}
