//! Authorization resolver
//!
//! Walks an entity's sources depth-first, recursing into parent entities,
//! and answers four query shapes over the same traversal:
//!
//! | Query | Result |
//! |-------|--------|
//! | [`Resolver::check`] | whether any reachable role allows the permission |
//! | [`Resolver::granting_roles`] | distinct roles allowing the permission |
//! | [`Resolver::granting_paths`] | one entry per granting role occurrence, with its path |
//! | [`Resolver::all_authorizations`] | distinct roles regardless of permission |
//!
//! Each call is a fresh traversal with its own visited set; nothing is
//! cached across calls. Configuration and relation errors anywhere in the
//! walk abort the call.
//!
//! # Example
//!
//! ```
//! use cretoai_authorizable::{
//!     Authorizable, EntityKey, LocatorRegistry, RelationError, Resolver, Role, RoleSpec,
//!     SourceRegistry, UserId,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Membership {
//!     user: UserId,
//!     role: Arc<Role>,
//! }
//!
//! impl Authorizable for Membership {
//!     fn key(&self) -> EntityKey {
//!         EntityKey::new("membership", "1")
//!     }
//!
//!     fn user(&self, _relation: &str) -> Result<Option<UserId>, RelationError> {
//!         Ok(Some(self.user.clone()))
//!     }
//!
//!     fn role(&self, _relation: &str) -> Result<Option<Arc<Role>>, RelationError> {
//!         Ok(Some(Arc::clone(&self.role)))
//!     }
//! }
//!
//! # fn main() -> cretoai_authorizable::Result<()> {
//! let mut registry = SourceRegistry::new();
//! registry
//!     .entity("membership")
//!     .belongs_to_user("user", RoleSpec::relation("role"))?;
//!
//! let resolver = Resolver::new(registry, LocatorRegistry::new())?;
//! let membership = Membership {
//!     user: UserId::new("matt"),
//!     role: Arc::new(Role::new("1", "Forum Moderator", ["moderate"])),
//! };
//!
//! assert!(resolver.check(&membership, &UserId::new("matt"), "moderate")?);
//! assert!(!resolver.check(&membership, &UserId::new("dave"), "moderate")?);
//! # Ok(())
//! # }
//! ```

mod context;
mod types;
mod walk;


pub use types::{Decision, GrantPath, TraversalStats};

use crate::config::ResolverConfig;
use crate::entity::Authorizable;
use crate::error::{ConfigError, Result};
use crate::locator::LocatorRegistry;
use crate::role::RoleSet;
use crate::source::SourceRegistry;
use crate::types::UserId;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;
use walk::{Collect, Filter, Walk, WalkOutcome};

/// Authorization resolver
///
/// Holds the read-only source registry and locator bindings. Cheap to clone
/// and safe to share across threads; every query keeps its traversal state
/// on its own stack.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<SourceRegistry>,
    locators: Arc<LocatorRegistry>,
    config: ResolverConfig,
}

impl Resolver {
    /// Create a resolver with the default configuration
    pub fn new(registry: SourceRegistry, locators: LocatorRegistry) -> Result<Self> {
        Self::with_config(registry, locators, ResolverConfig::default())
    }

    /// Create a resolver with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnboundLocator`] if an entity type declares a
    /// fixed-key direct-user source but no locator is bound for its
    /// `(role_type, locate_method)` pair.
    pub fn with_config(
        registry: SourceRegistry,
        locators: LocatorRegistry,
        config: ResolverConfig,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(registry), Arc::new(locators), config)
    }

    /// Create a resolver over already shared registries
    pub fn from_shared(
        registry: Arc<SourceRegistry>,
        locators: Arc<LocatorRegistry>,
        config: ResolverConfig,
    ) -> Result<Self> {
        for (entity_type, type_config) in registry.iter() {
            if type_config.uses_locator() && !locators.is_bound(type_config.locator()) {
                return Err(ConfigError::UnboundLocator {
                    entity_type: entity_type.to_string(),
                    role_type: type_config.locator().role_type.clone(),
                    locate_method: type_config.locator().locate_method.clone(),
                }
                .into());
            }
        }

        info!(
            entity_types = registry.len(),
            locators = locators.len(),
            short_circuit = config.short_circuit_check,
            max_depth = ?config.max_depth,
            "Resolver initialized"
        );

        Ok(Self {
            registry,
            locators,
            config,
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether `user` holds `permission` on `entity`
    pub fn check(
        &self,
        entity: &dyn Authorizable,
        user: &UserId,
        permission: &str,
    ) -> Result<bool> {
        let collect = if self.config.short_circuit_check {
            Collect::First
        } else {
            Collect::Roles
        };
        let outcome = self.walk(entity, user, Filter::Permission(permission), collect)?;
        let allowed = !outcome.roles.is_empty();

        debug!(
            entity = %entity.key(),
            user = %user,
            permission,
            allowed,
            visited = outcome.stats.entities_visited,
            "Authorization check"
        );
        Ok(allowed)
    }

    /// Distinct roles granting `permission` to `user` anywhere in the traversal
    pub fn granting_roles(
        &self,
        entity: &dyn Authorizable,
        user: &UserId,
        permission: &str,
    ) -> Result<RoleSet> {
        let outcome = self.walk(entity, user, Filter::Permission(permission), Collect::Roles)?;
        Ok(outcome.roles)
    }

    /// One entry per granting role occurrence, with the entities traversed
    /// to reach it
    pub fn granting_paths(
        &self,
        entity: &dyn Authorizable,
        user: &UserId,
        permission: &str,
    ) -> Result<Vec<GrantPath>> {
        let outcome = self.walk(entity, user, Filter::Permission(permission), Collect::Paths)?;
        Ok(outcome.grants)
    }

    /// Every distinct role `user` holds through `entity`, regardless of permission
    pub fn all_authorizations(&self, entity: &dyn Authorizable, user: &UserId) -> Result<RoleSet> {
        let outcome = self.walk(entity, user, Filter::Any, Collect::Roles)?;
        Ok(outcome.roles)
    }

    /// Path query packaged as an auditable decision
    pub fn explain(
        &self,
        entity: &dyn Authorizable,
        user: &UserId,
        permission: &str,
    ) -> Result<Decision> {
        let started = Instant::now();
        let evaluated_at = Utc::now();
        let outcome = self.walk(entity, user, Filter::Permission(permission), Collect::Paths)?;

        let decision = Decision {
            id: Uuid::new_v4(),
            entity: entity.key(),
            user: user.clone(),
            permission: permission.to_string(),
            allowed: !outcome.roles.is_empty(),
            roles: outcome.roles,
            grants: outcome.grants,
            stats: outcome.stats,
            evaluated_at,
            duration_us: started.elapsed().as_micros() as u64,
        };

        info!(
            decision_id = %decision.id,
            entity = %decision.entity,
            user = %decision.user,
            permission,
            allowed = decision.allowed,
            grants = decision.grants.len(),
            "Authorization explained"
        );
        Ok(decision)
    }

    fn walk(
        &self,
        entity: &dyn Authorizable,
        user: &UserId,
        filter: Filter<'_>,
        collect: Collect,
    ) -> Result<WalkOutcome> {
        Walk::new(&self.registry, &self.locators, &self.config, user, filter, collect).run(entity)
    }

    /// Traversal counters for an unfiltered walk, mainly for diagnostics
    pub fn stats(&self, entity: &dyn Authorizable, user: &UserId) -> Result<TraversalStats> {
        Ok(self.walk(entity, user, Filter::Any, Collect::Roles)?.stats)
    }
}
