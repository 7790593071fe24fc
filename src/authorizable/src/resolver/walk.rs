//! Depth-first source traversal
//!
//! Every query shape runs the same walk and differs only in what a grant
//! does: stop the walk, join a role set, or record a path.

use super::context::{Path, VisitedSet};
use super::types::{GrantPath, TraversalStats};
use crate::config::ResolverConfig;
use crate::entity::Authorizable;
use crate::error::{AuthzError, ConfigError, Result};
use crate::locator::LocatorRegistry;
use crate::role::{Role, RoleSet};
use crate::source::{RoleSpec, Source, SourceRegistry};
use crate::types::{EntityKey, UserId};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, trace};

/// Which resolved roles count as grants
#[derive(Debug, Clone, Copy)]
pub(crate) enum Filter<'p> {
    /// Roles allowing the permission
    Permission(&'p str),

    /// Every resolved role
    Any,
}

/// What the walk keeps for each grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collect {
    /// Stop at the first grant
    First,

    /// Distinct roles
    Roles,

    /// Distinct roles plus one path per grant
    Paths,
}

/// Everything a finished walk produced
#[derive(Debug, Default)]
pub(crate) struct WalkOutcome {
    pub(crate) roles: RoleSet,
    pub(crate) grants: Vec<GrantPath>,
    pub(crate) stats: TraversalStats,
}

type Flow = ControlFlow<()>;

pub(crate) struct Walk<'a> {
    registry: &'a SourceRegistry,
    locators: &'a LocatorRegistry,
    config: &'a ResolverConfig,
    user: &'a UserId,
    filter: Filter<'a>,
    collect: Collect,
    visited: VisitedSet,
    path: Path,
    depth: usize,
    outcome: WalkOutcome,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(
        registry: &'a SourceRegistry,
        locators: &'a LocatorRegistry,
        config: &'a ResolverConfig,
        user: &'a UserId,
        filter: Filter<'a>,
        collect: Collect,
    ) -> Self {
        Self {
            registry,
            locators,
            config,
            user,
            filter,
            collect,
            visited: VisitedSet::new(),
            path: Path::new(),
            depth: 0,
            outcome: WalkOutcome::default(),
        }
    }

    /// Walk from `root`, consuming the walk
    pub(crate) fn run(mut self, root: &dyn Authorizable) -> Result<WalkOutcome> {
        if self.visit(root)?.is_break() {
            trace!(root = %root.key(), "Walk stopped at first grant");
        }
        debug_assert_eq!(self.visited.len(), self.outcome.stats.entities_visited);
        Ok(self.outcome)
    }

    fn visit(&mut self, entity: &dyn Authorizable) -> Result<Flow> {
        let key = entity.key();

        if !self.visited.insert(key.clone()) {
            trace!(entity = %key, "Already visited, skipping");
            self.outcome.stats.cycles_skipped += 1;
            return Ok(ControlFlow::Continue(()));
        }
        self.outcome.stats.entities_visited += 1;

        let registry = self.registry;
        let sources = registry.sources(&key.entity_type)?;

        if let Some(limit) = self.config.max_depth {
            if self.depth > limit {
                return Err(AuthzError::DepthExceeded { limit, entity: key });
            }
        }

        trace!(entity = %key, depth = self.depth, sources = sources.len(), "Visiting");

        let tracks_path = self.collect == Collect::Paths;
        if tracks_path {
            self.path.push(key.clone());
        }
        let flow = self.visit_sources(entity, &key, sources);
        if tracks_path {
            self.path.pop();
        }
        flow
    }

    fn visit_sources(
        &mut self,
        entity: &dyn Authorizable,
        key: &EntityKey,
        sources: &[Source],
    ) -> Result<Flow> {
        for source in sources {
            self.outcome.stats.sources_evaluated += 1;

            let flow = match source {
                Source::DirectUser { user_relation, role } => {
                    self.direct_user(entity, key, user_relation, role)?
                }
                Source::ParentSingle { relation } => match entity.parent(relation)? {
                    Some(parent) => self.descend(parent.as_ref())?,
                    None => ControlFlow::Continue(()),
                },
                Source::ParentMany { relation, user_scope } => {
                    let mut parents = entity.parents(relation)?;
                    if let Some(scope) = user_scope {
                        let before = parents.len();
                        parents = scope.narrow(parents, self.user)?;
                        trace!(
                            entity = %key,
                            relation = relation.as_str(),
                            scope = scope.name(),
                            before,
                            after = parents.len(),
                            "Narrowed parents"
                        );
                    }

                    let mut flow = ControlFlow::Continue(());
                    for parent in &parents {
                        flow = self.descend(parent.as_ref())?;
                        if flow.is_break() {
                            break;
                        }
                    }
                    flow
                }
            };

            if flow.is_break() {
                return Ok(flow);
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn descend(&mut self, parent: &dyn Authorizable) -> Result<Flow> {
        self.depth += 1;
        let flow = self.visit(parent);
        self.depth -= 1;
        flow
    }

    fn direct_user(
        &mut self,
        entity: &dyn Authorizable,
        key: &EntityKey,
        user_relation: &str,
        spec: &RoleSpec,
    ) -> Result<Flow> {
        if entity.user(user_relation)?.as_ref() != Some(self.user) {
            return Ok(ControlFlow::Continue(()));
        }

        let role = match spec {
            RoleSpec::Relation(relation) => entity.role(relation)?,
            RoleSpec::Fixed(role_key) => self.locate(&key.entity_type, role_key)?,
        };

        let Some(role) = role else {
            debug!(entity = %key, user = %self.user, relation = user_relation, "Role lookup miss");
            self.outcome.stats.role_misses += 1;
            return Ok(ControlFlow::Continue(()));
        };

        if let Filter::Permission(permission) = self.filter {
            if !role.allows(permission) {
                return Ok(ControlFlow::Continue(()));
            }
        }

        trace!(entity = %key, role = %role.name, "Grant");
        Ok(self.record(role))
    }

    fn locate(&self, entity_type: &str, role_key: &str) -> Result<Option<Arc<Role>>> {
        let config = self.registry.locator_config(entity_type)?;
        let locator = self
            .locators
            .get(config)
            .ok_or_else(|| ConfigError::UnboundLocator {
                entity_type: entity_type.to_string(),
                role_type: config.role_type.clone(),
                locate_method: config.locate_method.clone(),
            })?;
        Ok(locator.locate(role_key)?)
    }

    fn record(&mut self, role: Arc<Role>) -> Flow {
        match self.collect {
            Collect::First => {
                self.outcome.roles.insert(role);
                ControlFlow::Break(())
            }
            Collect::Roles => {
                self.outcome.roles.insert(role);
                ControlFlow::Continue(())
            }
            Collect::Paths => {
                self.outcome.grants.push(GrantPath {
                    path: self.path.snapshot(),
                    role: Arc::clone(&role),
                });
                self.outcome.roles.insert(role);
                ControlFlow::Continue(())
            }
        }
    }
}
