//! Per entity type source registry
//!
//! The registry is populated once at setup and read-only afterwards. It is
//! shared with the resolver behind an `Arc`; mutation after queries start
//! requires building a new resolver.

use super::scope::{ScopeTable, UserScope};
use super::types::{RoleSpec, Source, SourceKind};
use crate::config::RegistryConfig;
use crate::error::ConfigError;
use crate::locator::LocatorConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Authorization configuration of one entity type
#[derive(Debug, Clone, Default)]
pub struct EntityTypeConfig {
    locator: LocatorConfig,
    sources: Vec<Source>,
}

impl EntityTypeConfig {
    pub fn locator(&self) -> &LocatorConfig {
        &self.locator
    }

    /// Sources in declaration order
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Whether any source needs the role locator
    pub fn uses_locator(&self) -> bool {
        self.sources.iter().any(|s| {
            matches!(
                s,
                Source::DirectUser {
                    role: RoleSpec::Fixed(_),
                    ..
                }
            )
        })
    }
}

/// Ordered source lists keyed by entity type
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    types: HashMap<String, EntityTypeConfig>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an entity type as authorizable with the given locator options
    ///
    /// Any sources previously declared for the type are discarded.
    pub fn register_type(
        &mut self,
        entity_type: impl Into<String>,
        locator: LocatorConfig,
    ) -> &mut Self {
        let entity_type = entity_type.into();
        info!(entity_type = %entity_type, locator = %locator, "Registered authorizable type");
        self.types.insert(
            entity_type,
            EntityTypeConfig {
                locator,
                sources: Vec::new(),
            },
        );
        self
    }

    /// Validate a source and append it to the type's source list
    ///
    /// Unregistered types are registered with the default locator.
    pub fn declare(&mut self, entity_type: &str, source: Source) -> Result<(), ConfigError> {
        source.validate()?;

        debug!(
            entity_type,
            kind = %source.kind(),
            relation = source.relation(),
            "Declared authorization source"
        );
        self.types
            .entry(entity_type.to_string())
            .or_default()
            .sources
            .push(source);
        Ok(())
    }

    /// Start a fluent declaration for an entity type
    pub fn entity(&mut self, entity_type: impl Into<String>) -> TypeDeclaration<'_> {
        let entity_type = entity_type.into();
        self.types.entry(entity_type.clone()).or_default();
        TypeDeclaration {
            registry: self,
            entity_type,
        }
    }

    pub fn get(&self, entity_type: &str) -> Option<&EntityTypeConfig> {
        self.types.get(entity_type)
    }

    /// Sources of an entity type
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSources`] for unregistered types and for
    /// types with an empty source list.
    pub fn sources(&self, entity_type: &str) -> Result<&[Source], ConfigError> {
        match self.types.get(entity_type) {
            Some(config) if !config.sources.is_empty() => Ok(&config.sources),
            _ => Err(ConfigError::NoSources(entity_type.to_string())),
        }
    }

    pub fn locator_config(&self, entity_type: &str) -> Result<&LocatorConfig, ConfigError> {
        self.types
            .get(entity_type)
            .map(EntityTypeConfig::locator)
            .ok_or_else(|| ConfigError::UnknownEntityType(entity_type.to_string()))
    }

    /// Registered entity type names, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityTypeConfig)> {
        self.types.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Build a registry from declarative configuration
    pub fn from_config(config: &RegistryConfig, scopes: &ScopeTable) -> Result<Self, ConfigError> {
        let mut registry = SourceRegistry::new();

        for (entity_type, decl) in config {
            registry.register_type(entity_type.clone(), decl.role_locator.clone());
            for source in &decl.sources {
                registry.declare(entity_type, source.build(scopes)?)?;
            }
        }

        Ok(registry)
    }

    /// Count of declared sources of one kind across all types
    pub fn count_kind(&self, kind: SourceKind) -> usize {
        self.types
            .values()
            .flat_map(|t| t.sources.iter())
            .filter(|s| s.kind() == kind)
            .count()
    }
}

/// Fluent declaration of one entity type's sources
///
/// ```
/// use cretoai_authorizable::{RoleSpec, SourceRegistry};
///
/// # fn main() -> Result<(), cretoai_authorizable::ConfigError> {
/// let mut registry = SourceRegistry::new();
/// registry
///     .entity("post")
///     .locate_with("Role", "find_by_name")
///     .belongs_to_user("owner", RoleSpec::fixed("Post Owner"))?
///     .belongs_to_parent("forum_thread")?;
///
/// assert_eq!(registry.sources("post")?.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct TypeDeclaration<'a> {
    registry: &'a mut SourceRegistry,
    entity_type: String,
}

impl<'a> TypeDeclaration<'a> {
    /// Set the role locator options, keeping declared sources
    pub fn locate_with(
        self,
        role_type: impl Into<String>,
        locate_method: impl Into<String>,
    ) -> Self {
        if let Some(config) = self.registry.types.get_mut(&self.entity_type) {
            config.locator = LocatorConfig::new(role_type, locate_method);
        }
        self
    }

    /// Grant a role when the user relation equals the querying user
    pub fn belongs_to_user(
        self,
        user_relation: impl Into<String>,
        role: RoleSpec,
    ) -> Result<Self, ConfigError> {
        self.source(Source::direct_user(user_relation, role))
    }

    /// Delegate to a belongs-to parent
    pub fn belongs_to_parent(self, relation: impl Into<String>) -> Result<Self, ConfigError> {
        self.source(Source::parent(relation))
    }

    /// Delegate to a has-one parent
    pub fn has_one_parent(self, relation: impl Into<String>) -> Result<Self, ConfigError> {
        self.belongs_to_parent(relation)
    }

    /// Delegate to every parent in a collection
    pub fn has_many_parents(self, relation: impl Into<String>) -> Result<Self, ConfigError> {
        self.source(Source::parents(relation))
    }

    /// Delegate to the parents in a collection that `scope` keeps for the user
    pub fn has_many_parents_scoped(
        self,
        relation: impl Into<String>,
        scope: Arc<dyn UserScope>,
    ) -> Result<Self, ConfigError> {
        self.source(Source::scoped_parents(relation, scope))
    }

    pub fn source(self, source: Source) -> Result<Self, ConfigError> {
        self.registry.declare(&self.entity_type, source)?;
        Ok(self)
    }
}
