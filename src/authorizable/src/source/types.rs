//! Source definitions
//!
//! A source is one way an entity type proves authorization: a user relation
//! carrying a role, a single parent to delegate to, or a collection of
//! parents to delegate to.

use super::scope::UserScope;
use crate::error::ConfigError;
use std::fmt;
use std::sync::Arc;

/// How a direct-user source obtains its role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSpec {
    /// Fixed key handed to the entity type's role locator
    Fixed(String),

    /// Relation on the entity yielding the role directly
    Relation(String),
}

impl RoleSpec {
    /// Build a role spec from the two optional declaration fields
    ///
    /// Exactly one of `role` and `role_relation` must be set.
    pub fn from_options(
        user_relation: &str,
        role: Option<String>,
        role_relation: Option<String>,
    ) -> Result<Self, ConfigError> {
        match (role, role_relation) {
            (Some(role), None) => Ok(RoleSpec::Fixed(role)),
            (None, Some(relation)) => Ok(RoleSpec::Relation(relation)),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingRoleSpec {
                user_relation: user_relation.to_string(),
            }),
            (None, None) => Err(ConfigError::MissingRoleSpec {
                user_relation: user_relation.to_string(),
            }),
        }
    }

    pub fn fixed(key: impl Into<String>) -> Self {
        RoleSpec::Fixed(key.into())
    }

    pub fn relation(relation: impl Into<String>) -> Self {
        RoleSpec::Relation(relation.into())
    }

    /// The fixed role key, if any
    pub fn fixed_key(&self) -> Option<&str> {
        match self {
            RoleSpec::Fixed(key) => Some(key),
            RoleSpec::Relation(_) => None,
        }
    }

    /// The role relation name, if any
    pub fn relation_name(&self) -> Option<&str> {
        match self {
            RoleSpec::Fixed(_) => None,
            RoleSpec::Relation(relation) => Some(relation),
        }
    }
}

/// Source variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    DirectUser,
    ParentSingle,
    ParentMany,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::DirectUser => "direct user",
            SourceKind::ParentSingle => "parent",
            SourceKind::ParentMany => "many parents",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative authorization rule attached to an entity type
#[derive(Debug, Clone)]
pub enum Source {
    /// The entity's user relation, when it equals the querying user,
    /// grants the role named by `role`
    DirectUser { user_relation: String, role: RoleSpec },

    /// Delegate to a zero-or-one parent
    ParentSingle { relation: String },

    /// Delegate to every parent in a collection, optionally narrowed to
    /// the querying user first
    ParentMany {
        relation: String,
        user_scope: Option<Arc<dyn UserScope>>,
    },
}

impl Source {
    pub fn direct_user(user_relation: impl Into<String>, role: RoleSpec) -> Self {
        Source::DirectUser {
            user_relation: user_relation.into(),
            role,
        }
    }

    pub fn parent(relation: impl Into<String>) -> Self {
        Source::ParentSingle {
            relation: relation.into(),
        }
    }

    pub fn parents(relation: impl Into<String>) -> Self {
        Source::ParentMany {
            relation: relation.into(),
            user_scope: None,
        }
    }

    pub fn scoped_parents(relation: impl Into<String>, scope: Arc<dyn UserScope>) -> Self {
        Source::ParentMany {
            relation: relation.into(),
            user_scope: Some(scope),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::DirectUser { .. } => SourceKind::DirectUser,
            Source::ParentSingle { .. } => SourceKind::ParentSingle,
            Source::ParentMany { .. } => SourceKind::ParentMany,
        }
    }

    /// The user relation for direct-user sources, the parent relation otherwise
    pub fn relation(&self) -> &str {
        match self {
            Source::DirectUser { user_relation, .. } => user_relation,
            Source::ParentSingle { relation } => relation,
            Source::ParentMany { relation, .. } => relation,
        }
    }

    /// Name of the user scope narrowing a parent collection
    pub fn user_scope_name(&self) -> Option<&str> {
        match self {
            Source::ParentMany {
                user_scope: Some(scope),
                ..
            } => Some(scope.name()),
            _ => None,
        }
    }

    /// Validate the source definition
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relation().is_empty() {
            return Err(ConfigError::EmptyRelation {
                kind: self.kind().as_str(),
            });
        }

        if let Source::DirectUser { user_relation, role } = self {
            match role {
                RoleSpec::Fixed(key) if key.is_empty() => {
                    return Err(ConfigError::MissingRoleSpec {
                        user_relation: user_relation.clone(),
                    });
                }
                RoleSpec::Relation(relation) if relation.is_empty() => {
                    return Err(ConfigError::EmptyRelation { kind: "role" });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_spec_exactly_one() {
        assert_eq!(
            RoleSpec::from_options("owner", Some("Post Owner".into()), None).unwrap(),
            RoleSpec::fixed("Post Owner")
        );
        assert_eq!(
            RoleSpec::from_options("user", None, Some("role".into())).unwrap(),
            RoleSpec::relation("role")
        );

        assert!(matches!(
            RoleSpec::from_options("user", Some("a".into()), Some("role".into())),
            Err(ConfigError::ConflictingRoleSpec { .. })
        ));
        assert!(matches!(
            RoleSpec::from_options("user", None, None),
            Err(ConfigError::MissingRoleSpec { .. })
        ));
    }

    #[test]
    fn test_source_validation() {
        assert!(Source::direct_user("owner", RoleSpec::fixed("Post Owner")).validate().is_ok());
        assert!(Source::parent("forum").validate().is_ok());
        assert!(Source::parents("forum_memberships").validate().is_ok());

        assert_eq!(
            Source::parent("").validate(),
            Err(ConfigError::EmptyRelation { kind: "parent" })
        );
        assert_eq!(
            Source::parents("").validate(),
            Err(ConfigError::EmptyRelation { kind: "many parents" })
        );
        assert_eq!(
            Source::direct_user("", RoleSpec::fixed("x")).validate(),
            Err(ConfigError::EmptyRelation { kind: "direct user" })
        );
        assert!(matches!(
            Source::direct_user("owner", RoleSpec::fixed("")).validate(),
            Err(ConfigError::MissingRoleSpec { .. })
        ));
        assert_eq!(
            Source::direct_user("owner", RoleSpec::relation("")).validate(),
            Err(ConfigError::EmptyRelation { kind: "role" })
        );
    }

    #[test]
    fn test_source_accessors() {
        let source = Source::direct_user("user", RoleSpec::relation("role"));
        assert_eq!(source.kind(), SourceKind::DirectUser);
        assert_eq!(source.relation(), "user");
        assert!(source.user_scope_name().is_none());

        if let Source::DirectUser { role, .. } = &source {
            assert_eq!(role.relation_name(), Some("role"));
            assert_eq!(role.fixed_key(), None);
        }
    }
}
