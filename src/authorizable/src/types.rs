//! Core identity types

use crate::error::AuthzError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique role identifier
pub type RoleId = String;

/// Permission token checked for membership in a role
pub type Permission = String;

/// Identity of an authorizable entity
///
/// Two handles denote the same entity iff their keys are equal, regardless
/// of the attribute values they expose. This is the identity used for cycle
/// detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    /// Entity type name (e.g., "forum_thread")
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Identifier unique within the entity type
    pub id: String,
}

impl EntityKey {
    /// Create a new entity key
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

impl FromStr for EntityKey {
    type Err = AuthzError;

    /// Parse `type:id`. The id may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((entity_type, id)) if !entity_type.is_empty() && !id.is_empty() => {
                Ok(Self::new(entity_type, id))
            }
            _ => Err(AuthzError::InvalidInput(format!(
                "Expected entity key of the form type:id, got '{}'",
                s
            ))),
        }
    }
}

/// Opaque user identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_display_and_parse() {
        let key = EntityKey::new("forum_thread", "7");
        assert_eq!(key.to_string(), "forum_thread:7");

        let parsed: EntityKey = "forum_thread:7".parse().unwrap();
        assert_eq!(parsed, key);

        let nested: EntityKey = "doc:a:b".parse().unwrap();
        assert_eq!(nested.entity_type, "doc");
        assert_eq!(nested.id, "a:b");
    }

    #[test]
    fn test_entity_key_parse_errors() {
        assert!("forum".parse::<EntityKey>().is_err());
        assert!(":1".parse::<EntityKey>().is_err());
        assert!("forum:".parse::<EntityKey>().is_err());
    }

    #[test]
    fn test_user_id_serializes_transparently() {
        let user = UserId::new("matt");
        assert_eq!(serde_json::to_string(&user).unwrap(), "\"matt\"");
    }
}
