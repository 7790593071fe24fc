//! Integration tests for authorization resolution over the forum fixture
//!
//! Covers the membership/forum/thread/post hierarchy loaded from JSON,
//! declarative type configuration, and the fixture-driven query surface.

use cretoai_authorizable::memory::{GraphFixture, MemoryGraph};
use cretoai_authorizable::{
    AuthzError, ConfigError, EntityKey, EntityRef, OwnedBy, RegistryConfig, Resolver, ScopeTable,
    SourceKind, SourceRegistry, UserId,
};
use std::sync::Arc;

const FORUM_FIXTURE: &str = include_str!("fixtures/forum.json");

struct Forum {
    graph: MemoryGraph,
    resolver: Resolver,
}

impl Forum {
    fn load() -> Self {
        let fixture = GraphFixture::from_json(FORUM_FIXTURE).expect("fixture parses");
        let graph = fixture.graph().expect("fixture graph builds");
        let registry = fixture.registry(&ScopeTable::new()).expect("fixture types are valid");
        let resolver = Resolver::new(registry, graph.locators()).expect("locators bound");
        Self { graph, resolver }
    }

    fn entity(&self, entity_type: &str, id: &str) -> EntityRef {
        self.graph
            .get(entity_type, id)
            .unwrap_or_else(|| panic!("{}:{} in fixture", entity_type, id))
    }

    fn check(&self, entity_type: &str, id: &str, user: &str, permission: &str) -> bool {
        let entity = self.entity(entity_type, id);
        self.resolver
            .check(entity.as_ref(), &UserId::new(user), permission)
            .expect("check succeeds")
    }
}

#[test]
fn test_fixture_registry_shape() {
    let fixture = GraphFixture::from_json(FORUM_FIXTURE).unwrap();
    let registry = fixture.registry(&ScopeTable::new()).unwrap();

    assert_eq!(
        registry.entity_types(),
        vec!["forum", "forum_membership", "forum_thread", "post"]
    );

    let post = registry.sources("post").unwrap();
    assert_eq!(post.len(), 2);
    assert_eq!(post[0].kind(), SourceKind::DirectUser);
    assert_eq!(post[1].kind(), SourceKind::ParentSingle);

    let forum = registry.sources("forum").unwrap();
    assert_eq!(forum[0].kind(), SourceKind::ParentMany);
    assert_eq!(forum[0].user_scope_name(), Some("owned_by:user"));

    assert_eq!(registry.locator_config("forum_thread").unwrap().locate_method, "find_by_name");
}

#[test]
fn test_membership_direct_user() {
    let forum = Forum::load();

    assert!(forum.check("forum_membership", "1", "matt", "moderate"));
    assert!(!forum.check("forum_membership", "2", "dave", "moderate"));
    assert!(forum.check("forum_membership", "2", "dave", "read"));

    // Only the membership's own user matches
    assert!(!forum.check("forum_membership", "1", "dave", "moderate"));
}

#[test]
fn test_forum_scoped_memberships() {
    let forum = Forum::load();

    assert!(forum.check("forum", "1", "matt", "moderate"));
    assert!(!forum.check("forum", "1", "dave", "moderate"));
    assert!(forum.check("forum", "1", "dave", "post"));
    assert!(!forum.check("forum", "1", "erin", "read"));
}

#[test]
fn test_thread_moderator_or_forum() {
    let forum = Forum::load();

    // Thread 1 has no moderator; only forum moderators qualify
    assert!(forum.check("forum_thread", "1", "matt", "moderate"));
    assert!(!forum.check("forum_thread", "1", "dave", "moderate"));

    // Thread 2 is moderated by dave
    assert!(forum.check("forum_thread", "2", "dave", "moderate"));
    assert!(forum.check("forum_thread", "2", "matt", "moderate"));
}

#[test]
fn test_post_delegation() {
    let forum = Forum::load();

    // Non-owner, non-moderator
    assert!(!forum.check("post", "4", "nobody", "moderate"));
    // Owner without a moderating role anywhere
    assert!(!forum.check("post", "4", "erin", "moderate"));
    assert!(forum.check("post", "4", "erin", "owns"));

    // Two hops through the thread moderator
    assert!(forum.check("post", "4", "dave", "moderate"));
    // Three hops through the forum membership
    assert!(forum.check("post", "4", "matt", "moderate"));

    // dave owns post 1 but does not moderate its thread
    assert!(!forum.check("post", "1", "dave", "moderate"));
    assert!(forum.check("post", "1", "dave", "edit"));
}

#[test]
fn test_all_authorizations_deduplicated_union() {
    let forum = Forum::load();
    let post = forum.entity("post", "3");

    let roles = forum
        .resolver
        .all_authorizations(post.as_ref(), &UserId::new("dave"))
        .unwrap();
    assert_eq!(
        roles.names(),
        vec!["Forum Member", "Thread Moderator", "Post Owner"]
    );

    let none = forum
        .resolver
        .all_authorizations(post.as_ref(), &UserId::new("erin"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_granting_paths_through_hierarchy() {
    let forum = Forum::load();
    let post = forum.entity("post", "2");

    let paths = forum
        .resolver
        .granting_paths(post.as_ref(), &UserId::new("matt"), "edit")
        .unwrap();

    let described: Vec<(String, usize)> = paths
        .iter()
        .map(|grant| (grant.role.name.clone(), grant.hops()))
        .collect();
    assert_eq!(
        described,
        vec![("Post Owner".to_string(), 0), ("Forum Moderator".to_string(), 3)]
    );
    assert_eq!(
        paths[1].granted_by(),
        Some(&EntityKey::new("forum_membership", "1"))
    );
}

#[test]
fn test_explain_serializes() {
    let forum = Forum::load();
    let thread = forum.entity("forum_thread", "2");

    let decision = forum
        .resolver
        .explain(thread.as_ref(), &UserId::new("dave"), "moderate")
        .unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.grants.len(), 1);

    let json = serde_json::to_string(&decision).unwrap();
    assert!(json.contains("\"Thread Moderator\""));
    assert!(json.contains("\"evaluated_at\""));
}

#[test]
fn test_named_scope_from_table() {
    let fixture = GraphFixture::from_json(FORUM_FIXTURE).unwrap();
    let mut types: RegistryConfig = fixture.types.clone();
    let forum_decl = serde_json::json!({
        "sources": [
            { "type": "many_parents", "relation": "forum_memberships",
              "user_scope": { "named": "with_user" } }
        ]
    });
    types.insert("forum".to_string(), serde_json::from_value(forum_decl).unwrap());

    let mut scopes = ScopeTable::new();
    scopes.register_as("with_user", Arc::new(OwnedBy::new("user")));
    let registry = SourceRegistry::from_config(&types, &scopes).unwrap();

    let graph = fixture.graph().unwrap();
    let resolver = Resolver::new(registry, graph.locators()).unwrap();
    let forum = graph.get("forum", "1").unwrap();

    assert!(resolver.check(forum.as_ref(), &UserId::new("matt"), "moderate").unwrap());
    assert!(!resolver.check(forum.as_ref(), &UserId::new("dave"), "moderate").unwrap());

    // Unregistered names are rejected at load time
    let err = SourceRegistry::from_config(&types, &ScopeTable::new()).unwrap_err();
    assert_eq!(err, ConfigError::UnknownScope("with_user".to_string()));
}

#[test]
fn test_conflicting_role_declaration_rejected() {
    let json = r#"{
        "membership": {
            "sources": [
                { "type": "direct_user", "user": "user", "role": "Owner", "role_relation": "role" }
            ]
        }
    }"#;
    let types: RegistryConfig = serde_json::from_str(json).unwrap();

    let err = SourceRegistry::from_config(&types, &ScopeTable::new()).unwrap_err();
    assert!(matches!(err, ConfigError::ConflictingRoleSpec { .. }));
}

#[test]
fn test_missing_role_declaration_rejected() {
    let json = r#"{
        "membership": {
            "sources": [ { "type": "direct_user", "user": "user" } ]
        }
    }"#;
    let types: RegistryConfig = serde_json::from_str(json).unwrap();

    let err = SourceRegistry::from_config(&types, &ScopeTable::new()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingRoleSpec { .. }));
}

#[test]
fn test_undeclared_entity_type() {
    let forum = Forum::load();
    let graph = forum
        .graph
        .clone()
        .with_records(vec![cretoai_authorizable::memory::EntityRecord::new("badge", "1")])
        .unwrap();
    let badge = graph.get("badge", "1").unwrap();

    let err = forum
        .resolver
        .all_authorizations(badge.as_ref(), &UserId::new("matt"))
        .unwrap_err();
    assert!(matches!(err, AuthzError::Config(ConfigError::NoSources(ref t)) if t == "badge"));
}
