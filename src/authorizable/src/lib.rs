//! # CretoAI Authorizable
//!
//! Declarative authorization resolution over an arbitrary entity graph.
//!
//! ## Features
//!
//! - **Declarative sources** per entity type: direct user relations carrying a
//!   role, single-parent and multi-parent delegation
//! - **Transitive resolution** with a per-call visited set for cycle safety
//! - **Four query shapes**: boolean check, granting roles, granting paths and
//!   all authorizations regardless of permission
//! - **Pluggable role locators** per entity type
//! - **Storage agnostic**: entities are read through the [`Authorizable`]
//!   adapter trait; [`memory::MemoryGraph`] ships as an in-memory backend
//!
//! ## Example
//!
//! ```rust
//! use cretoai_authorizable::memory::{EntityRecord, MemoryGraph};
//! use cretoai_authorizable::{EntityKey, Resolver, Role, RoleSpec, SourceRegistry, UserId};
//!
//! # fn main() -> cretoai_authorizable::Result<()> {
//! let graph = MemoryGraph::new();
//! graph.add_role(Role::new("2", "Thread Moderator", ["moderate"]));
//! let graph = graph.with_records(vec![
//!     EntityRecord::new("forum_thread", "1").with_user("moderator", Some("matt")),
//!     EntityRecord::new("post", "1")
//!         .with_user("owner", Some("dave"))
//!         .with_parent("forum_thread", Some(EntityKey::new("forum_thread", "1"))),
//! ])?;
//!
//! let mut registry = SourceRegistry::new();
//! registry
//!     .entity("forum_thread")
//!     .locate_with("Role", "find_by_name")
//!     .belongs_to_user("moderator", RoleSpec::fixed("Thread Moderator"))?;
//! registry
//!     .entity("post")
//!     .locate_with("Role", "find_by_name")
//!     .belongs_to_user("owner", RoleSpec::fixed("Post Owner"))?
//!     .belongs_to_parent("forum_thread")?;
//!
//! let resolver = Resolver::new(registry, graph.locators())?;
//! let post = graph.get("post", "1").expect("post exists");
//!
//! assert!(resolver.check(post.as_ref(), &UserId::new("matt"), "moderate")?);
//! assert!(!resolver.check(post.as_ref(), &UserId::new("dave"), "moderate")?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod locator;
pub mod memory;
pub mod resolver;
pub mod role;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use config::{EntityTypeDecl, RegistryConfig, ResolverConfig, SourceDecl};
pub use entity::{Authorizable, EntityRef};
pub use error::{AuthzError, ConfigError, RelationError, Result};
pub use locator::{LocatorConfig, LocatorRegistry, RoleLocator, RoleTable};
pub use resolver::{Decision, GrantPath, Resolver, TraversalStats};
pub use role::{Role, RoleSet};
pub use source::{
    OwnedBy, RoleSpec, ScopeFn, ScopeTable, Source, SourceKind, SourceRegistry, UserScope,
    UserScopeSpec,
};
pub use types::{EntityKey, Permission, RoleId, UserId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
