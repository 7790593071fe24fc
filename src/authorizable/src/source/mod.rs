//! Source declarations
//!
//! Each authorizable entity type carries an ordered list of sources:
//!
//! - **DirectUser**: a user relation that grants a role when it matches the
//!   querying user. The role is either located by a fixed key or read from a
//!   role relation.
//! - **ParentSingle**: a zero-or-one parent whose authorization is inherited.
//! - **ParentMany**: a parent collection, optionally narrowed by a
//!   [`UserScope`] before recursion.

pub mod registry;
pub mod scope;
pub mod types;

pub use registry::{EntityTypeConfig, SourceRegistry, TypeDeclaration};
pub use scope::{OwnedBy, ScopeFn, ScopeTable, UserScope, UserScopeSpec};
pub use types::{RoleSpec, Source, SourceKind};
