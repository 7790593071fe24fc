//! # Authorization Check CLI
//!
//! Loads a JSON graph fixture and answers one query against it.
//!
//! ## Usage
//!
//! ```text
//! authz-check --fixture <fixture.json> <entity_type:id> <user> [permission]
//! ```
//!
//! With a permission, prints the explained decision as JSON and exits with
//! status 1 when access is denied. Without one, prints every role the user
//! holds through the entity.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `AUTHZ_FIXTURE` - Fixture path when `--fixture` is not given
//! - `RUST_LOG` - Log level (default: info)

use anyhow::Context;
use clap::Parser;
use cretoai_authorizable::memory::GraphFixture;
use cretoai_authorizable::{EntityKey, OwnedBy, Resolver, ScopeTable, UserId};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Authorization check against a graph fixture
#[derive(Debug, Parser)]
#[command(name = "authz-check")]
#[command(about = "Resolve a user's permission on an entity from a JSON graph fixture")]
#[command(version)]
struct Cli {
    /// Path to the graph fixture
    #[arg(short, long, env = "AUTHZ_FIXTURE")]
    fixture: PathBuf,

    /// Entity to check, as `type:id`
    entity: EntityKey,

    /// User identifier
    user: String,

    /// Permission to check; lists every held role when omitted
    permission: Option<String>,
}

/// Named scopes available to fixtures
fn scope_table() -> ScopeTable {
    let mut scopes = ScopeTable::new();
    scopes.register_as("with_user", Arc::new(OwnedBy::new("user")));
    scopes
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let fixture = GraphFixture::from_path(&cli.fixture)
        .with_context(|| format!("failed to load fixture {}", cli.fixture.display()))?;
    let graph = fixture.graph().context("failed to build entity graph")?;
    let registry = fixture
        .registry(&scope_table())
        .context("invalid type declarations")?;
    let resolver = Resolver::new(registry, graph.locators())?;

    let entity = graph
        .entity(&cli.entity)
        .with_context(|| format!("entity {} not found in fixture", cli.entity))?;
    let user = UserId::new(cli.user.as_str());

    match &cli.permission {
        Some(permission) => {
            let decision = resolver.explain(entity.as_ref(), &user, permission)?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(decision.allowed)
        }
        None => {
            let roles = resolver.all_authorizations(entity.as_ref(), &user)?;
            println!("{}", serde_json::to_string_pretty(&roles)?);
            Ok(!roles.is_empty())
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("authz-check v{}", cretoai_authorizable::VERSION);
    info!(
        fixture = %cli.fixture.display(),
        entity = %cli.entity,
        user = %cli.user,
        permission = ?cli.permission,
        "Running query"
    );

    if run(&cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
