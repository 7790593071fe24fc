//! Resolver benchmarks
//!
//! Measures traversal cost against delegation depth and parent fan-out, and
//! the gap between a short-circuiting check and a full role collection.

use cretoai_authorizable::memory::{EntityRecord, MemoryGraph};
use cretoai_authorizable::{
    EntityKey, EntityRef, OwnedBy, Resolver, ResolverConfig, Role, RoleSpec, SourceRegistry,
    UserId,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

/// Chain `link:0 -> link:1 -> ... -> link:{depth}` with the grant at the far end
fn chain(depth: usize) -> (MemoryGraph, Resolver) {
    let graph = MemoryGraph::new();
    graph.add_role(Role::new("1", "Moderator", ["moderate", "edit"]));

    let records = (0..=depth).map(|i| {
        let next = (i < depth).then(|| EntityKey::new("link", (i + 1).to_string()));
        EntityRecord::new("link", i.to_string())
            .with_user("owner", (i == depth).then_some("alice"))
            .with_role("role", Some("1"))
            .with_parent("next", next)
    });
    let graph = graph.with_records(records.collect::<Vec<_>>()).unwrap();

    let mut registry = SourceRegistry::new();
    registry
        .entity("link")
        .belongs_to_user("owner", RoleSpec::relation("role"))
        .unwrap()
        .belongs_to_parent("next")
        .unwrap();
    let resolver = Resolver::new(registry, graph.locators()).unwrap();
    (graph, resolver)
}

/// Group with `members` memberships, the middle one held by alice
fn membership_group(
    members: usize,
    scoped: bool,
    config: ResolverConfig,
) -> (MemoryGraph, Resolver, EntityRef) {
    let graph = MemoryGraph::new();
    graph.add_role(Role::new("1", "Member", ["read"]));

    let mut records: Vec<EntityRecord> = (0..members)
        .map(|i| {
            let user = if i == members / 2 {
                "alice".to_string()
            } else {
                format!("user-{}", i)
            };
            EntityRecord::new("membership", i.to_string())
                .with_user("user", Some(user.as_str()))
                .with_role("role", Some("1"))
        })
        .collect();
    records.push(EntityRecord::new("group", "1").with_parents(
        "memberships",
        (0..members).map(|i| EntityKey::new("membership", i.to_string())).collect(),
    ));
    let graph = graph.with_records(records).unwrap();

    let mut registry = SourceRegistry::new();
    registry
        .entity("membership")
        .belongs_to_user("user", RoleSpec::relation("role"))
        .unwrap();
    if scoped {
        registry
            .entity("group")
            .has_many_parents_scoped("memberships", Arc::new(OwnedBy::new("user")))
            .unwrap();
    } else {
        registry.entity("group").has_many_parents("memberships").unwrap();
    }
    let resolver = Resolver::with_config(registry, graph.locators(), config).unwrap();
    let root = graph.get("group", "1").unwrap();
    (graph, resolver, root)
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");
    let user = UserId::new("alice");

    for depth in [1, 8, 64].iter() {
        let (graph, resolver) = chain(*depth);
        let root = graph.get("link", "0").unwrap();

        group.bench_with_input(BenchmarkId::new("check", depth), depth, |b, _| {
            b.iter(|| black_box(resolver.check(root.as_ref(), &user, "moderate").unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("granting_paths", depth), depth, |b, _| {
            b.iter(|| {
                black_box(
                    resolver
                        .granting_paths(root.as_ref(), &user, "moderate")
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_scoped_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoped_fan_out");
    let user = UserId::new("alice");

    for members in [10, 100, 1000].iter() {
        let (_graph, resolver, root) = membership_group(*members, true, ResolverConfig::default());

        group.bench_with_input(BenchmarkId::new("check", members), members, |b, _| {
            b.iter(|| black_box(resolver.check(root.as_ref(), &user, "read").unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("all_authorizations", members), members, |b, _| {
            b.iter(|| black_box(resolver.all_authorizations(root.as_ref(), &user).unwrap()));
        });
    }

    group.finish();
}

fn bench_short_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("short_circuit");
    let user = UserId::new("alice");

    for (label, short_circuit_check) in [("on", true), ("off", false)] {
        let config = ResolverConfig {
            short_circuit_check,
            ..Default::default()
        };
        let (_graph, resolver, root) = membership_group(1000, false, config);

        group.bench_function(label, |b| {
            b.iter(|| black_box(resolver.check(root.as_ref(), &user, "read").unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain_depth, bench_scoped_fan_out, bench_short_circuit);
criterion_main!(benches);
