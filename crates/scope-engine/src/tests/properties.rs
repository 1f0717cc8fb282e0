//! Query-level properties and the bulk cache workload.
//!
//! These tests verify that resolution:
//! - Returns identical results for identical inputs
//! - Treats union as a set operation
//! - Keeps the priority cache effective on realistic repeated workloads

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Map, Value};

use super::helpers::{engine, equip, fixture_gateway, sorted_ids};
use crate::ast::Node;
use crate::context::ContextBundle;
use crate::entity::{EntityId, InMemoryGateway, COVERAGE_COMPONENT};

const SLOTS: [&str; 5] = ["torso_upper", "torso_lower", "legs", "feet", "hands"];
const LAYERS: [&str; 3] = ["outer", "base", "underwear"];
const ACTORS: [&str; 4] = ["hero", "guard", "merchant", "beggar"];

// =============================================================================
// Query Strategies
// =============================================================================

fn leaf_query() -> impl Strategy<Value = Node> {
    let modes = prop::sample::select(vec![
        "topmost_clothing",
        "topmost_clothing_no_accessories",
        "all_clothing",
        "outer_clothing",
        "base_clothing",
        "underwear",
    ]);
    let slots = prop::sample::select(SLOTS.to_vec());
    prop_oneof![
        Just(Node::actor()),
        Just(Node::entities("core:actor")),
        Just(Node::actor().step("core:inventory").step("items")),
        modes.clone().prop_map(|mode| Node::actor().array_step(mode)),
        (modes, slots).prop_map(|(mode, slot)| Node::actor().step(mode).step(slot)),
    ]
}

fn query() -> impl Strategy<Value = Node> {
    leaf_query().prop_recursive(3, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(left, right)| Node::union(left, right)),
            inner.prop_map(|node| node.filter(json!({ "!!": [{ "var": "entity.id" }] }))),
        ]
    })
}

proptest! {
    #[test]
    fn resolution_is_idempotent(query in query(), actor in prop::sample::select(ACTORS.to_vec())) {
        let gateway = fixture_gateway();
        let engine = engine();
        let actor = EntityId::new(actor);
        let bundle = ContextBundle::new(&gateway);

        let first = engine.resolve(&query, &actor, &bundle).unwrap();
        let second = engine.resolve(&query, &actor, &bundle).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn union_is_commutative(
        left in query(),
        right in query(),
        actor in prop::sample::select(ACTORS.to_vec()),
    ) {
        let gateway = fixture_gateway();
        let engine = engine();
        let actor = EntityId::new(actor);
        let bundle = ContextBundle::new(&gateway);

        let ab = engine
            .resolve(&Node::union(left.clone(), right.clone()), &actor, &bundle)
            .unwrap();
        let ba = engine.resolve(&Node::union(right, left), &actor, &bundle).unwrap();
        prop_assert_eq!(sorted_ids(&ab), sorted_ids(&ba));
        prop_assert_eq!(ab.len(), ba.len());
    }

    #[test]
    fn union_with_self_adds_nothing(query in query()) {
        let gateway = fixture_gateway();
        let engine = engine();
        let actor = EntityId::new("hero");
        let bundle = ContextBundle::new(&gateway);

        let once = engine.resolve(&query, &actor, &bundle).unwrap();
        let twice = engine.resolve(&Node::union(query.clone(), query), &actor, &bundle).unwrap();
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Bulk Workload
// =============================================================================

/// Builds `count` actors wearing all three garment layers in five slots.
///
/// Items are drawn from a shared pool of patterns, a fifth of which declare
/// coverage of a neighbouring slot, so many actors wear the same items.
fn synthetic_gateway(seed: u64, count: usize) -> InMemoryGateway {
    const PATTERNS: usize = 12;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut gateway = InMemoryGateway::new();

    for (i, slot) in SLOTS.iter().enumerate() {
        let neighbour = SLOTS[(i + 1) % SLOTS.len()];
        for layer in LAYERS {
            for pattern in 0..PATTERNS {
                if rng.gen_bool(0.2) {
                    gateway.insert_component(
                        format!("{slot}_{layer}_{pattern}"),
                        COVERAGE_COMPONENT,
                        json!({ "covers": [neighbour], "coveragePriority": layer }),
                    );
                }
            }
        }
    }

    for n in 0..count {
        let mut equipped = Map::new();
        for slot in SLOTS {
            let layers: Map<String, Value> = LAYERS
                .iter()
                .map(|layer| {
                    let pattern = rng.gen_range(0..PATTERNS);
                    ((*layer).to_string(), json!(format!("{slot}_{layer}_{pattern}")))
                })
                .collect();
            equipped.insert(slot.to_string(), Value::Object(layers));
        }
        let actor = format!("npc_{n}");
        gateway.insert_component(actor.as_str(), "core:actor", json!({}));
        equip(&mut gateway, &actor, Value::Object(equipped));
    }
    gateway
}

#[test]
fn bulk_workload_keeps_cache_warm() {
    const ENTITIES: usize = 1_000;
    const ROUNDS: usize = 3;

    let gateway = synthetic_gateway(42, ENTITIES);
    let engine = engine();
    let bundle = ContextBundle::new(&gateway);
    let flatten = Node::actor().array_step("topmost_clothing");
    let per_slot: Vec<Node> = SLOTS
        .iter()
        .map(|slot| Node::actor().step("topmost_clothing").step(slot))
        .collect();

    let mut baseline = Vec::with_capacity(ENTITIES);
    for round in 0..ROUNDS {
        for n in 0..ENTITIES {
            let actor = EntityId::new(format!("npc_{n}"));
            let items = sorted_ids(&engine.resolve(&flatten, &actor, &bundle).unwrap());
            assert!(!items.is_empty());
            assert!(items.len() <= SLOTS.len());
            if round == 0 {
                baseline.push(items);
            } else {
                assert_eq!(items, baseline[n], "npc_{n} changed between rounds");
            }

            for query in &per_slot {
                let slot = engine.resolve(query, &actor, &bundle).unwrap();
                assert!(slot.len() <= 1);
            }
        }
    }

    let stats = engine.cache_stats();
    assert!(stats.hit_rate() > 0.7, "hit rate {:.3}", stats.hit_rate());
    assert!(stats.current_size <= stats.capacity);
}

#[test]
fn synthetic_world_is_reproducible() {
    assert_eq!(synthetic_gateway(7, 50), synthetic_gateway(7, 50));
    assert_ne!(synthetic_gateway(7, 50), synthetic_gateway(8, 50));
}
