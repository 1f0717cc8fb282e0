//! Fixture entities and engine factories shared by the test modules.

use serde_json::json;

use crate::candidate::ScopeResult;
use crate::engine::ScopeEngine;
use crate::entity::{EntityId, InMemoryGateway, COVERAGE_COMPONENT, EQUIPMENT_COMPONENT};

// =============================================================================
// Fixture World
// =============================================================================

/// Builds the standard fixture:
///
/// | Entity | Notes |
/// |--------|-------|
/// | `hero` | jacket / pants / boots on outer layers, inventory, level 7 |
/// | `guard` | shirt on the base torso layer, level 3 |
/// | `merchant` | trousers covering `torso_lower` over a boxer brief |
/// | `beggar` | an actor with no equipment |
/// | `tavern` | a location |
///
/// Every worn item and inventory entry carries `core:item`.
pub fn fixture_gateway() -> InMemoryGateway {
    let mut gateway = InMemoryGateway::new();

    gateway.insert_component("hero", "core:actor", json!({}));
    gateway.insert_component("hero", "core:name", json!({ "text": "Ayla" }));
    gateway.insert_component("hero", "core:inventory", json!({ "items": ["sword", "potion"] }));
    gateway.insert_component("hero", "core:stats", json!({ "level": 7 }));
    equip(
        &mut gateway,
        "hero",
        json!({
            "torso_upper": { "outer": "jacket" },
            "legs": { "outer": "pants" },
            "feet": { "outer": "boots" },
        }),
    );

    gateway.insert_component("guard", "core:actor", json!({}));
    gateway.insert_component("guard", "core:stats", json!({ "level": 3 }));
    equip(&mut gateway, "guard", json!({ "torso_upper": { "base": "shirt" } }));

    gateway.insert_component("merchant", "core:actor", json!({}));
    equip(
        &mut gateway,
        "merchant",
        json!({
            "legs": { "outer": "trousers" },
            "torso_lower": { "underwear": "boxer_brief" },
        }),
    );
    gateway.insert_component(
        "trousers",
        COVERAGE_COMPONENT,
        json!({ "covers": ["torso_lower"], "coveragePriority": "outer" }),
    );

    gateway.insert_component("beggar", "core:actor", json!({}));
    gateway.insert_component("tavern", "core:location", json!({ "name": "The Drowned Rat" }));

    for item in ["jacket", "pants", "boots", "shirt", "trousers", "boxer_brief"] {
        gateway.insert_component(item, "core:item", json!({ "weight": 2 }));
    }
    gateway.insert_component("sword", "core:item", json!({ "weight": 5 }));
    gateway.insert_component("potion", "core:item", json!({ "weight": 1 }));

    gateway
}

/// Sets an entity's `clothing:equipment.equipped` map.
pub fn equip(gateway: &mut InMemoryGateway, entity: &str, equipped: serde_json::Value) {
    gateway.insert_component(entity, EQUIPMENT_COMPONENT, json!({ "equipped": equipped }));
}

/// Creates an engine with the default configuration.
pub fn engine() -> ScopeEngine {
    ScopeEngine::new()
}

// =============================================================================
// Assertions
// =============================================================================

/// Returns the entity ids of a result, sorted for order-insensitive checks.
pub fn sorted_ids(result: &ScopeResult) -> Vec<String> {
    let mut ids: Vec<String> = result.entities().map(EntityId::to_string).collect();
    ids.sort();
    ids
}

/// Installs a test-writer subscriber so `tracing` output shows up in failing
/// tests. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
