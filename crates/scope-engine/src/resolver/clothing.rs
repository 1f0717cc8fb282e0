//! Reserved clothing-mode steps.
//!
//! `topmost_clothing`, `topmost_clothing_no_accessories`, `all_clothing`,
//! `outer_clothing`, `base_clothing` and `underwear` are not components:
//! they select a view of the entity's worn items.
//!
//! - `actor.topmost_clothing[]` flattens every visible item of every slot
//! - `actor.topmost_clothing` yields a slot access descriptor that the next
//!   step (`.torso_upper`) consumes
//! - a clothing step applied to a descriptor is an unresolved slot access

use std::sync::Arc;

use wardrobe::{ClothingMode, CoverageMapping, EquippedItems, Outfit, ResolutionStrategy};

use crate::ast::Node;
use crate::candidate::{Candidate, ResultSet, SlotAccess};
use crate::context::ResolutionContext;
use crate::entity::{EntityId, COVERAGE_COMPONENT, EQUIPMENT_COMPONENT, EQUIPPED_FIELD};
use crate::error::{Result, ScopeError};

use super::{summary, NodeResolver, Precedence};

/// Resolves [`Node::Step`] for clothing-mode fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClothingStepResolver;

impl NodeResolver for ClothingStepResolver {
    fn name(&self) -> &'static str {
        "ClothingStepResolver"
    }

    fn precedence(&self) -> Precedence {
        Precedence::Specialized
    }

    fn can_resolve(&self, node: &Node) -> bool {
        node.field().and_then(ClothingMode::from_field).is_some()
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let (Node::Step { field, is_array, parent }, Some(mode)) =
            (node, node.field().and_then(ClothingMode::from_field))
        else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let parent_set = ctx.resolve(parent)?;
        let mut result = ResultSet::new();
        let mut legacy_slots = 0;
        let mut coverage_slots = 0;

        for candidate in &parent_set {
            let id = match candidate {
                Candidate::Entity(id) => id,
                Candidate::SlotAccess(access) => return Err(ScopeError::unresolved(access)),
                Candidate::Value(_) => continue,
            };
            let outfit = load_outfit(ctx, id)?;
            if *is_array {
                let resolution = ctx.slot_resolver().resolve_outfit(&outfit, mode);
                legacy_slots += resolution.legacy_slots;
                coverage_slots += resolution.coverage_slots;
                tracing::debug!(
                    entity = %id,
                    %mode,
                    strategy = %resolution.strategy(),
                    items = resolution.items.len(),
                    "clothing flattened"
                );
                result.extend(
                    resolution
                        .items
                        .into_iter()
                        .map(|item| Candidate::Entity(EntityId::from(item))),
                );
            } else {
                result.insert(Candidate::SlotAccess(SlotAccess::new(
                    id.clone(),
                    Arc::new(outfit),
                    mode,
                )));
            }
        }

        let mut entry = summary(
            self.name(),
            "clothing step resolved",
            Some(field.as_str()),
            parent_set.len(),
            result.len(),
        )
        .with_field("mode", mode.field_name())
        .with_field("is_array", *is_array);
        if *is_array {
            let strategy = if coverage_slots > 0 {
                ResolutionStrategy::Coverage
            } else {
                ResolutionStrategy::Legacy
            };
            entry = entry
                .with_field("strategy", strategy.as_str())
                .with_field("legacy_slots", legacy_slots)
                .with_field("coverage_slots", coverage_slots);
        }
        ctx.record(entry);
        Ok(result)
    }
}

/// Reads an entity's equipped items and the coverage mappings of those
/// items into an [`Outfit`] snapshot.
///
/// An entity without equipment yields an empty outfit. Malformed equipment
/// or coverage data is logged and ignored rather than failing the query.
///
/// # Errors
///
/// Returns gateway errors unchanged.
pub fn load_outfit(ctx: &ResolutionContext<'_>, entity: &EntityId) -> Result<Outfit> {
    let gateway = ctx.gateway();
    let equipped = gateway
        .component_data(entity, EQUIPMENT_COMPONENT)?
        .and_then(|mut equipment| equipment.get_mut(EQUIPPED_FIELD).map(serde_json::Value::take));

    let items = match equipped.as_ref().map(EquippedItems::from_value) {
        None => return Ok(Outfit::default()),
        Some(Ok(items)) => items,
        Some(Err(e)) => {
            tracing::warn!(entity = %entity, error = %e, "ignoring malformed equipment");
            return Ok(Outfit::default());
        }
    };

    let mut outfit = Outfit::new(items);
    let worn: Vec<String> = outfit.items().iter().map(|(_, _, item)| item.to_string()).collect();
    for item in worn {
        let Some(data) = gateway.component_data(&EntityId::new(item.as_str()), COVERAGE_COMPONENT)?
        else {
            continue;
        };
        match CoverageMapping::from_value(&item, &data) {
            Ok(mapping) => outfit.set_coverage(&item, mapping),
            Err(e) => {
                tracing::warn!(entity = %entity, error = %e, "ignoring malformed coverage mapping");
            }
        }
    }
    Ok(outfit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBundle;
    use crate::tests::{engine, fixture_gateway, sorted_ids};
    use crate::trace::TraceCollector;
    use serde_json::json;

    mod routing_tests {
        use super::*;

        #[test]
        fn claims_only_clothing_fields() {
            let resolver = ClothingStepResolver;
            assert!(resolver.can_resolve(&Node::actor().step("all_clothing")));
            assert!(resolver.can_resolve(&Node::actor().array_step("base_clothing")));
            assert!(!resolver.can_resolve(&Node::actor().step("torso_upper")));
            assert!(!resolver.can_resolve(&Node::actor().step("core:name")));
            assert!(!resolver.can_resolve(&Node::actor()));
        }
    }

    mod array_mode_tests {
        use super::*;

        #[test]
        fn flattens_topmost_items() {
            let gateway = fixture_gateway();
            let result = engine()
                .resolve(
                    &Node::actor().array_step("topmost_clothing"),
                    &EntityId::new("hero"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert_eq!(sorted_ids(&result), vec!["boots", "jacket", "pants"]);
        }

        #[test]
        fn no_equipment_is_empty() {
            let gateway = fixture_gateway();
            let result = engine()
                .resolve(
                    &Node::actor().array_step("all_clothing"),
                    &EntityId::new("beggar"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert!(result.is_empty());
        }

        #[test]
        fn malformed_equipment_is_treated_as_empty() {
            let mut gateway = fixture_gateway();
            gateway.insert_component(
                "ghost",
                EQUIPMENT_COMPONENT,
                json!({ "equipped": ["sheet"] }),
            );
            let result = engine()
                .resolve(
                    &Node::actor().array_step("topmost_clothing"),
                    &EntityId::new("ghost"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert!(result.is_empty());
        }

        #[test]
        fn malformed_slot_keeps_other_slots() {
            let mut gateway = fixture_gateway();
            gateway.insert_component(
                "scout",
                EQUIPMENT_COMPONENT,
                json!({ "equipped": { "feet": "boots", "torso_upper": { "outer": "jacket" } } }),
            );
            let result = engine()
                .resolve(
                    &Node::actor().array_step("topmost_clothing"),
                    &EntityId::new("scout"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert_eq!(sorted_ids(&result), vec!["jacket"]);
        }

        #[test]
        fn malformed_coverage_is_ignored() {
            let mut gateway = fixture_gateway();
            gateway.insert_component("cape", COVERAGE_COMPONENT, json!({ "covers": "everything" }));
            gateway.insert_component(
                "wizard",
                EQUIPMENT_COMPONENT,
                json!({ "equipped": { "torso_upper": { "outer": "cape", "base": "robe" } } }),
            );
            let result = engine()
                .resolve(
                    &Node::actor().array_step("all_clothing"),
                    &EntityId::new("wizard"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert_eq!(sorted_ids(&result), vec!["cape", "robe"]);
        }

        #[test]
        fn traces_strategy() {
            let gateway = fixture_gateway();
            let trace = TraceCollector::new();
            engine()
                .resolve(
                    &Node::actor().array_step("topmost_clothing"),
                    &EntityId::new("hero"),
                    &ContextBundle::new(&gateway).with_trace(&trace),
                )
                .unwrap();

            let entries = trace.entries_for("ClothingStepResolver");
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].field("strategy"), Some(&json!("legacy")));
            assert_eq!(entries[0].field("result_size"), Some(&json!(3)));
        }
    }

    mod scalar_mode_tests {
        use super::*;

        #[test]
        fn scalar_step_without_slot_is_rejected() {
            let gateway = fixture_gateway();
            let err = engine()
                .resolve(
                    &Node::actor().step("topmost_clothing"),
                    &EntityId::new("hero"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap_err();
            assert!(matches!(err, ScopeError::UnresolvedSlotAccess { ref entity, mode }
                if entity.as_str() == "hero" && mode == ClothingMode::Topmost));
        }

        #[test]
        fn clothing_step_on_descriptor_is_rejected() {
            let gateway = fixture_gateway();
            let engine = engine();
            let actor = EntityId::new("merchant");
            let bundle = ContextBundle::new(&gateway);

            let nested = Node::actor()
                .step("topmost_clothing")
                .step("underwear")
                .step("torso_lower");
            let err = engine.resolve(&nested, &actor, &bundle).unwrap_err();
            assert!(matches!(err, ScopeError::UnresolvedSlotAccess { ref entity, mode }
                if entity.as_str() == "merchant" && mode == ClothingMode::Topmost));

            let flattened = Node::actor().step("topmost_clothing").array_step("all_clothing");
            let err = engine.resolve(&flattened, &actor, &bundle).unwrap_err();
            assert!(matches!(err, ScopeError::UnresolvedSlotAccess { .. }));
        }

        #[test]
        fn skips_value_parents() {
            let gateway = fixture_gateway();
            let result = engine()
                .resolve(
                    &Node::actor().step("core:stats").array_step("all_clothing"),
                    &EntityId::new("hero"),
                    &ContextBundle::new(&gateway),
                )
                .unwrap();
            assert!(result.is_empty());
        }

        #[test]
        fn descriptor_per_entity() {
            let gateway = fixture_gateway();
            let trace = TraceCollector::new();
            engine()
                .resolve(
                    &Node::entities("core:actor").step("outer_clothing").step("feet"),
                    &EntityId::new("hero"),
                    &ContextBundle::new(&gateway).with_trace(&trace),
                )
                .unwrap();

            let entries = trace.entries_for("ClothingStepResolver");
            let parents = entries[0].field("parent_size").cloned();
            assert_eq!(entries[0].field("result_size").cloned(), parents);
        }
    }
}
