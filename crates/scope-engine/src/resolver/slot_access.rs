//! Body-slot steps.

use wardrobe::{BodySlot, ResolutionStrategy};

use crate::ast::Node;
use crate::candidate::{Candidate, ResultSet};
use crate::context::ResolutionContext;
use crate::entity::EntityId;
use crate::error::{Result, ScopeError};

use super::step::read_field;
use super::{summary, NodeResolver, Precedence};

/// Resolves [`Node::Step`] for body-slot fields such as `torso_upper`.
///
/// A slot access descriptor from a preceding clothing step is resolved
/// through layer priority and coverage. Any other candidate is read like a
/// generic step, so a component literally named after a slot still works.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotAccessResolver;

impl NodeResolver for SlotAccessResolver {
    fn name(&self) -> &'static str {
        "SlotAccessResolver"
    }

    fn precedence(&self) -> Precedence {
        Precedence::Specialized
    }

    fn can_resolve(&self, node: &Node) -> bool {
        node.field().and_then(BodySlot::from_field).is_some()
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let (Node::Step { field, parent, .. }, Some(slot)) =
            (node, node.field().and_then(BodySlot::from_field))
        else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let parent_set = ctx.resolve(parent)?;
        let resolver = ctx.slot_resolver();
        let mut result = ResultSet::new();
        let mut strategy = None;

        for candidate in &parent_set {
            let Candidate::SlotAccess(access) = candidate else {
                read_field(ctx, candidate, field, &mut result)?;
                continue;
            };

            let resolution = resolver.resolve_slot(access.outfit(), slot.as_str(), access.mode());
            tracing::debug!(
                entity = %access.entity(),
                %slot,
                mode = %access.mode(),
                strategy = %resolution.strategy,
                items = resolution.items.len(),
                "slot resolved"
            );
            strategy = match (strategy, resolution.strategy) {
                (Some(ResolutionStrategy::Coverage), _) | (_, ResolutionStrategy::Coverage) => {
                    Some(ResolutionStrategy::Coverage)
                }
                _ => Some(ResolutionStrategy::Legacy),
            };
            result.extend(
                resolution
                    .items
                    .into_iter()
                    .map(|item| Candidate::Entity(EntityId::from(item))),
            );
        }

        let mut entry = summary(
            self.name(),
            "slot resolved",
            Some(field.as_str()),
            parent_set.len(),
            result.len(),
        );
        if let Some(strategy) = strategy {
            entry = entry.with_field("strategy", strategy.as_str());
        }
        ctx.record(entry);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBundle;
    use crate::tests::{engine, fixture_gateway, sorted_ids};
    use crate::trace::TraceCollector;
    use serde_json::json;

    fn slot_query(mode: &str, slot: &str) -> Node {
        Node::actor().step(mode).step(slot)
    }

    fn ids_for(actor: &str, query: &Node) -> Vec<String> {
        let gateway = fixture_gateway();
        let result = engine()
            .resolve(query, &EntityId::new(actor), &ContextBundle::new(&gateway))
            .unwrap();
        sorted_ids(&result)
    }

    #[test]
    fn topmost_slot_picks_outer_layer() {
        assert_eq!(ids_for("hero", &slot_query("topmost_clothing", "torso_upper")), vec!["jacket"]);
    }

    #[test]
    fn topmost_falls_back_to_lower_layer() {
        assert_eq!(ids_for("guard", &slot_query("topmost_clothing", "torso_upper")), vec!["shirt"]);
    }

    #[test]
    fn single_layer_mode_reads_only_that_layer() {
        assert!(ids_for("hero", &slot_query("base_clothing", "torso_upper")).is_empty());
        assert_eq!(ids_for("guard", &slot_query("base_clothing", "torso_upper")), vec!["shirt"]);
    }

    #[test]
    fn covering_item_blocks_underwear() {
        assert_eq!(
            ids_for("merchant", &slot_query("topmost_clothing", "torso_lower")),
            vec!["trousers"]
        );
        assert_eq!(
            ids_for("merchant", &slot_query("underwear", "torso_lower")),
            vec!["boxer_brief"]
        );
    }

    #[test]
    fn empty_slot_is_empty() {
        assert!(ids_for("hero", &slot_query("topmost_clothing", "head_gear")).is_empty());
        assert!(ids_for("beggar", &slot_query("all_clothing", "legs")).is_empty());
    }

    #[test]
    fn non_descriptor_falls_back_to_component_read() {
        let mut gateway = fixture_gateway();
        gateway.insert_component("statue", "legs", json!("plinth"));
        let result = engine()
            .resolve(
                &Node::actor().step("legs"),
                &EntityId::new("statue"),
                &ContextBundle::new(&gateway),
            )
            .unwrap();
        assert_eq!(sorted_ids(&result), vec!["plinth"]);
    }

    #[test]
    fn traces_strategy_per_query() {
        let gateway = fixture_gateway();
        let trace = TraceCollector::new();
        let engine = engine();

        let bundle = ContextBundle::new(&gateway).with_trace(&trace);
        let upper = slot_query("topmost_clothing", "torso_upper");
        engine.resolve(&upper, &EntityId::new("hero"), &bundle).unwrap();
        let lower = slot_query("topmost_clothing", "torso_lower");
        engine.resolve(&lower, &EntityId::new("merchant"), &bundle).unwrap();

        let entries = trace.entries_for("SlotAccessResolver");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].field("strategy"), Some(&json!("legacy")));
        assert_eq!(entries[1].field("strategy"), Some(&json!("coverage")));
    }
}
