//! JSON-Logic filtering.

use crate::ast::Node;
use crate::candidate::{Candidate, ResultSet};
use crate::context::ResolutionContext;
use crate::error::{LogicError, Result, ScopeError};
use crate::logic::{truthy, LogicEnv};
use crate::trace::{TraceEntry, TraceLevel};

use super::{summary, NodeResolver};

/// Resolves [`Node::Filter`] by keeping the parent candidates whose
/// predicate is truthy.
///
/// A predicate that fails to evaluate excludes its candidate and logs a
/// warning, or aborts the query when
/// [`EngineConfig::strict_filters`](crate::config::EngineConfig::strict_filters)
/// is set. Gateway failures always abort.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterResolver;

impl NodeResolver for FilterResolver {
    fn name(&self) -> &'static str {
        "FilterResolver"
    }

    fn can_resolve(&self, node: &Node) -> bool {
        matches!(node, Node::Filter { .. })
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let Node::Filter { logic, parent } = node else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let parent_set = ctx.resolve(parent)?;
        let mut result = ResultSet::new();
        let mut failures = 0usize;

        for candidate in &parent_set {
            if let Candidate::SlotAccess(access) = candidate {
                return Err(ScopeError::unresolved(access));
            }

            let env = LogicEnv::new(ctx.bundle(), ctx.actor()).with_entity(candidate);
            match env.evaluate(logic) {
                Ok(value) => {
                    if truthy(&value) {
                        result.insert(candidate.clone());
                    }
                }
                Err(LogicError::Gateway(e)) => return Err(e.into()),
                Err(source) if ctx.config().strict_filters => {
                    return Err(ScopeError::FilterEvaluation {
                        candidate: candidate.to_string(),
                        source,
                    });
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(
                        candidate = %candidate,
                        error = %e,
                        "filter predicate failed, excluding"
                    );
                    ctx.record(
                        TraceEntry::new(TraceLevel::Warn, self.name(), "predicate failed")
                            .with_field("candidate", candidate.to_string())
                            .with_field("error", e.to_string()),
                    );
                }
            }
        }

        ctx.record(
            summary(self.name(), "filter applied", None, parent_set.len(), result.len())
                .with_field("failures", failures),
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::ContextBundle;
    use crate::engine::ScopeEngine;
    use crate::entity::EntityId;
    use crate::tests::{engine, fixture_gateway, sorted_ids};
    use crate::trace::TraceCollector;
    use serde_json::json;

    fn actors() -> Node {
        Node::entities("core:actor")
    }

    #[test]
    fn keeps_matching_candidates_in_order() {
        let gateway = fixture_gateway();
        let query = actors().filter(json!({
            ">=": [{ "var": "entity.components.core:stats.level" }, 3]
        }));
        let result = engine()
            .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
            .unwrap();
        assert_eq!(sorted_ids(&result), vec!["guard", "hero"]);
    }

    #[test]
    fn filters_with_context_variables() {
        let gateway = fixture_gateway();
        let bundle = ContextBundle::new(&gateway).with_variable("min_level", json!(5));
        let query = actors().filter(json!({
            ">=": [{ "var": "entity.components.core:stats.level" }, { "var": "min_level" }]
        }));
        let result = engine().resolve(&query, &EntityId::new("hero"), &bundle).unwrap();
        assert_eq!(sorted_ids(&result), vec!["hero"]);
    }

    #[test]
    fn excludes_self_via_actor_binding() {
        let gateway = fixture_gateway();
        let query = actors().filter(json!({
            "!=": [{ "var": "entity.id" }, { "var": "actor.id" }]
        }));
        let result = engine()
            .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
            .unwrap();
        assert!(!result.contains_entity("hero"));
        assert!(result.contains_entity("guard"));
    }

    #[test]
    fn failing_predicate_excludes_candidate_leniently() {
        let gateway = fixture_gateway();
        let trace = TraceCollector::new();
        let query = actors().filter(json!({ "frobnicate": [1] }));
        let bundle = ContextBundle::new(&gateway).with_trace(&trace);
        let result = engine()
            .resolve(&query, &EntityId::new("hero"), &bundle)
            .unwrap();

        assert!(result.is_empty());
        let warnings: Vec<_> = trace
            .entries_for("FilterResolver")
            .into_iter()
            .filter(|entry| entry.level == TraceLevel::Warn)
            .collect();
        assert_eq!(warnings.len(), 4);
    }

    #[test]
    fn failing_predicate_aborts_when_strict() {
        let gateway = fixture_gateway();
        let engine = ScopeEngine::with_config(EngineConfig::strict());
        let query = actors().filter(json!({ "var": "nonexistent.path" }));
        let err = engine
            .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
            .unwrap_err();
        assert!(matches!(
            err,
            ScopeError::FilterEvaluation { source: LogicError::UnknownVariable { .. }, .. }
        ));
    }

    #[test]
    fn descriptor_input_is_rejected() {
        let gateway = fixture_gateway();
        let query = Node::actor()
            .step("topmost_clothing")
            .filter(json!(true));
        let err = engine()
            .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
            .unwrap_err();
        assert!(matches!(err, ScopeError::UnresolvedSlotAccess { .. }));
    }

    #[test]
    fn filters_plain_values() {
        let gateway = fixture_gateway();
        let query = Node::actor()
            .step("core:stats")
            .filter(json!({ ">": [{ "var": "entity.level" }, 5] }));
        let result = engine()
            .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
            .unwrap();
        assert_eq!(result.len(), 1);
    }
}
