//! Query roots.

use crate::ast::{Node, SourceKind};
use crate::candidate::ResultSet;
use crate::context::ResolutionContext;
use crate::error::{Result, ScopeError};

use super::{summary, NodeResolver};

/// Resolves [`Node::Source`] into an initial set of entity ids.
///
/// - `actor`: the acting entity
/// - `location`: the ambient location, or nothing
/// - `entities(component)`: every entity with the component, in gateway order
/// - `none`: nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceResolver;

impl NodeResolver for SourceResolver {
    fn name(&self) -> &'static str {
        "SourceResolver"
    }

    fn can_resolve(&self, node: &Node) -> bool {
        matches!(node, Node::Source { .. })
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let Node::Source { kind } = node else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let result = match kind {
            SourceKind::Actor => ResultSet::from_entities([ctx.actor().clone()]),
            SourceKind::Location => ResultSet::from_entities(ctx.location().cloned()),
            SourceKind::Entities { component } => {
                ResultSet::from_entities(ctx.gateway().entities_with_component(component)?)
            }
            SourceKind::None => ResultSet::new(),
        };

        ctx.record(
            summary(self.name(), "source resolved", None, 0, result.len())
                .with_field("source", serde_json::to_value(kind).unwrap_or_default()),
        );
        Ok(result)
    }
}
