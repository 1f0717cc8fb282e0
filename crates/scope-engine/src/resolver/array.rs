//! One-level flattening.

use serde_json::Value;

use crate::ast::Node;
use crate::candidate::{Candidate, ResultSet};
use crate::context::ResolutionContext;
use crate::entity::EntityId;
use crate::error::{Result, ScopeError};

use super::{summary, NodeResolver};

/// Resolves [`Node::ArrayIteration`].
///
/// List values contribute their elements (strings as entity ids, nulls
/// skipped). A slot access descriptor contributes every visible item of the
/// outfit, the same as the `[]` form of the clothing step. Every other
/// candidate passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayIterationResolver;

impl NodeResolver for ArrayIterationResolver {
    fn name(&self) -> &'static str {
        "ArrayIterationResolver"
    }

    fn can_resolve(&self, node: &Node) -> bool {
        matches!(node, Node::ArrayIteration { .. })
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let Node::ArrayIteration { parent } = node else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let parent_set = ctx.resolve(parent)?;
        let parent_size = parent_set.len();
        let mut result = ResultSet::new();

        for candidate in parent_set {
            match candidate {
                Candidate::Value(Value::Array(items)) => result.extend(
                    items
                        .into_iter()
                        .filter(|item| !item.is_null())
                        .map(Candidate::from_field_value),
                ),
                Candidate::SlotAccess(access) => {
                    let resolution =
                        ctx.slot_resolver().resolve_outfit(access.outfit(), access.mode());
                    result.extend(
                        resolution
                            .items
                            .into_iter()
                            .map(|item| Candidate::Entity(EntityId::from(item))),
                    );
                }
                other => {
                    result.insert(other);
                }
            }
        }

        ctx.record(summary(self.name(), "array flattened", None, parent_size, result.len()));
        Ok(result)
    }
}
