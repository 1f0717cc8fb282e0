//! Set union.

use crate::ast::Node;
use crate::candidate::ResultSet;
use crate::context::ResolutionContext;
use crate::error::{Result, ScopeError};

use super::{summary, NodeResolver};

/// Resolves [`Node::Union`]: left members first, then right members not
/// already present.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionResolver;

impl NodeResolver for UnionResolver {
    fn name(&self) -> &'static str {
        "UnionResolver"
    }

    fn can_resolve(&self, node: &Node) -> bool {
        matches!(node, Node::Union { .. })
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let Node::Union { left, right } = node else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let mut result = ctx.resolve(left)?;
        let left_size = result.len();
        let right = ctx.resolve(right)?;
        let right_size = right.len();
        result.extend(right);

        ctx.record(
            summary(self.name(), "union resolved", None, left_size + right_size, result.len())
                .with_field("left_size", left_size)
                .with_field("right_size", right_size),
        );
        Ok(result)
    }
}
