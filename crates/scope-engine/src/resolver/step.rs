//! Generic field access.

use serde_json::Value;
use wardrobe::ClothingMode;

use crate::ast::Node;
use crate::candidate::{Candidate, ResultSet};
use crate::context::ResolutionContext;
use crate::error::{Result, ScopeError};

use super::{summary, NodeResolver};

/// Resolves [`Node::Step`] for ordinary fields.
///
/// For an entity candidate the field names a component; for an object value
/// it names a property. Lists contribute their elements, strings become
/// entity ids, and missing data contributes nothing.
///
/// Declines the reserved clothing-mode fields, which only
/// [`ClothingStepResolver`](super::ClothingStepResolver) can interpret.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepResolver;

impl NodeResolver for StepResolver {
    fn name(&self) -> &'static str {
        "StepResolver"
    }

    fn can_resolve(&self, node: &Node) -> bool {
        matches!(node, Node::Step { field, .. } if ClothingMode::from_field(field).is_none())
    }

    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let Node::Step { field, is_array, parent } = node else {
            return Err(ScopeError::NoResolver { kind: node.kind() });
        };

        let parent_set = ctx.resolve(parent)?;
        let mut result = ResultSet::new();
        for candidate in &parent_set {
            read_field(ctx, candidate, field, &mut result)?;
        }

        ctx.record(
            summary(
                self.name(),
                "step resolved",
                Some(field.as_str()),
                parent_set.len(),
                result.len(),
            )
            .with_field("is_array", *is_array),
        );
        Ok(result)
    }
}

/// Reads `field` from one candidate into `out`.
///
/// # Errors
///
/// Returns [`ScopeError::UnresolvedSlotAccess`] for descriptors and gateway
/// errors from component reads.
pub(crate) fn read_field(
    ctx: &ResolutionContext<'_>,
    candidate: &Candidate,
    field: &str,
    out: &mut ResultSet,
) -> Result<()> {
    let value = match candidate {
        Candidate::Entity(id) => ctx.gateway().component_data(id, field)?,
        Candidate::Value(Value::Object(object)) => object.get(field).cloned(),
        Candidate::Value(_) => None,
        Candidate::SlotAccess(access) => return Err(ScopeError::unresolved(access)),
    };

    match value {
        Some(Value::Array(items)) => out.extend(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(Candidate::from_field_value),
        ),
        Some(Value::Null) | None => {}
        Some(value) => {
            out.insert(Candidate::from_field_value(value));
        }
    }
    Ok(())
}
