//! Scope query syntax tree.
//!
//! A query is a chain of nodes rooted at a [`Node::Source`]. Each other node
//! owns its parent, so a query reads from the root outwards:
//!
//! ```text
//! actor.topmost_clothing.torso_upper
//!
//! Step(torso_upper)
//!   └─ Step(topmost_clothing)
//!        └─ Source(actor)
//! ```
//!
//! Parsing query text is out of scope; trees are built with the builder
//! methods below or deserialized from their JSON form.
//!
//! # Example
//!
//! ```
//! use scope_engine::ast::{Node, NodeKind};
//! use serde_json::json;
//!
//! let query = Node::actor().step("topmost_clothing").step("torso_upper");
//! assert_eq!(query.kind(), NodeKind::Step);
//! assert_eq!(query.depth(), 3);
//!
//! let wire = serde_json::to_value(&query).unwrap();
//! assert_eq!(wire["type"], "Step");
//! assert_eq!(wire["parent"]["parent"], json!({ "type": "Source", "kind": "actor" }));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The acting entity.
    Actor,
    /// The ambient location, if any.
    Location,
    /// Every entity having a component.
    Entities {
        /// Component id to match
        component: String,
    },
    /// The empty set.
    None,
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    /// Query root.
    Source {
        /// What the root resolves to
        kind: SourceKind,
    },
    /// Field access on every candidate of the parent.
    Step {
        /// Field, component or reserved name to access
        field: String,
        /// Array semantics (`field[]`)
        #[serde(default)]
        is_array: bool,
        /// Node being stepped from
        parent: Box<Node>,
    },
    /// JSON-Logic predicate over the parent's candidates.
    Filter {
        /// The predicate
        logic: Value,
        /// Node being filtered
        parent: Box<Node>,
    },
    /// Set union of two independent queries.
    Union {
        /// First branch
        left: Box<Node>,
        /// Second branch
        right: Box<Node>,
    },
    /// One level of flattening over the parent's candidates.
    ArrayIteration {
        /// Node being iterated
        parent: Box<Node>,
    },
}

/// Fieldless discriminant of [`Node`], used for dispatch and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// [`Node::Source`]
    Source,
    /// [`Node::Step`]
    Step,
    /// [`Node::Filter`]
    Filter,
    /// [`Node::Union`]
    Union,
    /// [`Node::ArrayIteration`]
    ArrayIteration,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "Source"),
            Self::Step => write!(f, "Step"),
            Self::Filter => write!(f, "Filter"),
            Self::Union => write!(f, "Union"),
            Self::ArrayIteration => write!(f, "ArrayIteration"),
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

impl Node {
    /// `actor`
    #[must_use]
    pub fn actor() -> Self {
        Self::Source {
            kind: SourceKind::Actor,
        }
    }

    /// `location`
    #[must_use]
    pub fn location() -> Self {
        Self::Source {
            kind: SourceKind::Location,
        }
    }

    /// `entities(component)`
    #[must_use]
    pub fn entities(component: &str) -> Self {
        Self::Source {
            kind: SourceKind::Entities {
                component: component.to_string(),
            },
        }
    }

    /// `none`
    #[must_use]
    pub fn none() -> Self {
        Self::Source {
            kind: SourceKind::None,
        }
    }

    /// `self.field`
    #[must_use]
    pub fn step(self, field: &str) -> Self {
        Self::Step {
            field: field.to_string(),
            is_array: false,
            parent: Box::new(self),
        }
    }

    /// `self.field[]`
    #[must_use]
    pub fn array_step(self, field: &str) -> Self {
        Self::Step {
            field: field.to_string(),
            is_array: true,
            parent: Box::new(self),
        }
    }

    /// `self[{logic}]`
    #[must_use]
    pub fn filter(self, logic: Value) -> Self {
        Self::Filter {
            logic,
            parent: Box::new(self),
        }
    }

    /// `self[]`
    #[must_use]
    pub fn iterate(self) -> Self {
        Self::ArrayIteration {
            parent: Box::new(self),
        }
    }

    /// `left | right`
    #[must_use]
    pub fn union(left: Self, right: Self) -> Self {
        Self::Union {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns the node's discriminant.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Source { .. } => NodeKind::Source,
            Self::Step { .. } => NodeKind::Step,
            Self::Filter { .. } => NodeKind::Filter,
            Self::Union { .. } => NodeKind::Union,
            Self::ArrayIteration { .. } => NodeKind::ArrayIteration,
        }
    }

    /// Returns the parent of a chained node.
    #[must_use]
    pub fn parent(&self) -> Option<&Node> {
        match self {
            Self::Step { parent, .. }
            | Self::Filter { parent, .. }
            | Self::ArrayIteration { parent } => Some(parent.as_ref()),
            Self::Source { .. } | Self::Union { .. } => None,
        }
    }

    /// Returns the field of a step node.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Step { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Source { .. } => 1,
            Self::Union { left, right } => 1 + left.depth().max(right.depth()),
            Self::Step { parent, .. }
            | Self::Filter { parent, .. }
            | Self::ArrayIteration { parent } => 1 + parent.depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_chain_parents() {
        let query = Node::actor().step("core:inventory").array_step("items");
        let Node::Step { field, is_array, parent } = &query else {
            panic!("expected a step");
        };
        assert_eq!(field, "items");
        assert!(*is_array);
        assert_eq!(parent.field(), Some("core:inventory"));
        assert_eq!(parent.parent(), Some(&Node::actor()));
    }

    #[test]
    fn depth_takes_longest_branch() {
        let short = Node::actor();
        let long = Node::location().step("a").step("b");
        assert_eq!(Node::union(short, long).depth(), 4);
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Node::none().kind(), NodeKind::Source);
        assert_eq!(Node::actor().iterate().kind(), NodeKind::ArrayIteration);
        assert_eq!(Node::actor().filter(json!(true)).kind(), NodeKind::Filter);
        assert_eq!(Node::union(Node::actor(), Node::none()).kind(), NodeKind::Union);
    }

    #[test]
    fn parses_wire_form() {
        let node: Node = serde_json::from_value(json!({
            "type": "Filter",
            "logic": { "==": [{ "var": "entity.id" }, "hero"] },
            "parent": {
                "type": "Step",
                "field": "followers",
                "parent": {
                    "type": "Source",
                    "kind": { "entities": { "component": "core:actor" } }
                }
            }
        }))
        .unwrap();

        let expected = Node::entities("core:actor")
            .step("followers")
            .filter(json!({ "==": [{ "var": "entity.id" }, "hero"] }));
        assert_eq!(node, expected);
    }

    #[test]
    fn wire_form_roundtrips_union() {
        let node = Node::union(Node::actor(), Node::location().iterate());
        let wire = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, node);
    }
}
