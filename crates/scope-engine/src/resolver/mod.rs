//! Node resolvers and the dispatcher that routes nodes to them.
//!
//! Each resolver handles one kind of syntax node. A resolver first asks the
//! dispatcher to resolve its parent (through [`ResolutionContext::resolve`]),
//! then transforms the parent's [`ResultSet`] into its own.
//!
//! # Architecture
//!
//! The [`Dispatcher`] holds an ordered resolver list and hands each node to
//! the first resolver whose [`NodeResolver::can_resolve`] accepts it. Several
//! resolvers accept step nodes, so order matters:
//!
//! 1. [`Precedence::Specialized`] resolvers (clothing step, slot access)
//!    claim the reserved field names
//! 2. [`Precedence::Generic`] resolvers handle everything else
//!
//! The dispatcher keeps every specialized resolver ahead of every generic
//! one regardless of registration order.
//!
//! # Invariants
//!
//! - Resolvers MUST NOT mutate entity state (the gateway is read-only)
//! - Resolvers MUST preserve parent iteration order in their output
//! - Trace entries MUST be emitted in parent iteration order
//!
//! # Available Resolvers
//!
//! - [`SourceResolver`]: query roots
//! - [`ClothingStepResolver`]: reserved clothing-mode fields
//! - [`SlotAccessResolver`]: body-slot fields
//! - [`StepResolver`]: generic field access
//! - [`FilterResolver`]: JSON-Logic predicates
//! - [`UnionResolver`]: set union
//! - [`ArrayIterationResolver`]: one-level flattening

mod array;
mod clothing;
mod filter;
mod slot_access;
mod source;
mod step;
mod union;

pub use array::ArrayIterationResolver;
pub use clothing::{load_outfit, ClothingStepResolver};
pub use filter::FilterResolver;
pub use slot_access::SlotAccessResolver;
pub use source::SourceResolver;
pub use step::StepResolver;
pub use union::UnionResolver;

use std::fmt;

use crate::ast::Node;
use crate::candidate::ResultSet;
use crate::context::ResolutionContext;
use crate::error::{Result, ScopeError};
use crate::trace::{TraceEntry, TraceLevel};

/// Dispatch ordering class of a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// Claims a reserved subset of a node kind; probed first.
    Specialized,
    /// Handles a node kind in general; probed after specialized resolvers.
    Generic,
}

/// Resolves one kind of syntax node.
///
/// # Implementation Guidelines
///
/// 1. **Recursion**: resolve parents with [`ResolutionContext::resolve`], never
///    by calling another resolver directly, so depth and size bounds apply.
///
/// 2. **Determinism**: walk the parent set in order and insert results in
///    that order.
///
/// 3. **Descriptors**: a resolver that cannot consume a
///    [`Candidate::SlotAccess`](crate::candidate::Candidate::SlotAccess)
///    must fail with [`ScopeError::UnresolvedSlotAccess`] rather than drop it.
///
/// # Example
///
/// ```
/// use scope_engine::ast::{Node, SourceKind};
/// use scope_engine::candidate::ResultSet;
/// use scope_engine::context::ResolutionContext;
/// use scope_engine::error::Result;
/// use scope_engine::resolver::{Dispatcher, NodeResolver};
///
/// /// Resolves `none` without asking the gateway.
/// struct NothingResolver;
///
/// impl NodeResolver for NothingResolver {
///     fn name(&self) -> &'static str {
///         "NothingResolver"
///     }
///
///     fn can_resolve(&self, node: &Node) -> bool {
///         matches!(node, Node::Source { kind: SourceKind::None })
///     }
///
///     fn resolve(&self, _node: &Node, _ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
///         Ok(ResultSet::new())
///     }
/// }
///
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register(Box::new(NothingResolver));
/// assert_eq!(dispatcher.resolver_names(), vec!["NothingResolver"]);
/// ```
pub trait NodeResolver: Send + Sync {
    /// Returns the resolver's name, used in traces and diagnostics.
    fn name(&self) -> &'static str;

    /// Returns the dispatch ordering class.
    fn precedence(&self) -> Precedence {
        Precedence::Generic
    }

    /// Returns true if this resolver handles `node`.
    fn can_resolve(&self, node: &Node) -> bool;

    /// Resolves `node`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScopeError`] for structural problems, strict filter
    /// failures, or gateway failures.
    fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet>;
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Ordered list of resolvers; the first that accepts a node resolves it.
#[derive(Default)]
pub struct Dispatcher {
    resolvers: Vec<Box<dyn NodeResolver>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no resolvers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher with the seven built-in resolvers.
    #[must_use]
    pub fn with_default_resolvers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(SourceResolver));
        dispatcher.register(Box::new(StepResolver));
        dispatcher.register(Box::new(FilterResolver));
        dispatcher.register(Box::new(UnionResolver));
        dispatcher.register(Box::new(ArrayIterationResolver));
        dispatcher.register(Box::new(ClothingStepResolver));
        dispatcher.register(Box::new(SlotAccessResolver));
        dispatcher
    }

    /// Adds a resolver.
    ///
    /// Specialized resolvers are placed after existing specialized resolvers
    /// and before every generic one; generic resolvers are appended.
    pub fn register(&mut self, resolver: Box<dyn NodeResolver>) {
        let position = match resolver.precedence() {
            Precedence::Specialized => self
                .resolvers
                .iter()
                .position(|r| r.precedence() == Precedence::Generic)
                .unwrap_or(self.resolvers.len()),
            Precedence::Generic => self.resolvers.len(),
        };
        self.resolvers.insert(position, resolver);
    }

    /// Returns the resolver that would handle `node`.
    #[must_use]
    pub fn resolver_for(&self, node: &Node) -> Option<&dyn NodeResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.can_resolve(node))
            .map(|resolver| &**resolver)
    }

    /// Resolves `node` with the first accepting resolver, enforcing the
    /// configured depth and candidate bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::NoResolver`] if nothing accepts the node,
    /// [`ScopeError::DepthExceeded`] or [`ScopeError::TooManyCandidates`] if
    /// a bound is hit, or any error of the chosen resolver.
    pub fn resolve(&self, node: &Node, ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
        let limits = ctx.config();
        if ctx.depth() >= limits.max_depth {
            return Err(ScopeError::DepthExceeded {
                limit: limits.max_depth,
            });
        }

        let resolver = self.resolver_for(node).ok_or(ScopeError::NoResolver { kind: node.kind() })?;
        tracing::trace!(
            resolver = resolver.name(),
            kind = %node.kind(),
            depth = ctx.depth(),
            "dispatching"
        );

        let result = resolver.resolve(node, ctx)?;
        if result.len() > limits.max_candidates {
            return Err(ScopeError::TooManyCandidates {
                count: result.len(),
                limit: limits.max_candidates,
            });
        }
        Ok(result)
    }

    /// Returns resolver names in probe order.
    #[must_use]
    pub fn resolver_names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Returns the number of registered resolvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns true if no resolver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolvers", &self.resolver_names())
            .finish()
    }
}

/// Summary trace fields shared by the step-like resolvers.
pub(crate) fn summary(
    resolver: &str,
    message: &str,
    field: Option<&str>,
    parent_size: usize,
    result_size: usize,
) -> TraceEntry {
    let mut entry = TraceEntry::new(TraceLevel::Info, resolver, message)
        .with_field("parent_size", parent_size)
        .with_field("result_size", result_size);
    if let Some(field) = field {
        entry = entry.with_field("field", field);
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    struct Fixed(&'static str, Precedence);

    impl NodeResolver for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn precedence(&self) -> Precedence {
            self.1
        }

        fn can_resolve(&self, _node: &Node) -> bool {
            true
        }

        fn resolve(&self, _node: &Node, _ctx: &ResolutionContext<'_>) -> Result<ResultSet> {
            Ok(ResultSet::new())
        }
    }

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn NodeResolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn NodeResolver>]) {}
    }

    #[test]
    fn specialized_always_precede_generic() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Fixed("g1", Precedence::Generic)));
        dispatcher.register(Box::new(Fixed("s1", Precedence::Specialized)));
        dispatcher.register(Box::new(Fixed("g2", Precedence::Generic)));
        dispatcher.register(Box::new(Fixed("s2", Precedence::Specialized)));
        assert_eq!(dispatcher.resolver_names(), vec!["s1", "s2", "g1", "g2"]);
    }

    #[test]
    fn default_resolvers_order() {
        let dispatcher = Dispatcher::with_default_resolvers();
        assert_eq!(dispatcher.len(), 7);
        assert_eq!(
            dispatcher.resolver_names(),
            vec![
                "ClothingStepResolver",
                "SlotAccessResolver",
                "SourceResolver",
                "StepResolver",
                "FilterResolver",
                "UnionResolver",
                "ArrayIterationResolver",
            ]
        );
    }

    #[test]
    fn routes_step_fields() {
        let dispatcher = Dispatcher::with_default_resolvers();
        let name = |node: &Node| dispatcher.resolver_for(node).map(|r| r.name());

        assert_eq!(name(&Node::actor().step("topmost_clothing")), Some("ClothingStepResolver"));
        assert_eq!(name(&Node::actor().step("underwear")), Some("ClothingStepResolver"));
        assert_eq!(
            name(&Node::actor().step("topmost_clothing").step("torso_upper")),
            Some("SlotAccessResolver")
        );
        assert_eq!(name(&Node::actor().step("core:inventory")), Some("StepResolver"));
        assert_eq!(name(&Node::actor()), Some("SourceResolver"));
        assert_eq!(name(&Node::actor().iterate()), Some("ArrayIterationResolver"));
    }

    #[test]
    fn empty_dispatcher_has_no_resolver() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.resolver_for(&Node::actor()).is_none());
        assert_eq!(Node::actor().kind(), NodeKind::Source);
    }
}
