//! Per-query inputs and the context threaded through resolvers.
//!
//! A caller describes *where* a query runs with a [`ContextBundle`]: the
//! entity gateway, the ambient location, an optional trace collector, and
//! the variables and named conditions filters may refer to.
//!
//! The engine combines the bundle with the acting entity and its own state
//! (dispatcher, priority cache, configuration) into a
//! [`ResolutionContext`]. Contexts are `Copy`; recursion derives a child
//! with [`ResolutionContext::descend`], which only bumps the depth.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use wardrobe::{PriorityCache, SlotResolver};

use crate::ast::Node;
use crate::candidate::ResultSet;
use crate::config::EngineConfig;
use crate::entity::{EntityGateway, EntityId};
use crate::error::Result;
use crate::resolver::Dispatcher;
use crate::trace::{TraceCollector, TraceEntry};

// =============================================================================
// Context Bundle
// =============================================================================

/// Caller-supplied environment of a query.
///
/// # Example
///
/// ```
/// use scope_engine::context::ContextBundle;
/// use scope_engine::entity::InMemoryGateway;
/// use serde_json::json;
///
/// let gateway = InMemoryGateway::new();
/// let bundle = ContextBundle::new(&gateway)
///     .with_location("tavern")
///     .with_variable("target", json!("npc_3"))
///     .with_condition(
///         "is-target",
///         json!({ "==": [{ "var": "entity.id" }, { "var": "target" }] }),
///     );
///
/// assert_eq!(bundle.location().unwrap().as_str(), "tavern");
/// assert!(bundle.condition("is-target").is_some());
/// ```
#[derive(Clone)]
pub struct ContextBundle<'a> {
    gateway: &'a dyn EntityGateway,
    location: Option<EntityId>,
    trace: Option<&'a TraceCollector>,
    variables: Map<String, Value>,
    conditions: BTreeMap<String, Value>,
}

impl<'a> ContextBundle<'a> {
    /// Creates a bundle over a gateway, with no location, trace or variables.
    #[must_use]
    pub fn new(gateway: &'a dyn EntityGateway) -> Self {
        Self {
            gateway,
            location: None,
            trace: None,
            variables: Map::new(),
            conditions: BTreeMap::new(),
        }
    }

    /// Sets the ambient location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<EntityId>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attaches a trace collector.
    #[must_use]
    pub fn with_trace(mut self, trace: &'a TraceCollector) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Binds a context variable visible to filters.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    /// Registers a named condition for `condition_ref`.
    #[must_use]
    pub fn with_condition(mut self, name: &str, logic: Value) -> Self {
        self.conditions.insert(name.to_string(), logic);
        self
    }

    /// Returns the gateway.
    #[must_use]
    pub fn gateway(&self) -> &'a dyn EntityGateway {
        self.gateway
    }

    /// Returns the ambient location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&EntityId> {
        self.location.as_ref()
    }

    /// Returns the trace collector, if any.
    #[must_use]
    pub fn trace(&self) -> Option<&'a TraceCollector> {
        self.trace
    }

    /// Returns the context variables.
    #[must_use]
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Returns a named condition.
    #[must_use]
    pub fn condition(&self, name: &str) -> Option<&Value> {
        self.conditions.get(name)
    }
}

impl fmt::Debug for ContextBundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBundle")
            .field("location", &self.location)
            .field("tracing", &self.trace.is_some())
            .field("variables", &self.variables.len())
            .field("conditions", &self.conditions.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Resolution Context
// =============================================================================

/// Everything a resolver needs, borrowed for the duration of one query.
#[derive(Clone, Copy)]
pub struct ResolutionContext<'a> {
    actor: &'a EntityId,
    bundle: &'a ContextBundle<'a>,
    dispatcher: &'a Dispatcher,
    cache: &'a PriorityCache,
    config: &'a EngineConfig,
    depth: usize,
}

impl<'a> ResolutionContext<'a> {
    /// Creates a root context at depth zero.
    #[must_use]
    pub fn new(
        actor: &'a EntityId,
        bundle: &'a ContextBundle<'a>,
        dispatcher: &'a Dispatcher,
        cache: &'a PriorityCache,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            actor,
            bundle,
            dispatcher,
            cache,
            config,
            depth: 0,
        }
    }

    /// Returns a child context one level deeper.
    #[must_use]
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Resolves a child node through the dispatcher, one level deeper.
    ///
    /// # Errors
    ///
    /// Propagates any error from resolving `node`.
    pub fn resolve(&self, node: &Node) -> Result<ResultSet> {
        self.dispatcher.resolve(node, &self.descend())
    }

    /// Returns the acting entity.
    #[must_use]
    pub fn actor(&self) -> &'a EntityId {
        self.actor
    }

    /// Returns the ambient location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&'a EntityId> {
        self.bundle.location()
    }

    /// Returns the gateway.
    #[must_use]
    pub fn gateway(&self) -> &'a dyn EntityGateway {
        self.bundle.gateway()
    }

    /// Returns the caller's bundle.
    #[must_use]
    pub fn bundle(&self) -> &'a ContextBundle<'a> {
        self.bundle
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Returns the current recursion depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns a slot resolver over the shared cache, with the configured
    /// tie-break policy.
    #[must_use]
    pub fn slot_resolver(&self) -> SlotResolver<'a> {
        SlotResolver::new(self.cache).with_tie_break(self.config.coverage_tie_break)
    }

    /// Records a trace entry if a collector is attached.
    pub fn record(&self, entry: TraceEntry) {
        if let Some(trace) = self.bundle.trace() {
            trace.record(entry);
        }
    }
}

impl fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("actor", self.actor)
            .field("bundle", self.bundle)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
