//! The query driver.
//!
//! [`ScopeEngine`] owns everything that outlives a single query: the
//! resolver [`Dispatcher`], the shared [`PriorityCache`] and the
//! [`EngineConfig`]. Per-query inputs (actor, gateway, location, variables,
//! trace collector) arrive with each call.
//!
//! # Concurrency
//!
//! The engine is `Send + Sync`. Queries take `&self`, so one engine can
//! serve many threads; the only shared mutable state is the priority cache,
//! which synchronizes internally.
//!
//! # Example
//!
//! ```
//! use scope_engine::{ContextBundle, EntityId, InMemoryGateway, Node, ScopeEngine};
//! use serde_json::json;
//!
//! let mut gateway = InMemoryGateway::new();
//! gateway.insert_component(
//!     "hero",
//!     "clothing:equipment",
//!     json!({ "equipped": { "torso_upper": { "outer": "jacket", "base": "shirt" } } }),
//! );
//!
//! let engine = ScopeEngine::new();
//! let query = Node::actor().step("topmost_clothing").step("torso_upper");
//! let result = engine
//!     .resolve(&query, &EntityId::new("hero"), &ContextBundle::new(&gateway))
//!     .unwrap();
//!
//! assert!(result.contains_entity("jacket"));
//! assert_eq!(result.len(), 1);
//! ```

use wardrobe::{CacheStats, PriorityCache};

use crate::ast::Node;
use crate::candidate::ScopeResult;
use crate::config::EngineConfig;
use crate::context::{ContextBundle, ResolutionContext};
use crate::entity::EntityId;
use crate::error::Result;
use crate::resolver::Dispatcher;

/// Resolves scope queries.
#[derive(Debug)]
pub struct ScopeEngine {
    dispatcher: Dispatcher,
    cache: PriorityCache,
    config: EngineConfig,
}

impl Default for ScopeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeEngine {
    /// Creates an engine with the built-in resolvers and default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the built-in resolvers.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_dispatcher(Dispatcher::with_default_resolvers(), config)
    }

    /// Creates an engine with a caller-assembled dispatcher.
    #[must_use]
    pub fn with_dispatcher(dispatcher: Dispatcher, config: EngineConfig) -> Self {
        Self {
            dispatcher,
            cache: PriorityCache::new(config.cache_capacity),
            config,
        }
    }

    /// Resolves `ast` for `actor`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScopeError`](crate::ScopeError) if the query is
    /// malformed, exceeds a configured bound, ends on an unconsumed slot
    /// access, fails a strict filter, or the gateway fails.
    pub fn resolve(
        &self,
        ast: &Node,
        actor: &EntityId,
        bundle: &ContextBundle<'_>,
    ) -> Result<ScopeResult> {
        let ctx =
            ResolutionContext::new(actor, bundle, &self.dispatcher, &self.cache, &self.config);
        let result = self.dispatcher.resolve(ast, &ctx).map_err(|e| {
            tracing::debug!(actor = %actor, kind = %ast.kind(), error = %e, "scope query failed");
            e
        })?;
        tracing::debug!(
            actor = %actor,
            kind = %ast.kind(),
            size = result.len(),
            "scope query resolved"
        );
        ScopeResult::try_from(result)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns priority cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Empties the priority cache and resets its statistics.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
