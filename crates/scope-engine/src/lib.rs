//! # Scope Engine
//!
//! Resolves scope queries over an entity/component graph: which entities
//! (or values) a query such as `actor.topmost_clothing.torso_upper` or
//! `entities(core:actor)[{"==": [...]}]` refers to for a given actor.
//!
//! A query arrives as an already-parsed [`Node`] tree. The engine walks it
//! bottom-up: each node is routed by the [`Dispatcher`] to one
//! [`NodeResolver`], which resolves its parent first and transforms the
//! parent's candidates into its own.
//!
//! ## Architecture
//!
//! ```text
//! ScopeEngine::resolve(ast, actor, bundle)
//!         │
//!         ▼
//!    Dispatcher ── depth / size bounds
//!         │
//!         ├── ClothingStepResolver ─┐
//!         ├── SlotAccessResolver ───┼── wardrobe::SlotResolver + PriorityCache
//!         ├── ArrayIterationResolver┘
//!         ├── SourceResolver, StepResolver, UnionResolver
//!         └── FilterResolver ── logic::LogicEnv
//!         │
//!         ▼
//!    EntityGateway (read-only)
//! ```
//!
//! Clothing semantics (layers, coverage blocking, priority scoring) live in
//! the [`wardrobe`] crate, re-exported here.
//!
//! ## Quick Start
//!
//! ```
//! use scope_engine::{ContextBundle, EntityId, InMemoryGateway, Node, ScopeEngine};
//! use serde_json::json;
//!
//! let mut gateway = InMemoryGateway::new();
//! gateway.insert_component(
//!     "hero",
//!     "clothing:equipment",
//!     json!({ "equipped": {
//!         "legs": { "outer": "trousers" },
//!         "torso_lower": { "underwear": "boxer_brief" },
//!     } }),
//! );
//! gateway.insert_component(
//!     "trousers",
//!     "clothing:coverage_mapping",
//!     json!({ "covers": ["torso_lower"], "coveragePriority": "outer" }),
//! );
//!
//! let engine = ScopeEngine::new();
//! let actor = EntityId::new("hero");
//! let bundle = ContextBundle::new(&gateway);
//!
//! // The trousers cover the underwear.
//! let visible = engine
//!     .resolve(&Node::actor().step("topmost_clothing").step("torso_lower"), &actor, &bundle)
//!     .unwrap();
//! assert!(visible.contains_entity("trousers"));
//! assert!(!visible.contains_entity("boxer_brief"));
//!
//! // Asking for the underwear layer explicitly still finds it.
//! let underwear = engine
//!     .resolve(&Node::actor().step("underwear").step("torso_lower"), &actor, &bundle)
//!     .unwrap();
//! assert!(underwear.contains_entity("boxer_brief"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use wardrobe;

pub mod ast;
pub mod candidate;
pub mod config;
pub mod context;
pub mod engine;
pub mod entity;
pub mod error;
pub mod logic;
pub mod resolver;
pub mod trace;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use ast::{Node, NodeKind, SourceKind};
pub use candidate::{Candidate, ResultSet, ScopeResult, ScopeValue, SlotAccess};
pub use config::EngineConfig;
pub use context::{ContextBundle, ResolutionContext};
pub use engine::ScopeEngine;
pub use entity::{EntityGateway, EntityId, GatewayError, InMemoryGateway};
pub use error::{LogicError, Result, ScopeError};
pub use resolver::{Dispatcher, NodeResolver, Precedence};
pub use trace::{TraceCollector, TraceEntry, TraceLevel};
