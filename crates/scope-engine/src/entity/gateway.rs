//! The read-only gateway to entity/component storage.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::EntityId;

/// Failure reported by an [`EntityGateway`] implementation.
///
/// Gateway errors are propagated unchanged by the engine; they are never
/// retried or converted into empty results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backing store cannot serve reads.
    #[error("entity store unavailable: {reason}")]
    Unavailable {
        /// Why the store is unavailable
        reason: String,
    },

    /// A single component read failed.
    #[error("failed to read component '{component}' of entity {entity}: {reason}")]
    Read {
        /// Entity being read
        entity: EntityId,
        /// Component being read
        component: String,
        /// Store-specific failure description
        reason: String,
    },
}

/// Read-only accessor for component data.
///
/// Implementations must answer from a consistent snapshot for the duration
/// of one query; the engine may read the same component several times.
///
/// An absent entity is not an error: `component_data` returns `Ok(None)` and
/// `has_component` returns `Ok(false)`.
pub trait EntityGateway: Send + Sync {
    /// Returns the data of `component` on `entity`, if present.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the store cannot be read.
    fn component_data(
        &self,
        entity: &EntityId,
        component: &str,
    ) -> Result<Option<Value>, GatewayError>;

    /// Returns true if `entity` has `component`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the store cannot be read.
    fn has_component(&self, entity: &EntityId, component: &str) -> Result<bool, GatewayError> {
        Ok(self.component_data(entity, component)?.is_some())
    }

    /// Returns every entity having `component`, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the store cannot be read.
    fn entities_with_component(&self, component: &str) -> Result<Vec<EntityId>, GatewayError>;
}

/// `BTreeMap`-backed gateway with deterministic iteration order.
///
/// # Example
///
/// ```
/// use scope_engine::entity::{EntityGateway, EntityId, InMemoryGateway};
/// use serde_json::json;
///
/// let mut gateway = InMemoryGateway::new();
/// gateway.insert_component("npc_2", "core:actor", json!({}));
/// gateway.insert_component("npc_1", "core:actor", json!({}));
///
/// let actors = gateway.entities_with_component("core:actor").unwrap();
/// assert_eq!(actors, vec![EntityId::new("npc_1"), EntityId::new("npc_2")]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryGateway {
    entities: BTreeMap<EntityId, BTreeMap<String, Value>>,
}

impl InMemoryGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets component data on an entity, creating the entity if needed.
    ///
    /// Returns the previous data of the component, if any.
    pub fn insert_component(
        &mut self,
        entity: impl Into<EntityId>,
        component: &str,
        data: Value,
    ) -> Option<Value> {
        self.entities
            .entry(entity.into())
            .or_default()
            .insert(component.to_string(), data)
    }

    /// Removes a component from an entity, returning its data.
    ///
    /// An entity left with no components is removed.
    pub fn remove_component(&mut self, entity: &EntityId, component: &str) -> Option<Value> {
        let components = self.entities.get_mut(entity)?;
        let removed = components.remove(component);
        if components.is_empty() {
            self.entities.remove(entity);
        }
        removed
    }

    /// Returns the number of entities with at least one component.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityGateway for InMemoryGateway {
    fn component_data(
        &self,
        entity: &EntityId,
        component: &str,
    ) -> Result<Option<Value>, GatewayError> {
        Ok(self
            .entities
            .get(entity)
            .and_then(|components| components.get(component))
            .cloned())
    }

    fn has_component(&self, entity: &EntityId, component: &str) -> Result<bool, GatewayError> {
        Ok(self
            .entities
            .get(entity)
            .is_some_and(|components| components.contains_key(component)))
    }

    fn entities_with_component(&self, component: &str) -> Result<Vec<EntityId>, GatewayError> {
        Ok(self
            .entities
            .iter()
            .filter(|(_, components)| components.contains_key(component))
            .map(|(id, _)| id.clone())
            .collect())
    }
}
