//! Entity identifiers and the read-only entity/component gateway.
//!
//! The engine never owns entity state. It reads component data through the
//! [`EntityGateway`] trait, which hosts implement over their own storage.
//! [`InMemoryGateway`] is a `BTreeMap`-backed implementation for tests,
//! demos and small hosts.
//!
//! # Example
//!
//! ```
//! use scope_engine::entity::{EntityGateway, EntityId, InMemoryGateway};
//! use serde_json::json;
//!
//! let mut gateway = InMemoryGateway::new();
//! gateway.insert_component("hero", "core:name", json!({ "text": "Ayla" }));
//!
//! let hero = EntityId::new("hero");
//! assert!(gateway.has_component(&hero, "core:name").unwrap());
//! assert_eq!(gateway.entities_with_component("core:name").unwrap(), vec![hero]);
//! ```

mod gateway;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use gateway::{EntityGateway, GatewayError, InMemoryGateway};

/// Component holding an entity's worn items.
pub const EQUIPMENT_COMPONENT: &str = "clothing:equipment";

/// Field of [`EQUIPMENT_COMPONENT`] holding the slot → layer → item map.
pub const EQUIPPED_FIELD: &str = "equipped";

/// Component on an item entity declaring the slots it covers.
pub const COVERAGE_COMPONENT: &str = "clothing:coverage_mapping";

/// Opaque identifier of an entity in the host's graph.
///
/// Identifiers are strings (`"core:player"`, `"npc_12"`); the engine never
/// interprets them. Ordering is lexicographic, which gives deterministic
/// iteration in [`InMemoryGateway`].
///
/// ```
/// use scope_engine::entity::EntityId;
///
/// let id = EntityId::new("jacket_1");
/// assert_eq!(id.as_str(), "jacket_1");
/// assert_eq!(id.to_string(), "jacket_1");
/// assert!(EntityId::from("a") < EntityId::from("b"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn debug_format() {
            assert_eq!(format!("{:?}", EntityId::new("hero")), "EntityId(hero)");
        }

        #[test]
        fn serializes_as_plain_string() {
            let json = serde_json::to_string(&EntityId::new("npc_7")).unwrap();
            assert_eq!(json, "\"npc_7\"");
            let back: EntityId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, EntityId::new("npc_7"));
        }

        #[test]
        fn usable_in_hash_set() {
            use std::collections::HashSet;
            let mut set = HashSet::new();
            set.insert(EntityId::new("a"));
            set.insert(EntityId::from("a".to_string()));
            assert_eq!(set.len(), 1);
        }

        #[test]
        fn ordering_is_lexicographic() {
            let mut ids = vec![
                EntityId::new("npc_2"),
                EntityId::new("hero"),
                EntityId::new("npc_10"),
            ];
            ids.sort();
            let names: Vec<_> = ids.iter().map(EntityId::as_str).collect();
            assert_eq!(names, vec!["hero", "npc_10", "npc_2"]);
        }
    }
}
