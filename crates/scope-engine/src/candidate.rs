//! Candidates, result sets and the caller-facing result.
//!
//! Resolvers pass [`ResultSet`]s of [`Candidate`]s between each other. A
//! candidate is either an entity, a plain JSON value, or a transient
//! [`SlotAccess`] descriptor produced by a scalar clothing step and consumed
//! by the following slot step.
//!
//! Descriptors are internal. The driver converts the final set into a
//! [`ScopeResult`], whose [`ScopeValue`] has no descriptor variant; the
//! conversion fails with [`ScopeError::UnresolvedSlotAccess`] if one is left.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wardrobe::{ClothingMode, Outfit};

use crate::entity::EntityId;
use crate::error::ScopeError;

// =============================================================================
// Slot Access Descriptor
// =============================================================================

/// An entity's outfit viewed through a clothing mode, awaiting a slot step.
#[derive(Debug, Clone)]
pub struct SlotAccess {
    entity: EntityId,
    outfit: Arc<Outfit>,
    mode: ClothingMode,
}

impl SlotAccess {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(entity: EntityId, outfit: Arc<Outfit>, mode: ClothingMode) -> Self {
        Self { entity, outfit, mode }
    }

    /// Returns the entity wearing the outfit.
    #[must_use]
    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    /// Returns the outfit snapshot.
    #[must_use]
    pub fn outfit(&self) -> &Outfit {
        &self.outfit
    }

    /// Returns the requested clothing mode.
    #[must_use]
    pub fn mode(&self) -> ClothingMode {
        self.mode
    }
}

// The outfit is a snapshot of the entity's data, so the owner and mode
// identify a descriptor within one query.
impl PartialEq for SlotAccess {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.mode == other.mode
    }
}

impl Eq for SlotAccess {}

impl Hash for SlotAccess {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
        self.mode.hash(state);
    }
}

// =============================================================================
// Candidate
// =============================================================================

/// A member of a [`ResultSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// An entity id.
    Entity(EntityId),
    /// A non-entity field value.
    Value(Value),
    /// A pending slot access.
    SlotAccess(SlotAccess),
}

impl Candidate {
    /// Converts a field value into a candidate: strings are entity ids,
    /// everything else stays a value.
    #[must_use]
    pub fn from_field_value(value: Value) -> Self {
        match value {
            Value::String(id) => Self::Entity(EntityId::from(id)),
            other => Self::Value(other),
        }
    }

    /// Returns the entity id of an entity candidate.
    #[must_use]
    pub fn as_entity(&self) -> Option<&EntityId> {
        match self {
            Self::Entity(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the caller-facing form, or the descriptor if this is one.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnresolvedSlotAccess`] for descriptors.
    pub fn into_scope_value(self) -> Result<ScopeValue, ScopeError> {
        match self {
            Self::Entity(id) => Ok(ScopeValue::Entity(id)),
            Self::Value(value) => Ok(ScopeValue::Value(value)),
            Self::SlotAccess(access) => Err(ScopeError::unresolved(&access)),
        }
    }
}

// `serde_json::Value` has no `Hash`; its compact serialization is canonical
// for hashing because `Eq` on values also compares structurally.
impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Entity(id) => id.hash(state),
            Self::Value(value) => value.to_string().hash(state),
            Self::SlotAccess(access) => access.hash(state),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "{id}"),
            Self::Value(value) => write!(f, "{value}"),
            Self::SlotAccess(access) => write!(f, "{}.{}", access.entity, access.mode),
        }
    }
}

impl From<EntityId> for Candidate {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

// =============================================================================
// Result Set
// =============================================================================

/// Insertion-ordered, deduplicated set of candidates.
///
/// ```
/// use scope_engine::candidate::{Candidate, ResultSet};
/// use scope_engine::entity::EntityId;
///
/// let mut set = ResultSet::new();
/// assert!(set.insert(EntityId::new("b").into()));
/// assert!(set.insert(EntityId::new("a").into()));
/// assert!(!set.insert(EntityId::new("b").into()));
///
/// let order: Vec<String> = set.iter().map(ToString::to_string).collect();
/// assert_eq!(order, vec!["b", "a"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    items: Vec<Candidate>,
    seen: HashSet<Candidate>,
}

impl ResultSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set of entity candidates.
    #[must_use]
    pub fn from_entities<I: IntoIterator<Item = EntityId>>(ids: I) -> Self {
        ids.into_iter().map(Candidate::Entity).collect()
    }

    /// Adds a candidate, returning false if it was already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.seen.contains(&candidate) {
            return false;
        }
        self.seen.insert(candidate.clone());
        self.items.push(candidate);
        true
    }

    /// Returns true if the set contains `candidate`.
    #[must_use]
    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.seen.contains(candidate)
    }

    /// Iterates candidates in first-insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.items.iter().all(|c| other.contains(c))
    }

    /// Consumes the set, returning its candidates in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Candidate> {
        self.items
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for ResultSet {}

impl Extend<Candidate> for ResultSet {
    fn extend<I: IntoIterator<Item = Candidate>>(&mut self, iter: I) {
        for candidate in iter {
            self.insert(candidate);
        }
    }
}

impl FromIterator<Candidate> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ResultSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// =============================================================================
// Scope Result
// =============================================================================

/// A caller-facing member of a [`ScopeResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScopeValue {
    /// An entity id.
    Entity(EntityId),
    /// A non-entity value.
    Value(Value),
}

/// The final, descriptor-free result of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeResult {
    values: Vec<ScopeValue>,
}

impl ScopeResult {
    /// Returns the values in resolution order.
    #[must_use]
    pub fn values(&self) -> &[ScopeValue] {
        &self.values
    }

    /// Iterates the entity ids of the result.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.values.iter().filter_map(|value| match value {
            ScopeValue::Entity(id) => Some(id),
            ScopeValue::Value(_) => None,
        })
    }

    /// Returns true if the result contains the entity `id`.
    #[must_use]
    pub fn contains_entity(&self, id: &str) -> bool {
        self.entities().any(|entity| entity.as_str() == id)
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<ResultSet> for ScopeResult {
    type Error = ScopeError;

    fn try_from(set: ResultSet) -> Result<Self, Self::Error> {
        let values = set
            .into_iter()
            .map(Candidate::into_scope_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }
}

impl IntoIterator for ScopeResult {
    type Item = ScopeValue;
    type IntoIter = std::vec::IntoIter<ScopeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
