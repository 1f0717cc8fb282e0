//! Coverage mappings and the [`Outfit`] snapshot.
//!
//! A coverage mapping is per-item metadata declaring which slots an item
//! visually occludes and with what [`PriorityClass`]. Coverage lets a garment
//! worn in one slot (trousers in `legs`) hide items in a related slot
//! (underwear in `torso_lower`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::equipment::{EquippedItems, ItemId};
use crate::error::{EquipmentError, Result};
use crate::slot::Layer;

// =============================================================================
// Priority Class
// =============================================================================

/// Coverage priority class of an item. Lower weight is more prominent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    /// Outer garments.
    Outer,
    /// Base garments.
    Base,
    /// Underwear.
    Underwear,
    /// Accessory-equivalent items.
    Direct,
}

impl PriorityClass {
    /// Returns the class weight used in priority scores.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Outer => 100,
            Self::Base => 200,
            Self::Underwear => 300,
            Self::Direct => 400,
        }
    }

    /// Class assumed for an item with no coverage mapping, from its layer.
    #[must_use]
    pub const fn for_layer(layer: Layer) -> Self {
        match layer {
            Layer::Outer => Self::Outer,
            Layer::Base => Self::Base,
            Layer::Underwear => Self::Underwear,
            Layer::Accessories => Self::Direct,
        }
    }

    /// Returns true if `self` is equal-or-higher priority than `other`.
    #[must_use]
    pub fn at_least(self, other: Self) -> bool {
        self.weight() <= other.weight()
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outer => write!(f, "outer"),
            Self::Base => write!(f, "base"),
            Self::Underwear => write!(f, "underwear"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

/// Weight of a layer within its priority class.
#[must_use]
pub const fn layer_weight(layer: Layer) -> u32 {
    match layer {
        Layer::Outer => 10,
        Layer::Base => 20,
        Layer::Underwear => 30,
        Layer::Accessories => 40,
    }
}

// =============================================================================
// Coverage Mapping
// =============================================================================

/// Declared coverage of a single item.
///
/// Mirrors the `clothing:coverage_mapping` component:
///
/// ```
/// use wardrobe::{CoverageMapping, PriorityClass};
/// use serde_json::json;
///
/// let mapping = CoverageMapping::from_value(
///     "trousers",
///     &json!({ "covers": ["torso_lower"], "coveragePriority": "outer" }),
/// ).unwrap();
///
/// assert!(mapping.covers("torso_lower"));
/// assert_eq!(mapping.coverage_priority, PriorityClass::Outer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMapping {
    /// Slots this item occludes.
    pub covers: Vec<String>,
    /// Priority class of the coverage.
    pub coverage_priority: PriorityClass,
}

impl CoverageMapping {
    /// Creates a mapping.
    #[must_use]
    pub fn new<I, S>(covers: I, priority: PriorityClass) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            covers: covers.into_iter().map(Into::into).collect(),
            coverage_priority: priority,
        }
    }

    /// Parses a coverage mapping component for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`EquipmentError::MalformedCoverage`] if the value does not
    /// match the component shape.
    pub fn from_value(item: &str, value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| EquipmentError::MalformedCoverage {
            item: item.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns true if this mapping lists `slot`.
    #[must_use]
    pub fn covers(&self, slot: &str) -> bool {
        self.covers.iter().any(|covered| covered == slot)
    }
}

// =============================================================================
// Outfit
// =============================================================================

/// An entity's equipped items together with the coverage mappings of those
/// items, captured once per query so slot resolution never goes back to the
/// entity store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outfit {
    items: EquippedItems,
    coverage: BTreeMap<ItemId, CoverageMapping>,
}

impl Outfit {
    /// Creates an outfit with no coverage mappings.
    #[must_use]
    pub fn new(items: EquippedItems) -> Self {
        Self {
            items,
            coverage: BTreeMap::new(),
        }
    }

    /// Builder form of [`set_coverage`](Self::set_coverage).
    #[must_use]
    pub fn with_coverage(mut self, item: &str, mapping: CoverageMapping) -> Self {
        self.set_coverage(item, mapping);
        self
    }

    /// Records the coverage mapping of a worn item.
    pub fn set_coverage(&mut self, item: &str, mapping: CoverageMapping) {
        self.coverage.insert(item.to_string(), mapping);
    }

    /// Returns the equipped items.
    #[must_use]
    pub fn items(&self) -> &EquippedItems {
        &self.items
    }

    /// Returns the coverage mapping of `item`, if it declares one.
    #[must_use]
    pub fn coverage_for(&self, item: &str) -> Option<&CoverageMapping> {
        self.coverage.get(item)
    }

    /// Returns true if any worn item declares coverage.
    #[must_use]
    pub fn has_coverage_declarations(&self) -> bool {
        !self.coverage.is_empty()
    }

    /// Returns true if nothing is worn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
