//! Equipped-items map: body slot name → layer → item id.
//!
//! The map is owned by the entity/component layer and arrives as JSON
//! component data. [`EquippedItems::from_value`] converts the `equipped`
//! object into a typed map with deterministic (`BTreeMap`) iteration order.
//!
//! # Tolerated irregularities
//!
//! - Unknown layer keys are skipped (logged at debug level).
//! - A slot that is not an object, or a layer whose value is not a single
//!   item id, is skipped and logged at warn level. The rest of the map is
//!   kept. Lists are rejected: the map stores at most one item per
//!   (slot, layer).
//! - Slots outside [`BodySlot`](crate::BodySlot) are kept under their raw key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EquipmentError, Result};
use crate::slot::{Layer, LayerSet};

/// Identifier of a worn item (an entity id in the host's graph).
pub type ItemId = String;

/// Per-entity worn items, keyed by slot name then layer.
///
/// # Example
///
/// ```
/// use wardrobe::{EquippedItems, Layer};
///
/// let items = EquippedItems::new()
///     .with("torso_upper", Layer::Outer, "jacket")
///     .with("torso_upper", Layer::Base, "shirt");
///
/// assert_eq!(items.item_at("torso_upper", Layer::Outer), Some("jacket"));
/// assert_eq!(items.occupied_layers("torso_upper").count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItems {
    slots: BTreeMap<String, BTreeMap<Layer, ItemId>>,
}

impl EquippedItems {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`equip`](Self::equip).
    #[must_use]
    pub fn with(mut self, slot: &str, layer: Layer, item: &str) -> Self {
        self.equip(slot, layer, item);
        self
    }

    /// Places `item` at (`slot`, `layer`), returning the item it replaced.
    pub fn equip(&mut self, slot: &str, layer: Layer, item: &str) -> Option<ItemId> {
        self.slots
            .entry(slot.to_string())
            .or_default()
            .insert(layer, item.to_string())
    }

    /// Parses the `equipped` object of an equipment component.
    ///
    /// `null` yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`EquipmentError::Malformed`] when the value is neither
    /// `null` nor a JSON object.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(object) => object,
            other => {
                return Err(EquipmentError::Malformed {
                    reason: format!("equipped must be an object, found {}", json_type(other)),
                })
            }
        };

        let mut items = Self::new();
        for (slot, layers) in object {
            let Value::Object(layers) = layers else {
                tracing::warn!(
                    slot = %slot,
                    found = json_type(layers),
                    "skipping slot that does not map layers to items"
                );
                continue;
            };
            for (key, entry) in layers {
                let Some(layer) = Layer::from_key(key) else {
                    tracing::debug!(slot = %slot, layer = %key, "skipping unknown layer");
                    continue;
                };
                match entry {
                    Value::String(item) => {
                        items.equip(slot, layer, item);
                    }
                    Value::Null => {}
                    other => tracing::warn!(
                        slot = %slot,
                        layer = %layer,
                        found = json_type(other),
                        "skipping layer that does not hold a single item id"
                    ),
                }
            }
        }
        Ok(items)
    }

    /// Returns the item at (`slot`, `layer`), if any.
    #[must_use]
    pub fn item_at(&self, slot: &str, layer: Layer) -> Option<&str> {
        self.slots.get(slot)?.get(&layer).map(String::as_str)
    }

    /// Iterates the occupied layers of a slot, outermost first.
    pub fn occupied_layers<'a>(
        &'a self,
        slot: &str,
    ) -> impl Iterator<Item = (Layer, &'a str)> + 'a {
        self.slots
            .get(slot)
            .into_iter()
            .flat_map(|layers| layers.iter().map(|(layer, item)| (*layer, item.as_str())))
    }

    /// Iterates the occupied layers of a slot that `admitted` contains.
    pub fn layers_in<'a>(
        &'a self,
        slot: &str,
        admitted: LayerSet,
    ) -> impl Iterator<Item = (Layer, &'a str)> + 'a {
        self.occupied_layers(slot)
            .filter(move |(layer, _)| admitted.admits(*layer))
    }

    /// Iterates slot names in sorted order.
    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Iterates every `(slot, layer, item)` triple in slot then layer order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Layer, &str)> {
        self.slots.iter().flat_map(|(slot, layers)| {
            layers
                .iter()
                .map(move |(layer, item)| (slot.as_str(), *layer, item.as_str()))
        })
    }

    /// Returns the number of occupied (slot, layer) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.values().map(BTreeMap::len).sum()
    }

    /// Returns true if nothing is worn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(BTreeMap::is_empty)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_object() {
        let items = EquippedItems::from_value(&json!({
            "torso_upper": { "outer": "jacket", "base": "shirt" },
            "feet": { "outer": "boots" }
        }))
        .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items.item_at("torso_upper", Layer::Base), Some("shirt"));
        assert_eq!(items.item_at("feet", Layer::Outer), Some("boots"));
        assert_eq!(items.item_at("feet", Layer::Base), None);
    }

    #[test]
    fn null_is_empty() {
        let items = EquippedItems::from_value(&Value::Null).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn rejects_non_object() {
        let err = EquippedItems::from_value(&json!(["jacket"])).unwrap_err();
        assert!(matches!(err, EquipmentError::Malformed { .. }));
    }

    #[test]
    fn malformed_slot_keeps_other_slots() {
        let items = EquippedItems::from_value(&json!({
            "feet": "boots",
            "torso_upper": { "outer": "jacket" }
        }))
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.item_at("torso_upper", Layer::Outer), Some("jacket"));
        assert_eq!(items.slot_names().collect::<Vec<_>>(), vec!["torso_upper"]);
    }

    #[test]
    fn skips_unknown_layers() {
        let items = EquippedItems::from_value(&json!({
            "torso_upper": { "outer": "jacket", "armor": "plate" }
        }))
        .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn list_layer_is_skipped() {
        let items = EquippedItems::from_value(&json!({
            "hands": { "base": "gloves", "accessories": ["watch", "bracelet"] },
            "neck": { "accessories": ["amulet"] }
        }))
        .unwrap();
        assert_eq!(items.item_at("hands", Layer::Base), Some("gloves"));
        assert_eq!(items.item_at("hands", Layer::Accessories), None);
        assert_eq!(items.item_at("neck", Layer::Accessories), None);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn non_string_layer_is_skipped() {
        let items = EquippedItems::from_value(&json!({
            "torso_upper": { "outer": 42, "base": "shirt", "underwear": null }
        }))
        .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.item_at("torso_upper", Layer::Base), Some("shirt"));
    }

    #[test]
    fn occupied_layers_are_outermost_first() {
        let items = EquippedItems::new()
            .with("torso_lower", Layer::Underwear, "boxer_brief")
            .with("torso_lower", Layer::Outer, "trousers");
        let layers: Vec<_> = items.occupied_layers("torso_lower").collect();
        assert_eq!(
            layers,
            vec![(Layer::Outer, "trousers"), (Layer::Underwear, "boxer_brief")]
        );
    }

    #[test]
    fn layers_in_filters_by_set() {
        let items = EquippedItems::new()
            .with("hands", Layer::Base, "gloves")
            .with("hands", Layer::Accessories, "ring");
        assert_eq!(items.layers_in("hands", LayerSet::GARMENTS).count(), 1);
        assert_eq!(items.layers_in("hands", LayerSet::all()).count(), 2);
    }

    #[test]
    fn equip_replaces_existing() {
        let mut items = EquippedItems::new().with("feet", Layer::Outer, "boots");
        let old = items.equip("feet", Layer::Outer, "sandals");
        assert_eq!(old.as_deref(), Some("boots"));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn iteration_is_sorted_by_slot() {
        let items = EquippedItems::new()
            .with("torso_upper", Layer::Outer, "jacket")
            .with("feet", Layer::Outer, "boots");
        let slots: Vec<_> = items.slot_names().collect();
        assert_eq!(slots, vec!["feet", "torso_upper"]);
    }
}
