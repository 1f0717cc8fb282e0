//! Closed vocabularies for equipment queries.
//!
//! - [`BodySlot`]: the body locations a slot step may name
//! - [`Layer`]: positions within a slot, ordered from topmost to innermost
//! - [`LayerSet`]: a bit set of layers admitted by a query mode
//! - [`ClothingMode`]: the clothing query semantics requested by a field name
//!
//! All three enumerations are bit-exact contracts with query authors: the
//! string forms returned by `as_str()` are the field names that appear in
//! queries and in equipment component data.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// Body Slot
// =============================================================================

/// A named body-location equipment anchor.
///
/// Equipment data may contain slot keys outside this vocabulary; those still
/// take part in whole-outfit queries but cannot be addressed by a slot step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySlot {
    /// Chest and shoulders.
    TorsoUpper,
    /// Hips and groin.
    TorsoLower,
    /// Legs.
    Legs,
    /// Feet.
    Feet,
    /// Head.
    HeadGear,
    /// Hands.
    Hands,
    /// Left arm.
    LeftArmClothing,
    /// Right arm.
    RightArmClothing,
}

impl BodySlot {
    /// Every slot, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::TorsoUpper,
        Self::TorsoLower,
        Self::Legs,
        Self::Feet,
        Self::HeadGear,
        Self::Hands,
        Self::LeftArmClothing,
        Self::RightArmClothing,
    ];

    /// Parses a query field name into a slot, if it names one.
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == field)
    }

    /// Returns the field name of this slot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TorsoUpper => "torso_upper",
            Self::TorsoLower => "torso_lower",
            Self::Legs => "legs",
            Self::Feet => "feet",
            Self::HeadGear => "head_gear",
            Self::Hands => "hands",
            Self::LeftArmClothing => "left_arm_clothing",
            Self::RightArmClothing => "right_arm_clothing",
        }
    }
}

impl fmt::Display for BodySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Layer
// =============================================================================

/// A sub-position within a slot.
///
/// Variants are declared in decreasing topmost priority, so the derived
/// `Ord` sorts the outermost layer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Coats, jackets, trousers.
    Outer,
    /// Shirts, dresses.
    Base,
    /// Underwear.
    Underwear,
    /// Jewellery, belts and the like. Only admitted by `all` queries.
    Accessories,
}

impl Layer {
    /// Every layer, outermost first.
    pub const ALL: [Self; 4] = [Self::Outer, Self::Base, Self::Underwear, Self::Accessories];

    /// Parses an equipment-data layer key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.as_str() == key)
    }

    /// Returns the equipment-data key of this layer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outer => "outer",
            Self::Base => "base",
            Self::Underwear => "underwear",
            Self::Accessories => "accessories",
        }
    }

    /// Returns the single-bit [`LayerSet`] for this layer.
    #[must_use]
    pub const fn flag(self) -> LayerSet {
        match self {
            Self::Outer => LayerSet::OUTER,
            Self::Base => LayerSet::BASE,
            Self::Underwear => LayerSet::UNDERWEAR,
            Self::Accessories => LayerSet::ACCESSORIES,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of layers a query mode looks at.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LayerSet: u8 {
        /// The outer layer.
        const OUTER = 0b0001;
        /// The base layer.
        const BASE = 0b0010;
        /// The underwear layer.
        const UNDERWEAR = 0b0100;
        /// The accessories layer.
        const ACCESSORIES = 0b1000;
        /// Outer, base and underwear.
        const GARMENTS = Self::OUTER.bits() | Self::BASE.bits() | Self::UNDERWEAR.bits();
    }
}

impl LayerSet {
    /// Iterates the layers in this set, outermost first.
    pub fn ordered(self) -> impl Iterator<Item = Layer> {
        Layer::ALL
            .into_iter()
            .filter(move |layer| self.contains(layer.flag()))
    }

    /// Returns true if the set admits the given layer.
    #[must_use]
    pub fn admits(self, layer: Layer) -> bool {
        self.contains(layer.flag())
    }
}

// =============================================================================
// Clothing Mode
// =============================================================================

/// The clothing-query semantics requested by a reserved field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClothingMode {
    /// The single most visible item per slot.
    Topmost,
    /// Same as `Topmost`; never considers accessories.
    TopmostNoAccessories,
    /// Every visible item, accessories included.
    All,
    /// Only the outer layer.
    Outer,
    /// Only the base layer.
    Base,
    /// Only the underwear layer.
    Underwear,
}

impl ClothingMode {
    /// Every mode, in vocabulary order.
    pub const ALL: [Self; 6] = [
        Self::Topmost,
        Self::TopmostNoAccessories,
        Self::All,
        Self::Outer,
        Self::Base,
        Self::Underwear,
    ];

    /// Parses a reserved clothing field name.
    ///
    /// ```
    /// use wardrobe::ClothingMode;
    ///
    /// assert_eq!(ClothingMode::from_field("topmost_clothing"), Some(ClothingMode::Topmost));
    /// assert_eq!(ClothingMode::from_field("underwear"), Some(ClothingMode::Underwear));
    /// assert_eq!(ClothingMode::from_field("core:name"), None);
    /// ```
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.field_name() == field)
    }

    /// Returns the reserved field name that selects this mode.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Topmost => "topmost_clothing",
            Self::TopmostNoAccessories => "topmost_clothing_no_accessories",
            Self::All => "all_clothing",
            Self::Outer => "outer_clothing",
            Self::Base => "base_clothing",
            Self::Underwear => "underwear",
        }
    }

    /// Returns the layers this mode scans.
    #[must_use]
    pub const fn layers(self) -> LayerSet {
        match self {
            Self::Topmost | Self::TopmostNoAccessories => LayerSet::GARMENTS,
            Self::All => LayerSet::all(),
            Self::Outer => LayerSet::OUTER,
            Self::Base => LayerSet::BASE,
            Self::Underwear => LayerSet::UNDERWEAR,
        }
    }

    /// Returns true if the mode yields at most one item per slot.
    #[must_use]
    pub const fn picks_single(self) -> bool {
        !matches!(self, Self::All)
    }

    /// Returns true if items in other slots may occlude or stand in for the
    /// queried slot. Single-layer modes are explicit layer reads.
    #[must_use]
    pub const fn uses_coverage(self) -> bool {
        matches!(self, Self::Topmost | Self::TopmostNoAccessories | Self::All)
    }
}

impl fmt::Display for ClothingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}
