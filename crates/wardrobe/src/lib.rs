//! # Wardrobe
//!
//! Layered equipment substrate for scope queries over worn items.
//!
//! An entity wears items in named body slots, each slot holding up to one
//! item per layer (outer, base, underwear, accessories). Items may declare
//! coverage over other slots. Wardrobe answers one question: *which items are
//! visible in a slot under a given clothing mode?*
//!
//! - **Typed vocabularies**: [`BodySlot`], [`Layer`], [`ClothingMode`]
//! - **Coverage blocking**: an item declaring coverage hides lower-priority
//!   items, including items worn in other slots
//! - **Memoized scoring**: a bounded [`PriorityCache`] shared across queries
//! - **Fast path**: single-layer slots with no coverage skip scoring
//!
//! ## Quick Start
//!
//! ```rust
//! use wardrobe::{
//!     ClothingMode, CoverageMapping, EquippedItems, Layer, Outfit, PriorityCache,
//!     PriorityClass, SlotResolver,
//! };
//!
//! let items = EquippedItems::new()
//!     .with("torso_lower", Layer::Outer, "trousers")
//!     .with("torso_lower", Layer::Underwear, "boxer_brief");
//! let outfit = Outfit::new(items).with_coverage(
//!     "trousers",
//!     CoverageMapping::new(["torso_lower"], PriorityClass::Outer),
//! );
//!
//! let cache = PriorityCache::default();
//! let resolver = SlotResolver::new(&cache);
//!
//! let visible = resolver.resolve_outfit(&outfit, ClothingMode::All);
//! assert_eq!(visible.items, vec!["trousers".to_string()]);
//!
//! let underwear = resolver.resolve_outfit(&outfit, ClothingMode::Underwear);
//! assert_eq!(underwear.items, vec!["boxer_brief".to_string()]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod coverage;
pub mod equipment;
pub mod error;
pub mod priority;
pub mod resolve;
pub mod slot;

// Re-exports for convenience
pub use coverage::{layer_weight, CoverageMapping, Outfit, PriorityClass};
pub use equipment::{EquippedItems, ItemId};
pub use error::{EquipmentError, Result};
pub use priority::{CacheStats, PriorityCache, DEFAULT_CACHE_CAPACITY};
pub use resolve::{
    CoverageTieBreak, OutfitResolution, ResolutionStrategy, SlotResolution, SlotResolver,
};
pub use slot::{BodySlot, ClothingMode, Layer, LayerSet};
