//! Layer-priority resolution with coverage blocking.
//!
//! Given an [`Outfit`], a slot name and a [`ClothingMode`], the
//! [`SlotResolver`] decides which item(s) a query sees in that slot.
//!
//! # Algorithm
//!
//! 1. Direct candidates: items worn in the slot at each layer the mode admits.
//! 2. Covering candidates (coverage-aware modes only): items worn in other
//!    slots, at an admitted layer, whose coverage mapping lists the slot.
//! 3. Every candidate is scored `class weight + layer weight` through the
//!    [`PriorityCache`]; lower scores are more prominent.
//! 4. Candidates are ordered by score. On equal score a direct candidate
//!    comes first (locality wins ties); ties between covering candidates
//!    follow the [`CoverageTieBreak`] policy.
//! 5. Single-pick modes return the first candidate, so a winning covering
//!    item excludes the nominally topmost item of the slot itself.
//! 6. `all` returns every candidate not blocked by an earlier candidate that
//!    declares coverage over the slot with an equal-or-higher class.
//!
//! # Fast Path
//!
//! When the slot has exactly one occupied admitted layer and no worn item
//! declares coverage, the result is the plain layer read
//! ([`ResolutionStrategy::Legacy`]). Callers can observe the path taken
//! through [`SlotResolution::strategy`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coverage::{Outfit, PriorityClass};
use crate::equipment::ItemId;
use crate::priority::PriorityCache;
use crate::slot::{ClothingMode, Layer};

// =============================================================================
// Policy and Report Types
// =============================================================================

/// Which path resolved a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Plain layer read, no scoring.
    Legacy,
    /// Full scoring with coverage candidates.
    Coverage,
}

impl ResolutionStrategy {
    /// Returns the marker written to traces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Coverage => "coverage",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tie-break between covering items from different slots with equal scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageTieBreak {
    /// The item worn in the lexicographically first slot wins.
    #[default]
    SlotOrder,
    /// Every tied covering item is returned.
    IncludeAll,
}

/// Result of resolving one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotResolution {
    /// Visible items, most prominent first.
    pub items: Vec<ItemId>,
    /// Path taken.
    pub strategy: ResolutionStrategy,
}

/// Result of resolving every slot of an outfit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutfitResolution {
    /// Visible items in slot order, deduplicated.
    pub items: Vec<ItemId>,
    /// Slots resolved through the fast path.
    pub legacy_slots: usize,
    /// Slots resolved through full scoring.
    pub coverage_slots: usize,
}

impl OutfitResolution {
    /// Strategy summary for traces: `coverage` if any slot needed scoring.
    #[must_use]
    pub fn strategy(&self) -> ResolutionStrategy {
        if self.coverage_slots > 0 {
            ResolutionStrategy::Coverage
        } else {
            ResolutionStrategy::Legacy
        }
    }
}

// =============================================================================
// Slot Resolver
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Ranked<'o> {
    item: &'o str,
    layer: Layer,
    class: PriorityClass,
    score: u32,
    /// Slot the item is worn in, when it reaches this slot through coverage.
    covering_slot: Option<&'o str>,
    /// The item's mapping lists the queried slot.
    declares: bool,
}

/// Resolves slots of an outfit under a clothing mode.
///
/// # Example
///
/// ```
/// use wardrobe::{
///     ClothingMode, CoverageMapping, EquippedItems, Layer, Outfit, PriorityCache,
///     PriorityClass, ResolutionStrategy, SlotResolver,
/// };
///
/// let items = EquippedItems::new()
///     .with("legs", Layer::Outer, "trousers")
///     .with("torso_lower", Layer::Underwear, "boxer_brief");
/// let outfit = Outfit::new(items).with_coverage(
///     "trousers",
///     CoverageMapping::new(["torso_lower"], PriorityClass::Outer),
/// );
///
/// let cache = PriorityCache::default();
/// let resolver = SlotResolver::new(&cache);
/// let result = resolver.resolve_slot(&outfit, "torso_lower", ClothingMode::Topmost);
///
/// assert_eq!(result.items, vec!["trousers".to_string()]);
/// assert_eq!(result.strategy, ResolutionStrategy::Coverage);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SlotResolver<'a> {
    cache: &'a PriorityCache,
    tie_break: CoverageTieBreak,
}

impl<'a> SlotResolver<'a> {
    /// Creates a resolver scoring through `cache`.
    #[must_use]
    pub fn new(cache: &'a PriorityCache) -> Self {
        Self {
            cache,
            tie_break: CoverageTieBreak::default(),
        }
    }

    /// Sets the covering-item tie-break policy.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: CoverageTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Resolves a single slot, choosing the fast path when it applies.
    #[must_use]
    pub fn resolve_slot(&self, outfit: &Outfit, slot: &str, mode: ClothingMode) -> SlotResolution {
        let strategy = Self::strategy_for(outfit, slot, mode);
        let items = match strategy {
            ResolutionStrategy::Legacy => Self::legacy(outfit, slot, mode),
            ResolutionStrategy::Coverage => self.coverage(outfit, slot, mode),
        };
        tracing::trace!(slot, %mode, %strategy, found = items.len(), "slot resolved");
        SlotResolution { items, strategy }
    }

    /// Resolves every slot of the outfit in slot-name order.
    #[must_use]
    pub fn resolve_outfit(&self, outfit: &Outfit, mode: ClothingMode) -> OutfitResolution {
        let mut resolution = OutfitResolution::default();
        let mut seen = HashSet::new();
        for slot in outfit.items().slot_names() {
            let slot_result = self.resolve_slot(outfit, slot, mode);
            match slot_result.strategy {
                ResolutionStrategy::Legacy => resolution.legacy_slots += 1,
                ResolutionStrategy::Coverage => resolution.coverage_slots += 1,
            }
            for item in slot_result.items {
                if seen.insert(item.clone()) {
                    resolution.items.push(item);
                }
            }
        }
        resolution
    }

    /// Picks the path for a slot.
    #[must_use]
    pub fn strategy_for(outfit: &Outfit, slot: &str, mode: ClothingMode) -> ResolutionStrategy {
        if !mode.uses_coverage() {
            return ResolutionStrategy::Legacy;
        }
        let occupied = outfit.items().layers_in(slot, mode.layers()).count();
        if occupied == 1 && !outfit.has_coverage_declarations() {
            ResolutionStrategy::Legacy
        } else {
            ResolutionStrategy::Coverage
        }
    }

    /// Plain layer read: the first occupied admitted layer, or every
    /// occupied admitted layer for `all`.
    #[must_use]
    pub fn legacy(outfit: &Outfit, slot: &str, mode: ClothingMode) -> Vec<ItemId> {
        let layers = outfit.items().layers_in(slot, mode.layers());
        if mode.picks_single() {
            layers.take(1).map(|(_, item)| item.to_string()).collect()
        } else {
            layers.map(|(_, item)| item.to_string()).collect()
        }
    }

    /// Full scoring path, regardless of whether the fast path would apply.
    #[must_use]
    pub fn coverage(&self, outfit: &Outfit, slot: &str, mode: ClothingMode) -> Vec<ItemId> {
        let ranked = self.rank(outfit, slot, mode);
        if mode.picks_single() {
            self.pick_topmost(&ranked)
        } else {
            Self::visible(&ranked)
        }
    }

    fn rank<'o>(&self, outfit: &'o Outfit, slot: &str, mode: ClothingMode) -> Vec<Ranked<'o>> {
        let admitted = mode.layers();
        let mut ranked = Vec::new();

        for (layer, item) in outfit.items().layers_in(slot, admitted) {
            let mapping = outfit.coverage_for(item);
            let class = mapping.map_or(PriorityClass::for_layer(layer), |m| m.coverage_priority);
            ranked.push(Ranked {
                item,
                layer,
                class,
                score: self.cache.score(class, layer),
                covering_slot: None,
                declares: mapping.is_some_and(|m| m.covers(slot)),
            });
        }

        if mode.uses_coverage() {
            for (worn_in, layer, item) in outfit.items().iter() {
                if worn_in == slot || !admitted.admits(layer) {
                    continue;
                }
                let Some(mapping) = outfit.coverage_for(item) else {
                    continue;
                };
                if !mapping.covers(slot) {
                    continue;
                }
                let class = mapping.coverage_priority;
                ranked.push(Ranked {
                    item,
                    layer,
                    class,
                    score: self.cache.score(class, layer),
                    covering_slot: Some(worn_in),
                    declares: true,
                });
            }
        }

        ranked.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.covering_slot.is_some().cmp(&b.covering_slot.is_some()))
                .then_with(|| a.covering_slot.cmp(&b.covering_slot))
                .then_with(|| a.layer.cmp(&b.layer))
        });
        ranked
    }

    fn pick_topmost(&self, ranked: &[Ranked<'_>]) -> Vec<ItemId> {
        let Some(first) = ranked.first() else {
            return Vec::new();
        };
        let mut items = vec![first.item.to_string()];
        if self.tie_break == CoverageTieBreak::IncludeAll && first.covering_slot.is_some() {
            for tied in ranked[1..]
                .iter()
                .take_while(|r| r.score == first.score && r.covering_slot.is_some())
            {
                if !items.iter().any(|item| item == tied.item) {
                    items.push(tied.item.to_string());
                }
            }
        }
        items
    }

    fn visible(ranked: &[Ranked<'_>]) -> Vec<ItemId> {
        let mut items: Vec<ItemId> = Vec::new();
        for (index, candidate) in ranked.iter().enumerate() {
            let blocked = ranked[..index].iter().any(|earlier| {
                earlier.declares
                    && earlier.item != candidate.item
                    && earlier.class.at_least(candidate.class)
            });
            if !blocked && !items.iter().any(|item| item == candidate.item) {
                items.push(candidate.item.to_string());
            }
        }
        items
    }
}
