//! Engine configuration.
//!
//! Every field has a default, so a partial JSON document is a valid config:
//!
//! ```
//! use scope_engine::config::EngineConfig;
//! use wardrobe::CoverageTieBreak;
//!
//! let config = EngineConfig::from_json(r#"{ "strict_filters": true }"#).unwrap();
//! assert!(config.strict_filters);
//! assert_eq!(config.max_depth, 64);
//! assert_eq!(config.coverage_tie_break, CoverageTieBreak::SlotOrder);
//! ```

use serde::{Deserialize, Serialize};
use wardrobe::{CoverageTieBreak, DEFAULT_CACHE_CAPACITY};

/// Default bound on query nesting.
///
/// Conservative development value; hosts with deep generated queries should
/// measure and raise it.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on the size of any intermediate result set.
///
/// Conservative development value, not tuned against production content.
pub const DEFAULT_MAX_CANDIDATES: usize = 100_000;

/// Configuration for a [`ScopeEngine`](crate::ScopeEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Escalate filter evaluation errors instead of excluding the candidate.
    pub strict_filters: bool,
    /// Maximum query depth.
    pub max_depth: usize,
    /// Maximum size of any intermediate result set.
    pub max_candidates: usize,
    /// Capacity of the priority score cache.
    pub cache_capacity: usize,
    /// Tie-break between equal-priority covering items from different slots.
    pub coverage_tie_break: CoverageTieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_filters: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            coverage_tie_break: CoverageTieBreak::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with strict filtering, for content validation.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_filters: true,
            ..Self::default()
        }
    }

    /// Sets the maximum query depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum intermediate result size.
    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Sets the priority cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Sets the covering-item tie-break policy.
    #[must_use]
    pub fn with_coverage_tie_break(mut self, tie_break: CoverageTieBreak) -> Self {
        self.coverage_tie_break = tie_break;
        self
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
