//! Bounded memo table for priority scores.
//!
//! A priority score orders candidates for a slot: `class weight + layer
//! weight`, lower is more prominent. Scores are a pure function of
//! `(PriorityClass, Layer)`, so entries never need invalidation. The table
//! is only bounded for size: when it reaches capacity it is cleared before
//! the next insert.
//!
//! # Thread Safety
//!
//! The table sits behind a `Mutex` so one cache can be shared by several
//! resolution contexts. The lock is held only for the read-check-insert of
//! a single key and never across recursion, so reentrant use from nested
//! resolvers cannot deadlock. A poisoned lock is recovered: entries are
//! pure, so a panic mid-insert cannot leave a wrong score behind.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::coverage::{layer_weight, PriorityClass};
use crate::slot::Layer;

/// Default number of cached scores.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Hit/miss counters for a [`PriorityCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from the table.
    pub hits: u64,
    /// Lookups that had to compute the score.
    pub misses: u64,
    /// Times the table was cleared for size control.
    pub evictions: u64,
    /// Entries currently held.
    pub current_size: usize,
    /// Maximum entries before the table is cleared.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the table, `0.0` when unused.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct CacheInner {
    scores: HashMap<(PriorityClass, Layer), u32>,
    stats: CacheStats,
}

/// Memoized priority scores keyed by `(PriorityClass, Layer)`.
///
/// # Example
///
/// ```
/// use wardrobe::{Layer, PriorityCache, PriorityClass};
///
/// let cache = PriorityCache::new(16);
/// assert_eq!(cache.score(PriorityClass::Outer, Layer::Outer), 110);
/// assert_eq!(cache.score(PriorityClass::Outer, Layer::Outer), 110);
///
/// let stats = cache.stats();
/// assert_eq!(stats.hits, 1);
/// assert_eq!(stats.misses, 1);
/// ```
#[derive(Debug)]
pub struct PriorityCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl PriorityCache {
    /// Creates a cache holding at most `capacity` scores (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(CacheInner {
                scores: HashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
                stats: CacheStats {
                    capacity,
                    ..CacheStats::default()
                },
            }),
            capacity,
        }
    }

    /// Computes a score without touching the table.
    #[must_use]
    pub const fn compute(class: PriorityClass, layer: Layer) -> u32 {
        class.weight() + layer_weight(layer)
    }

    /// Returns the score for `(class, layer)`, memoizing it.
    pub fn score(&self, class: PriorityClass, layer: Layer) -> u32 {
        let mut inner = self.lock();
        if let Some(&score) = inner.scores.get(&(class, layer)) {
            inner.stats.hits += 1;
            return score;
        }

        inner.stats.misses += 1;
        let score = Self::compute(class, layer);
        if inner.scores.len() >= self.capacity {
            inner.scores.clear();
            inner.stats.evictions += 1;
            tracing::trace!(capacity = self.capacity, "priority cache cleared");
        }
        inner.scores.insert((class, layer), score);
        inner.stats.current_size = inner.scores.len();
        score
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.scores.clear();
        inner.stats = CacheStats {
            capacity: self.capacity,
            ..CacheStats::default()
        };
    }

    /// Returns the number of cached scores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().scores.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PriorityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
