//! In-band resolution trace for callers that inspect how a query resolved.
//!
//! Separate from `tracing` logging: a [`TraceCollector`] is passed in by the
//! caller, collects one summary entry per resolver invocation, and is drained
//! with [`TraceCollector::take_entries`]. Entries appear in resolution order,
//! which is deterministic for a given query and entity snapshot.
//!
//! # Example
//!
//! ```
//! use scope_engine::trace::{TraceCollector, TraceEntry, TraceLevel};
//!
//! let trace = TraceCollector::new();
//! trace.record(
//!     TraceEntry::new(TraceLevel::Info, "ClothingStepResolver", "clothing resolved")
//!         .with_field("strategy", "legacy"),
//! );
//!
//! let entries = trace.take_entries();
//! assert_eq!(entries[0].field("strategy"), Some(&"legacy".into()));
//! assert!(trace.is_empty());
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Fine-grained detail.
    Debug,
    /// Per-resolver summaries.
    Info,
    /// Recovered problems.
    Warn,
}

/// One trace record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Severity.
    pub level: TraceLevel,
    /// Human-readable summary.
    pub message: String,
    /// Name of the resolver that emitted the entry.
    pub resolver: String,
    /// Structured details.
    pub fields: Map<String, Value>,
}

impl TraceEntry {
    /// Creates an entry with no fields.
    #[must_use]
    pub fn new(level: TraceLevel, resolver: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            resolver: resolver.to_string(),
            fields: Map::new(),
        }
    }

    /// Adds a structured field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns a structured field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Append-only, thread-safe trace log.
#[derive(Debug, Default)]
pub struct TraceCollector {
    entries: Mutex<Vec<TraceEntry>>,
}

impl TraceCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, entry: TraceEntry) {
        self.lock().push(entry);
    }

    /// Drains and returns all entries in recording order.
    pub fn take_entries(&self) -> Vec<TraceEntry> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a copy of the entries emitted by `resolver`.
    #[must_use]
    pub fn entries_for(&self, resolver: &str) -> Vec<TraceEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.resolver == resolver)
            .cloned()
            .collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no entry is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are plain data, so a writer that panicked mid-push leaves
    // the log usable.
    fn lock(&self) -> MutexGuard<'_, Vec<TraceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
