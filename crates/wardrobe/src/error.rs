//! Error types for equipment data.

use thiserror::Error;

/// Result type alias for equipment operations.
pub type Result<T> = std::result::Result<T, EquipmentError>;

/// Errors raised while reading equipment or coverage component data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EquipmentError {
    /// The equipped-items data does not have the slot → layer → item shape.
    #[error("malformed equipment data: {reason}")]
    Malformed {
        /// What was wrong with the data
        reason: String,
    },

    /// An item's coverage mapping could not be parsed.
    #[error("malformed coverage mapping for item '{item}': {reason}")]
    MalformedCoverage {
        /// The item whose mapping is invalid
        item: String,
        /// What was wrong with the data
        reason: String,
    },
}
