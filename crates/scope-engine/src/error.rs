//! Error types for scope resolution.
//!
//! Two error families exist:
//!
//! - [`ScopeError`]: why a query could not be executed. Structural errors are
//!   programmer or content-authoring mistakes and always abort the query.
//! - [`LogicError`]: why a filter predicate failed for one candidate. These
//!   are recovered per candidate unless strict filtering is configured.
//!
//! Missing data is never an error: an entity without equipment, an empty
//! slot or an absent component all resolve to an empty contribution.

use thiserror::Error;
use wardrobe::ClothingMode;

use crate::ast::NodeKind;
use crate::candidate::SlotAccess;
use crate::entity::{EntityId, GatewayError};

/// Result type alias for scope resolution.
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Errors that abort a query.
#[derive(Error, Debug)]
pub enum ScopeError {
    // =========================================================================
    // Structural Errors
    // =========================================================================
    /// No registered resolver accepts the node.
    #[error("no resolver registered for {kind} nodes")]
    NoResolver {
        /// Kind of the unhandled node
        kind: NodeKind,
    },

    /// A slot access descriptor reached a node other than a slot step.
    #[error("'{mode}' of entity {entity} must be followed by a body slot step")]
    UnresolvedSlotAccess {
        /// Owner of the descriptor
        entity: EntityId,
        /// Clothing mode of the descriptor
        mode: ClothingMode,
    },

    /// The query nests deeper than the configured bound.
    #[error("query exceeds maximum depth of {limit}")]
    DepthExceeded {
        /// Configured maximum depth
        limit: usize,
    },

    /// An intermediate result grew past the configured bound.
    #[error("{count} candidates exceed the limit of {limit}")]
    TooManyCandidates {
        /// Size of the offending result set
        count: usize,
        /// Configured maximum
        limit: usize,
    },

    // =========================================================================
    // Filter Errors
    // =========================================================================
    /// A filter predicate failed and strict filtering is enabled.
    #[error("filter evaluation failed for candidate {candidate}: {source}")]
    FilterEvaluation {
        /// Display form of the candidate being tested
        candidate: String,
        /// The underlying evaluation error
        source: LogicError,
    },

    // =========================================================================
    // Gateway Errors
    // =========================================================================
    /// The entity store failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ScopeError {
    /// Builds [`ScopeError::UnresolvedSlotAccess`] for a descriptor.
    #[must_use]
    pub fn unresolved(access: &SlotAccess) -> Self {
        Self::UnresolvedSlotAccess {
            entity: access.entity().clone(),
            mode: access.mode(),
        }
    }

    /// Returns true for errors caused by the shape of the query rather than
    /// by data or the entity store.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NoResolver { .. }
                | Self::UnresolvedSlotAccess { .. }
                | Self::DepthExceeded { .. }
                | Self::TooManyCandidates { .. }
        )
    }
}

/// Errors raised while evaluating a JSON-Logic predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// The operator is not supported.
    #[error("unknown operator '{operator}'")]
    UnknownOperator {
        /// The operator name
        operator: String,
    },

    /// A `var` names a root that is neither bound nor a context variable.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// The variable path
        name: String,
    },

    /// An operator received arguments it cannot use.
    #[error("invalid arguments to '{operator}': {reason}")]
    InvalidArguments {
        /// The operator name
        operator: String,
        /// What was wrong
        reason: String,
    },

    /// A `condition_ref` names a condition the context does not define.
    #[error("unknown condition '{name}'")]
    UnknownCondition {
        /// The condition id
        name: String,
    },

    /// A `condition_ref` chain refers back to itself.
    #[error("condition '{name}' refers to itself")]
    ConditionCycle {
        /// The condition id that closed the cycle
        name: String,
    },

    /// A component read inside the predicate failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl LogicError {
    pub(crate) fn invalid(operator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }
}
