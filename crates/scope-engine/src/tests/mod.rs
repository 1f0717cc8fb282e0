//! Crate-level tests for scope resolution.
//!
//! - **Integration tests**: full queries through the default dispatcher
//! - **Property tests**: idempotence, union laws, and the fast path at scale
//! - **Helper functions**: a shared entity fixture
//!
//! # Test Structure
//!
//! - `integration.rs`: end-to-end query behavior
//! - `properties.rs`: proptest properties and the bulk cache workload
//! - `helpers.rs`: fixture gateway and engine factories

mod helpers;
mod properties;

// Re-export for convenience
pub use helpers::*;
