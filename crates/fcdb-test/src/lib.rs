//! Integration test infrastructure for the fabric database
//!
//! Provides:
//! - Fabric fixtures built through the typed API
//! - Capture payloads shaped like management API responses
//! - Alert and status verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
