//! Removal capability implementations
//!
//! The real segmentation capability is supplied by the host. This module
//! holds what ships with the crate:
//! - Passthrough capability (input already background-removed)
//! - Mock capabilities for tests

pub mod passthrough;

// Test utilities for capability testing
#[cfg(test)]
pub mod test_utils;

pub use self::passthrough::PassthroughRemover;
