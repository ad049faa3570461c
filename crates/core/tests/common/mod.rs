//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (sample projects, documents, callback scripts)
//! - Custom assertions on framed answers
//! - Mock collaborators and recording callback handlers

pub mod assertions;
pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mocks::*;
