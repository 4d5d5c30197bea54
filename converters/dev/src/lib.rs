//! Development and testing utilities for mdext converters.
//!
//! This crate provides shared utilities for developing and testing converters:
//!
//! - [`generate_fixtures`] - Fixture generation for integration tests
//! - [`output`] - Output normalization for test comparisons

pub mod generate_fixtures;
pub mod output;
