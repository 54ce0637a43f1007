//! Test utilities for decronym
//!
//! This crate provides a scripted HTTP transport, definition file builders
//! and response fixtures for testing providers and the aggregator.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{DefinitionFileBuilder, fixtures, record, tagged_record};
pub use mocks::{MockTransport, RecordedCall};
