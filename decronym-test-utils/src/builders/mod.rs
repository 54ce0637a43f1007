//! Test data builders and response fixtures

mod definitions;
pub mod fixtures;

pub use definitions::{DefinitionFileBuilder, record, tagged_record};
