//! Mock implementations for testing

mod transport;

pub use transport::{MockTransport, RecordedCall};
