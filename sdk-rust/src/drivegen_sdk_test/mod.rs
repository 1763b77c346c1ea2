//! Test doubles for code built on top of the SDK.

mod transport;

pub use transport::{MockResult, MockTransport};
