//! Testing utilities for the JSON:API repository client.
//!
//! Provides a mock transport for testing applications that use repositories
//! without a live server.

mod mock;

pub use mock::{MockCall, MockResponse, MockTransport};
