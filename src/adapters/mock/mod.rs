//! Mock adapters for testing.
//!
//! These doubles implement the same traits as the production adapters and
//! are deterministic: no network, no file system, no timing dependence.

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
