//! Trait abstractions for dependency injection.
//!
//! These traits define the seams between the client core and the outside
//! world (HTTP transport, durable credential storage), enabling production
//! implementations and test doubles to be swapped freely.

pub mod http;
pub mod storage;

pub use http::{Headers, HttpClient, HttpError, Method, Response};
pub use storage::{StorageBackend, StorageError};
