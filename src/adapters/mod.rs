//! Adapter implementations of the trait seams.
//!
//! Production adapters (reqwest transport, file-backed storage) live here
//! next to the in-memory and mock doubles used in tests and by embedders
//! that want to opt out of persistence.

pub mod file_storage;
pub mod memory_storage;
pub mod mock;
pub mod reqwest_http;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use reqwest_http::ReqwestHttpClient;
