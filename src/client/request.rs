//! Request descriptions for the authenticated client.
//!
//! A [`RequestSpec`] says what to send, not how to authenticate it: method,
//! path, optional JSON body, extra headers. Authorization is attached by the
//! client at send time, so specs can be built and retried freely.

use crate::traits::{Headers, Method};

/// An auth-agnostic description of one API request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Request method.
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
    /// Extra headers. `Authorization` is set by the client and wins over
    /// anything placed here.
    pub headers: Headers,
}

impl RequestSpec {
    /// Create a spec for the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Headers::new(),
        }
    }

    /// Shorthand for a GET spec.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a POST spec.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Shorthand for a PUT spec.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Shorthand for a DELETE spec.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an extra header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
