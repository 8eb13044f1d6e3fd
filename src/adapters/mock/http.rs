//! Mock HTTP transport for testing.
//!
//! Provides a configurable mock that returns scripted responses or errors
//! and records every request for verification, without network access.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::traits::{Headers, HttpClient, HttpError, Method, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body, if any
    pub body: Option<String>,
}

impl RecordedRequest {
    /// The bearer token the request carried, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Configuration for a scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response with this status and body
    Success(Response),
    /// Return a transport error
    Error(HttpError),
}

/// Mock HTTP transport.
///
/// Responses are scripted per URL. Scripting the same URL repeatedly builds
/// a queue: each request consumes the next entry, and the last entry repeats
/// once the queue is down to one — so a `401, 200` script models a token
/// going stale and the retry succeeding.
///
/// # Example
///
/// ```ignore
/// use satchel::adapters::mock::{MockHttpClient, MockResponse};
/// use satchel::traits::{HttpClient, Method, Headers, Response};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.script("https://api.example.com/data", MockResponse::Success(Response::new(401, Bytes::new())));
/// client.script("https://api.example.com/data", MockResponse::Success(Response::new(200, Bytes::from("ok"))));
///
/// let first = client.execute(Method::Get, "https://api.example.com/data", None, &Headers::new()).await?;
/// assert_eq!(first.status, 401);
/// let second = client.execute(Method::Get, "https://api.example.com/data", None, &Headers::new()).await?;
/// assert_eq!(second.status, 200);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Scripted responses by URL
    responses: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no URL matches
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scripted response for a URL.
    pub fn script(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without a script.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// All recorded requests, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests to the given URL, in order.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Forget all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(
        &self,
        method: Method,
        url: &str,
        headers: &Headers,
        body: Option<String>,
    ) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn next_response(&self, url: &str) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        if let Some(queue) = responses.get_mut(url) {
            if queue.len() > 1 {
                return queue.pop_front();
            }
            if let Some(last) = queue.front() {
                return Some(last.clone());
            }
        }
        self.default_response.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record_request(method, url, headers, body.map(|b| b.to_string()));

        match self.next_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("no scripted response for {}", url))),
        }
    }
}
