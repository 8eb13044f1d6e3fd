//! Reqwest-based HTTP transport adapter.
//!
//! Production implementation of the [`HttpClient`] trait. A hard per-request
//! timeout bounds every call, including token refresh exchanges, so callers
//! waiting on an in-flight refresh are never parked indefinitely.

use std::time::Duration;

use async_trait::async_trait;

use crate::traits::{Headers, HttpClient, HttpError, Method, Response};

/// Default per-request timeout.
/// 30s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP transport implementation using reqwest.
///
/// Clone is cheap: `reqwest::Client` shares its connection pool internally.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Create a client with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Create a client over a custom `reqwest::Client`.
    ///
    /// Allows advanced configuration like proxies or TLS settings.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Convert a reqwest error to the transport error taxonomy.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        let mut builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        };

        builder = builder.timeout(self.timeout);
        for (key, value) in headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(Self::convert_error)?;

        Ok(Response::with_headers(status, response_headers, body))
    }
}
