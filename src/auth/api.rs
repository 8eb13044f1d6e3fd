//! HTTP client for the Satchel auth endpoints.
//!
//! This is the raw wire contract with `/auth/login`, `/auth/signup`,
//! `/auth/refresh`, and `/auth/logout`. Classification of refresh failures
//! into renew/deny/transient lives one layer up in the refresher; this
//! client only distinguishes "the server answered with an error status"
//! from "the exchange could not be completed".

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::credentials::UserIdentity;

/// Default URL for the Satchel API.
pub const DEFAULT_API_URL: &str = "https://api.satchel.app";

/// Timeout for auth calls. Shorter than the general request timeout because
/// refresh exchanges hold concurrent callers waiting on their outcome.
const AUTH_TIMEOUT_SECS: u64 = 10;

/// Error type for auth endpoint operations.
#[derive(Debug)]
pub enum AuthApiError {
    /// The request could not be completed (connect, timeout, TLS, ...)
    Http(reqwest::Error),
    /// The server answered with a non-success status
    ServerError { status: u16, message: String },
    /// The server answered 2xx but the body was not the expected shape
    InvalidResponse { message: String },
}

impl std::fmt::Display for AuthApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthApiError::Http(e) => write!(f, "HTTP error: {}", e),
            AuthApiError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            AuthApiError::InvalidResponse { message } => {
                write!(f, "Invalid response format: {}", message)
            }
        }
    }
}

impl std::error::Error for AuthApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthApiError {
    fn from(e: reqwest::Error) -> Self {
        AuthApiError::Http(e)
    }
}

/// Response from the token-granting endpoints
/// (`POST /auth/login`, `POST /auth/signup`, `POST /auth/refresh`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Refresh grants may omit this when the refresh token does not rotate.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires; may be absent, in which case
    /// the JWT `exp` claim is consulted.
    #[serde(default)]
    pub expires_in: Option<u32>,
    /// Present on login/signup grants; absent on refresh grants.
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

/// Client for the Satchel auth endpoints.
pub struct AuthApiClient {
    /// Base URL for the API
    pub base_url: String,
    /// Reusable HTTP client
    client: Client,
    /// Per-request timeout
    timeout: Duration,
}

impl AuthApiClient {
    /// Create a client against the default API URL.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL.to_string())
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
            timeout: Duration::from_secs(AUTH_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, AuthApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// Read a token grant out of a response, or classify the failure.
    async fn read_grant(response: reqwest::Response) -> Result<TokenGrant, AuthApiError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthApiError::ServerError { status, message });
        }

        // Read the text first for better error messages on shape mismatches.
        let text = response.text().await.map_err(AuthApiError::Http)?;
        serde_json::from_str::<TokenGrant>(&text).map_err(|e| AuthApiError::InvalidResponse {
            message: format!("{}. Response: {}", e, &text[..text.len().min(200)]),
        })
    }

    /// Sign in with email and password.
    ///
    /// POST /auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenGrant, AuthApiError> {
        debug!("signing in");
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response = self.post_json("/auth/login", &body).await?;
        Self::read_grant(response).await
    }

    /// Register a new account.
    ///
    /// POST /auth/signup
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<TokenGrant, AuthApiError> {
        debug!("registering account");
        let mut body = serde_json::json!({
            "email": email,
            "password": password,
        });
        if let Some(name) = display_name {
            body["display_name"] = serde_json::Value::String(name.to_string());
        }
        let response = self.post_json("/auth/signup", &body).await?;
        Self::read_grant(response).await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// POST /auth/refresh
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthApiError> {
        debug!("exchanging refresh token");
        let body = serde_json::json!({
            "refresh_token": refresh_token,
        });
        let response = self.post_json("/auth/refresh", &body).await?;
        Self::read_grant(response).await
    }

    /// Tell the backend the session ended. Best-effort: callers treat
    /// failure as ignorable because local state is the source of truth.
    ///
    /// POST /auth/logout
    pub async fn logout(&self) -> Result<(), AuthApiError> {
        let response = self.post_json("/auth/logout", &serde_json::json!({})).await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthApiError::ServerError { status, message });
        }
        Ok(())
    }
}

impl Default for AuthApiClient {
    fn default() -> Self {
        Self::new()
    }
}
