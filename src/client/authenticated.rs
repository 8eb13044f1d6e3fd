//! The authenticated request client.
//!
//! Public entry point for everything the UI sends to the platform once a
//! user is signed in. Wraps an arbitrary [`RequestSpec`], attaches the
//! current access token, and resolves authorization failures so callers
//! never see a raw 401: a rejected token triggers one coordinated refresh
//! and one retry, and anything beyond that surfaces as a typed error.

use std::sync::Arc;

use tracing::debug;

use crate::auth::coordinator::RefreshCoordinator;
use crate::auth::credentials::Credentials;
use crate::auth::refresher::RefreshOutcome;
use crate::auth::store::CredentialStore;
use crate::client::request::RequestSpec;
use crate::error::RequestError;
use crate::traits::{Headers, HttpClient, Response};

/// Sends authenticated requests, renewing the session as needed.
///
/// Never writes the credential store itself; all mutation goes through the
/// refresh coordinator.
pub struct AuthenticatedClient {
    http: Arc<dyn HttpClient>,
    store: Arc<CredentialStore>,
    coordinator: RefreshCoordinator,
    base_url: String,
}

impl AuthenticatedClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        store: Arc<CredentialStore>,
        coordinator: RefreshCoordinator,
        base_url: String,
    ) -> Self {
        Self {
            http,
            store,
            coordinator,
            base_url,
        }
    }

    /// Send a request with the current session.
    ///
    /// Behavior:
    /// 1. No session → [`RequestError::Unauthenticated`], nothing is sent.
    /// 2. The request is issued with `Authorization: Bearer <access token>`.
    ///    When the stored expiry hint says the token is already stale, the
    ///    coordinated refresh happens first instead of sending a request
    ///    that is certain to be rejected.
    /// 3. A 401 answer triggers one coordinated refresh and, if the session
    ///    was renewed, one retry. The retry's response is returned as-is —
    ///    a second 401 means the server denies this request, not that the
    ///    token is stale again.
    /// 4. Any non-401 response passes through untouched; this client does
    ///    not interpret business-logic failures.
    pub async fn send(&self, spec: &RequestSpec) -> Result<Response, RequestError> {
        let Some(creds) = self.store.read() else {
            return Err(RequestError::Unauthenticated);
        };

        let creds = if creds.hint_expired() {
            debug!(path = %spec.path, "access token past its expiry hint, renewing first");
            self.renewed_credentials().await?
        } else {
            creds
        };

        let response = self.execute(spec, &creds).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(path = %spec.path, "access token rejected, renewing session");
        let renewed = self.renewed_credentials().await?;
        let retried = self.execute(spec, &renewed).await?;
        if retried.is_unauthorized() {
            debug!(path = %spec.path, "request denied again after renewal");
        }
        Ok(retried)
    }

    /// Run one coordinated refresh and map non-renewal outcomes onto the
    /// request error taxonomy.
    async fn renewed_credentials(&self) -> Result<Credentials, RequestError> {
        match self.coordinator.refresh().await {
            RefreshOutcome::Renewed(creds) => Ok(creds),
            RefreshOutcome::Denied(_) => Err(RequestError::SessionExpired),
            RefreshOutcome::TransientFailure(message) => {
                Err(RequestError::RefreshUnavailable { message })
            }
        }
    }

    async fn execute(
        &self,
        spec: &RequestSpec,
        creds: &Credentials,
    ) -> Result<Response, RequestError> {
        let url = format!("{}{}", self.base_url, spec.path);

        let mut headers: Headers = spec.headers.clone();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", creds.access_token),
        );
        let body = spec.body.as_ref().map(|b| b.to_string());
        if body.is_some() {
            headers
                .entry("Content-Type".to_string())
                .or_insert_with(|| "application/json".to_string());
        }

        self.http
            .execute(spec.method, &url, body.as_deref(), &headers)
            .await
            .map_err(RequestError::RequestFailed)
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
