//! Refresh-token exchange and outcome classification.
//!
//! One exchange is one network call; there is no retry loop here. Retry
//! policy belongs to callers, and the coordinator relies on that: a hidden
//! retry inside the exchange would stretch a refresh cycle past the bound
//! the HTTP timeout puts on waiting followers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::auth::api::{AuthApiClient, AuthApiError};
use crate::auth::credentials::{jwt_expires_at, Credentials};

/// Result of one coordinated refresh cycle, delivered identically to every
/// caller that waited on it.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The exchange produced new credentials; they have been stored.
    Renewed(Credentials),
    /// The refresh token itself was rejected. Terminal: the session is over
    /// and the user must sign in again.
    Denied(String),
    /// The exchange could not be completed (network, timeout, server
    /// trouble). The session is untouched and a later attempt may succeed.
    TransientFailure(String),
}

/// Trait for the token exchange, so the coordinator can be driven with a
/// deterministic double in tests.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange the current credentials' refresh token for a new grant.
    ///
    /// Takes the credentials whole: a non-rotating backend keeps the old
    /// refresh token, and the user identity survives the swap.
    async fn exchange(&self, current: &Credentials) -> RefreshOutcome;
}

/// Production refresher over the auth API.
pub struct HttpTokenRefresher {
    api: Arc<AuthApiClient>,
}

impl HttpTokenRefresher {
    pub fn new(api: Arc<AuthApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn exchange(&self, current: &Credentials) -> RefreshOutcome {
        match self.api.refresh(&current.refresh_token).await {
            Ok(grant) => {
                let expires_at = grant
                    .expires_in
                    .map(|secs| chrono::Utc::now().timestamp() + i64::from(secs))
                    .or_else(|| jwt_expires_at(&grant.access_token));

                // Keep the old refresh token unless the server rotated it.
                let refresh_token = match grant.refresh_token {
                    Some(token) if !token.is_empty() => token,
                    _ => current.refresh_token.clone(),
                };

                debug!("access token renewed");
                RefreshOutcome::Renewed(Credentials {
                    access_token: grant.access_token,
                    refresh_token,
                    expires_at,
                    user: current.user.clone(),
                })
            }
            Err(AuthApiError::ServerError { status, message })
                if status == 401 || status == 403 =>
            {
                warn!(status, "refresh token rejected");
                RefreshOutcome::Denied(message)
            }
            Err(err) => {
                debug!(error = %err, "refresh exchange could not be completed");
                RefreshOutcome::TransientFailure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::UserIdentity;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_credentials() -> Credentials {
        Credentials {
            access_token: "stale-access".to_string(),
            refresh_token: "refresh-1".to_string(),
            expires_at: Some(0),
            user: UserIdentity {
                id: "user-123".to_string(),
                email: None,
                display_name: None,
            },
        }
    }

    async fn refresher_against(server: &MockServer) -> HttpTokenRefresher {
        HttpTokenRefresher::new(Arc::new(AuthApiClient::with_base_url(server.uri())))
    }

    #[tokio::test]
    async fn test_renewed_with_rotation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(serde_json::json!({"refresh_token": "refresh-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-access",
                "refresh_token": "refresh-2",
                "expires_in": 900
            })))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;

        match outcome {
            RefreshOutcome::Renewed(creds) => {
                assert_eq!(creds.access_token, "fresh-access");
                assert_eq!(creds.refresh_token, "refresh-2");
                assert!(creds.expires_at.unwrap() > chrono::Utc::now().timestamp());
                // Identity carried forward from the old credentials.
                assert_eq!(creds.user.id, "user-123");
            }
            other => panic!("expected Renewed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_renewed_without_rotation_keeps_old_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-access"
            })))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;

        match outcome {
            RefreshOutcome::Renewed(creds) => {
                assert_eq!(creds.refresh_token, "refresh-1");
            }
            other => panic!("expected Renewed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_denied_on_401() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "refresh token revoked"
            })))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;
        assert!(matches!(outcome, RefreshOutcome::Denied(_)));
    }

    #[tokio::test]
    async fn test_denied_on_403() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;
        assert!(matches!(outcome, RefreshOutcome::Denied(_)));
    }

    #[tokio::test]
    async fn test_transient_on_500() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;
        assert!(matches!(outcome, RefreshOutcome::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_transient_on_unreachable_server() {
        let refresher = HttpTokenRefresher::new(Arc::new(AuthApiClient::with_base_url(
            "http://127.0.0.1:1".to_string(),
        )));
        let outcome = refresher.exchange(&current_credentials()).await;
        assert!(matches!(outcome, RefreshOutcome::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_transient_on_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let refresher = refresher_against(&server).await;
        let outcome = refresher.exchange(&current_credentials()).await;
        assert!(matches!(outcome, RefreshOutcome::TransientFailure(_)));
    }
}
