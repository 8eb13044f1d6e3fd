//! Session lifecycle: sign-in, sign-up, sign-out.
//!
//! The lifecycle and the refresh coordinator's driver are the only writers
//! of the credential store. Sign-out treats local state as the source of
//! truth: the store is cleared first and unconditionally, and the backend is
//! told on a best-effort basis afterwards.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::api::{AuthApiClient, AuthApiError, TokenGrant};
use crate::auth::credentials::{jwt_expires_at, Credentials};
use crate::auth::store::CredentialStore;
use crate::error::AuthError;

/// Optional profile details collected at sign-up.
#[derive(Debug, Clone, Default)]
pub struct SignupProfile {
    pub display_name: Option<String>,
}

/// Orchestrates sign-in, sign-up, and sign-out against the auth API.
pub struct SessionLifecycle {
    api: Arc<AuthApiClient>,
    store: Arc<CredentialStore>,
}

impl SessionLifecycle {
    pub fn new(api: Arc<AuthApiClient>, store: Arc<CredentialStore>) -> Self {
        Self { api, store }
    }

    /// Whether a user is currently signed in. Route guards consume this.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Sign in with email and password.
    ///
    /// On success the credentials are stored (and persisted); on failure the
    /// store is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, AuthError> {
        let grant = self
            .api
            .login(email, password)
            .await
            .map_err(classify_auth_failure)?;
        self.adopt_grant(grant)
    }

    /// Register a new account and sign in with it.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile: SignupProfile,
    ) -> Result<Credentials, AuthError> {
        let grant = self
            .api
            .signup(email, password, profile.display_name.as_deref())
            .await
            .map_err(classify_auth_failure)?;
        self.adopt_grant(grant)
    }

    /// Sign out. Idempotent and infallible from the caller's perspective:
    /// the local session is gone when this returns, whatever the backend or
    /// the storage medium had to say about it.
    pub async fn logout(&self) {
        // A failing storage medium is already logged by the store; the
        // in-memory session is gone either way.
        let _ = self.store.clear();
        debug!("signed out locally");

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            if let Err(err) = api.logout().await {
                debug!(error = %err, "backend sign-out notification failed");
            }
        });
    }

    /// Turn a login/signup grant into stored credentials.
    fn adopt_grant(&self, grant: TokenGrant) -> Result<Credentials, AuthError> {
        let user = grant.user.ok_or_else(|| AuthError::InvalidResponse {
            message: "grant carried no user identity".to_string(),
        })?;
        let refresh_token = match grant.refresh_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(AuthError::InvalidResponse {
                    message: "grant carried no refresh token".to_string(),
                })
            }
        };
        let expires_at = grant
            .expires_in
            .map(|secs| chrono::Utc::now().timestamp() + i64::from(secs))
            .or_else(|| jwt_expires_at(&grant.access_token));

        let creds = Credentials {
            access_token: grant.access_token,
            refresh_token,
            expires_at,
            user,
        };

        if let Err(err) = self.store.write(creds.clone()) {
            warn!(error = %err, "signed in, but the session will not survive a restart");
        }
        Ok(creds)
    }
}

/// Map auth API failures onto the sign-in error taxonomy.
fn classify_auth_failure(err: AuthApiError) -> AuthError {
    match err {
        AuthApiError::ServerError { status, message } if status == 401 || status == 403 => {
            AuthError::InvalidCredentials { message }
        }
        AuthApiError::ServerError { status, message } => AuthError::Rejected { status, message },
        AuthApiError::InvalidResponse { message } => AuthError::InvalidResponse { message },
        AuthApiError::Http(e) => AuthError::Network {
            message: e.to_string(),
        },
    }
}
