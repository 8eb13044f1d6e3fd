//! Error taxonomy for the client core.
//!
//! Auth-related failures are resolved at the [`AuthenticatedClient`]
//! boundary into the typed variants below; raw HTTP status codes never leak
//! through them. Responses the server produced for non-auth reasons are not
//! errors at all — they pass through as values. Nothing in this crate is
//! fatal to the process.
//!
//! [`AuthenticatedClient`]: crate::client::AuthenticatedClient

use std::fmt;

use crate::traits::HttpError;

/// Failure of an authenticated request.
#[derive(Debug, Clone)]
pub enum RequestError {
    /// No credentials are present. Nothing was sent; the caller should
    /// route to sign-in.
    Unauthenticated,

    /// The refresh token was rejected while renewing the session. The store
    /// has been cleared; the caller should route to sign-in.
    SessionExpired,

    /// The session could not be renewed for a transient reason (network,
    /// timeout, server trouble). The session is untouched; resubmitting
    /// later may succeed.
    RefreshUnavailable { message: String },

    /// The wrapped request itself failed at the transport level, unrelated
    /// to authentication.
    RequestFailed(HttpError),
}

impl RequestError {
    /// Whether the caller must route the user back to sign-in.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            RequestError::Unauthenticated | RequestError::SessionExpired
        )
    }

    /// Whether resubmitting the same request later could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RequestError::RefreshUnavailable { .. } => true,
            RequestError::RequestFailed(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthenticated => write!(f, "Not signed in"),
            RequestError::SessionExpired => write!(f, "Session expired, sign in again"),
            RequestError::RefreshUnavailable { message } => {
                write!(f, "Could not renew session: {}", message)
            }
            RequestError::RequestFailed(err) => write!(f, "Request failed: {}", err),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::RequestFailed(err) => Some(err),
            _ => None,
        }
    }
}

/// Failure of a sign-in or sign-up attempt.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// The backend rejected the email/password pair.
    InvalidCredentials { message: String },

    /// The backend refused the attempt for another reason (account exists,
    /// weak password, ...).
    Rejected { status: u16, message: String },

    /// The backend answered with something unparseable.
    InvalidResponse { message: String },

    /// The backend could not be reached.
    Network { message: String },
}

impl AuthError {
    /// Whether retrying the same attempt later could plausibly succeed
    /// without the user changing their input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Network { .. })
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials { message } => {
                write!(f, "Invalid credentials: {}", message)
            }
            AuthError::Rejected { status, message } => {
                write!(f, "Sign-in rejected ({}): {}", status, message)
            }
            AuthError::InvalidResponse { message } => {
                write!(f, "Invalid response from server: {}", message)
            }
            AuthError::Network { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for AuthError {}
