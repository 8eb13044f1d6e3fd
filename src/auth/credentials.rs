//! Credential types for the Satchel platform.
//!
//! A signed-in session is a pair of tokens plus the identity of the user
//! they belong to. The pair is indivisible: there is no representable state
//! with an access token but no refresh token, or vice versa. Code that needs
//! "maybe signed in" holds an `Option<Credentials>`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

/// The authenticated user, as reported by the backend at sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Stable user id.
    pub id: String,
    /// Email the account was registered with.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, if the user set one.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Authentication credentials for the Satchel platform.
///
/// Both tokens are always present together; `expires_at` is only a hint
/// (Unix seconds) used to skip requests that are certain to be rejected.
/// The server's 401 remains the authoritative expiry signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived token attached to each outgoing request.
    pub access_token: String,
    /// Longer-lived token exchanged for new access tokens.
    pub refresh_token: String,
    /// Expiry hint for the access token as a Unix timestamp, if known.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// The user these tokens belong to.
    pub user: UserIdentity,
}

impl Credentials {
    /// Whether the expiry hint says the access token is already stale.
    ///
    /// Returns `false` when no hint is available: without a hint the token
    /// is presumed usable and the server decides.
    pub fn hint_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => chrono::Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// The id of the user these credentials belong to.
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// JWT claims for extracting expiration time.
#[derive(Deserialize)]
struct JwtClaims {
    exp: i64,
}

/// Extract the absolute expiry time from a JWT access token.
///
/// The backend does not always include `expires_in` in token grants; when it
/// does not, the `exp` claim of the (unverified) JWT payload supplies the
/// hint. Returns `None` for tokens that are not parseable JWTs or carry no
/// `exp` claim.
pub fn jwt_expires_at(access_token: &str) -> Option<i64> {
    let parts: Vec<&str> = access_token.split('.').collect();
    let payload = URL_SAFE_NO_PAD.decode(parts.get(1)?).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&payload).ok()?;
    Some(claims.exp)
}
