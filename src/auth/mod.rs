//! Authentication for the Satchel platform.
//!
//! This module provides:
//! - Credential types and the process-wide credential store
//! - The auth API client (`/auth/login`, `/auth/signup`, `/auth/refresh`,
//!   `/auth/logout`)
//! - Single-flight refresh coordination
//! - The session lifecycle (sign-in, sign-up, sign-out)

pub mod api;
pub mod coordinator;
pub mod credentials;
pub mod refresher;
pub mod session;
pub mod store;

pub use api::{AuthApiClient, TokenGrant};
pub use coordinator::RefreshCoordinator;
pub use credentials::{Credentials, UserIdentity};
pub use refresher::{HttpTokenRefresher, RefreshOutcome, TokenRefresher};
pub use session::{SessionLifecycle, SignupProfile};
pub use store::CredentialStore;
