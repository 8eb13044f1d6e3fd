//! Satchel client core.
//!
//! The authenticated-request layer shared by Satchel front-ends: it holds
//! the session's credentials, attaches them to outgoing requests, renews the
//! access token when the backend rejects it, and guarantees that concurrent
//! requests never race each other into redundant or conflicting refresh
//! attempts.
//!
//! # Overview
//!
//! - [`Platform`] wires the pieces together; construct one and pass it down.
//! - [`SessionLifecycle`](auth::SessionLifecycle) signs users in and out.
//! - [`AuthenticatedClient`](client::AuthenticatedClient) sends requests,
//!   transparently renewing the session on a 401 and retrying once.
//! - [`RefreshCoordinator`](auth::RefreshCoordinator) collapses concurrent
//!   renewals into a single exchange per expiry.
//!
//! # Example
//!
//! ```ignore
//! use satchel::{Platform, PlatformConfig, RequestSpec};
//!
//! let platform = Platform::new(PlatformConfig::from_env());
//!
//! platform.session().login("pat@example.com", "secret").await?;
//!
//! let response = platform
//!     .client()
//!     .send(&RequestSpec::get("/materials"))
//!     .await?;
//! ```

pub mod adapters;
pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod traits;

pub use auth::{Credentials, RefreshOutcome, UserIdentity};
pub use client::{AuthenticatedClient, RequestSpec};
pub use config::PlatformConfig;
pub use context::Platform;
pub use error::{AuthError, RequestError};
