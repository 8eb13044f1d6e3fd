//! Common test utilities for integration tests.
//!
//! Fixtures for credentials and a wired-up [`Platform`] pointed at a test
//! server, shared by the integration test files.

use std::sync::{Arc, Once};
use std::time::Duration;

use satchel::adapters::{MemoryStorage, ReqwestHttpClient};
use satchel::auth::credentials::{Credentials, UserIdentity};
use satchel::{Platform, PlatformConfig};

static TRACING: Once = Once::new();

/// Route tracing output through the test harness; `RUST_LOG` controls what
/// shows up on failures.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The user every fixture session belongs to.
#[allow(dead_code)]
pub fn test_user() -> UserIdentity {
    UserIdentity {
        id: "user-123".to_string(),
        email: Some("pat@example.com".to_string()),
        display_name: Some("Pat".to_string()),
    }
}

/// Credentials whose expiry hint lies comfortably in the future, so the
/// 401 answer is what triggers renewal.
#[allow(dead_code)]
pub fn fresh_credentials(access: &str, refresh: &str) -> Credentials {
    Credentials {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at: Some(chrono::Utc::now().timestamp() + 3600),
        user: test_user(),
    }
}

/// Credentials whose expiry hint is already in the past.
#[allow(dead_code)]
pub fn expired_credentials(access: &str, refresh: &str) -> Credentials {
    Credentials {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at: Some(chrono::Utc::now().timestamp() - 3600),
        user: test_user(),
    }
}

/// A production-shaped platform (real HTTP transport) against the given
/// server, with in-memory credential storage.
#[allow(dead_code)]
pub fn platform_against(server_uri: &str, backend: MemoryStorage) -> Platform {
    init_tracing();
    let config = PlatformConfig::default()
        .with_api_base_url(server_uri.to_string())
        .with_request_timeout(Duration::from_secs(5))
        .with_refresh_timeout(Duration::from_secs(5));
    Platform::with_components(
        config,
        Arc::new(ReqwestHttpClient::with_timeout(Duration::from_secs(5))),
        Arc::new(backend),
    )
}
