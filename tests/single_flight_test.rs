//! Integration tests for coordinated token refresh.
//!
//! These tests drive the full stack (authenticated client, coordinator,
//! refresher, store) against a mock HTTP server and verify:
//! - N concurrent rejected requests produce exactly one refresh exchange
//! - every waiter observes the same outcome
//! - a denied refresh signs the session out and later sends short-circuit
//! - a transient refresh failure leaves the session usable for a later retry

use std::time::Duration;

use futures::future::join_all;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use satchel::adapters::MemoryStorage;
use satchel::{RequestSpec, RequestError};

mod common;
use common::{expired_credentials, fresh_credentials, platform_against};

/// Delay on the refresh response, long enough that every concurrently
/// rejected request joins the open cycle instead of starting its own.
const REFRESH_DELAY: Duration = Duration::from_millis(300);

// ============================================================================
// Exactly one refresh for N concurrent 401s
// ============================================================================

#[tokio::test]
async fn test_concurrent_401s_trigger_exactly_one_refresh() {
    let server = MockServer::start().await;

    // The stale token is rejected everywhere.
    Mock::given(method("GET"))
        .and(path("/materials"))
        .and(header("Authorization", "Bearer stale-access"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // Exactly one exchange may happen, and it must present the stored
    // refresh token.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(serde_json::json!({"refresh_token": "refresh-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(REFRESH_DELAY)
                .set_body_json(serde_json::json!({
                    "access_token": "fresh-access",
                    "refresh_token": "refresh-2",
                    "expires_in": 900
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Retries with the renewed token succeed.
    Mock::given(method("GET"))
        .and(path("/materials"))
        .and(header("Authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "materials": []
        })))
        .mount(&server)
        .await;

    let platform = platform_against(
        &server.uri(),
        MemoryStorage::with_credentials(fresh_credentials("stale-access", "refresh-1")),
    );

    let spec = RequestSpec::get("/materials");
    let results = join_all((0..8).map(|_| platform.client().send(&spec))).await;

    for result in results {
        let response = result.expect("request should succeed after renewal");
        assert_eq!(response.status, 200);
    }

    // The rotated refresh token was persisted.
    let creds = platform.store().read().unwrap();
    assert_eq!(creds.access_token, "fresh-access");
    assert_eq!(creds.refresh_token, "refresh-2");

    // expect(1) on the refresh mock is verified when the server drops.
}

#[tokio::test]
async fn test_expired_hint_skips_doomed_requests_and_refreshes_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(REFRESH_DELAY)
                .set_body_json(serde_json::json!({
                    "access_token": "fresh-access",
                    "refresh_token": "refresh-2",
                    "expires_in": 900
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Only the renewed token is ever accepted; a request carrying the stale
    // token would fall through to no mock and fail the assertions below.
    Mock::given(method("GET"))
        .and(path("/materials"))
        .and(header("Authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200))
        .expect(6)
        .mount(&server)
        .await;

    let platform = platform_against(
        &server.uri(),
        MemoryStorage::with_credentials(expired_credentials("stale-access", "refresh-1")),
    );

    let spec = RequestSpec::get("/materials");
    let results = join_all((0..6).map(|_| platform.client().send(&spec))).await;

    for result in results {
        assert_eq!(result.unwrap().status, 200);
    }
}

// ============================================================================
// Denied refresh collapses the session
// ============================================================================

#[tokio::test]
async fn test_denied_refresh_signs_out_and_later_sends_short_circuit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_delay(REFRESH_DELAY)
                .set_body_json(serde_json::json!({"error": "refresh token revoked"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let platform = platform_against(
        &server.uri(),
        MemoryStorage::with_credentials(fresh_credentials("stale-access", "revoked-refresh")),
    );

    let spec = RequestSpec::get("/materials");
    let results = join_all((0..4).map(|_| platform.client().send(&spec))).await;

    for result in results {
        assert!(matches!(result, Err(RequestError::SessionExpired)));
    }
    assert!(platform.store().read().is_none());
    assert!(!platform.is_authenticated());

    // A later request must fail locally, without touching the network.
    let requests_before = server.received_requests().await.unwrap().len();
    let result = platform.client().send(&spec).await;
    assert!(matches!(result, Err(RequestError::Unauthenticated)));
    let requests_after = server.received_requests().await.unwrap().len();
    assert_eq!(requests_before, requests_after);
}

// ============================================================================
// Transient refresh failure is survivable
// ============================================================================

#[tokio::test]
async fn test_transient_refresh_failure_leaves_session_and_later_retry_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials"))
        .and(header("Authorization", "Bearer stale-access"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // The first exchange hits a server that is briefly on fire...
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500).set_delay(REFRESH_DELAY))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // ...and the next one succeeds.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-access",
            "refresh_token": "refresh-2",
            "expires_in": 900
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/materials"))
        .and(header("Authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let platform = platform_against(
        &server.uri(),
        MemoryStorage::with_credentials(fresh_credentials("stale-access", "refresh-1")),
    );

    let spec = RequestSpec::get("/materials");
    let results = join_all((0..3).map(|_| platform.client().send(&spec))).await;

    for result in results {
        assert!(matches!(
            result,
            Err(RequestError::RefreshUnavailable { .. })
        ));
    }

    // The session is untouched: same tokens as before.
    let kept = platform.store().read().unwrap();
    assert_eq!(kept.access_token, "stale-access");
    assert_eq!(kept.refresh_token, "refresh-1");

    // A manual resubmission later goes through the healthy endpoint.
    let response = platform.client().send(&spec).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_stalled_refresh_is_bounded_by_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/materials"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // The refresh endpoint hangs far longer than the refresh timeout.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let config = satchel::PlatformConfig::default()
        .with_api_base_url(server.uri())
        .with_refresh_timeout(Duration::from_secs(1));
    let platform = satchel::Platform::with_components(
        config,
        std::sync::Arc::new(satchel::adapters::ReqwestHttpClient::with_timeout(
            Duration::from_secs(5),
        )),
        std::sync::Arc::new(MemoryStorage::with_credentials(fresh_credentials(
            "stale-access",
            "refresh-1",
        ))),
    );

    let spec = RequestSpec::get("/materials");
    let results = join_all((0..2).map(|_| platform.client().send(&spec))).await;

    // Both waiters are released with a transient failure once the exchange
    // times out; nobody hangs for the full 30 seconds.
    for result in results {
        assert!(matches!(
            result,
            Err(RequestError::RefreshUnavailable { .. })
        ));
    }
    assert_eq!(
        platform.store().read().unwrap().access_token,
        "stale-access"
    );
}
