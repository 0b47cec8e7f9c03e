//! HTTP tests for the password reset flow.

mod common;

use chrono::Duration;
use http::{Request, StatusCode};

use common::TestApp;

async fn request_reset(app: &TestApp, identity: &str) -> common::TestResponse {
    app.request(
        "POST",
        "/api/auth/password-reset/request",
        Some(serde_json::json!({ "identity": identity })),
        None,
    )
    .await
}

async fn confirm_reset(app: &TestApp, token: &str, new_password: &str) -> common::TestResponse {
    app.request(
        "POST",
        "/api/auth/password-reset/confirm",
        Some(serde_json::json!({ "token": token, "new_password": new_password })),
        None,
    )
    .await
}

#[tokio::test]
async fn test_unknown_identity_gets_same_response() {
    let app = TestApp::new().await;
    app.register("alice", "P@ssw0rd").await;

    let unknown = request_reset(&app, "nonexistent@example.com").await;
    assert!(app.outbox.messages().is_empty());
    let known = request_reset(&app, "alice").await;

    assert_eq!(unknown.status, StatusCode::ACCEPTED);
    assert_eq!(unknown.status, known.status);
    assert_eq!(unknown.body, known.body);
    assert_eq!(app.outbox.messages().len(), 1);
}

#[tokio::test]
async fn test_reset_flow() {
    let app = TestApp::new().await;
    app.register("bob", "P@ssw0rd").await;
    request_reset(&app, "bob").await;
    let token = app.outbox.latest_for("bob").unwrap();

    let confirmed = confirm_reset(&app, &token, "N3w-Secret").await;
    assert_eq!(confirmed.status, StatusCode::OK);

    assert_eq!(
        app.login("bob", "P@ssw0rd").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.login("bob", "N3w-Secret").await.status, StatusCode::OK);

    let reused = confirm_reset(&app, &token, "An0ther-Secret").await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.body["message"], "password reset failed");
}

#[tokio::test]
async fn test_second_token_invalidates_first() {
    let app = TestApp::new().await;
    app.register("carol", "P@ssw0rd").await;

    request_reset(&app, "carol").await;
    let first = app.outbox.latest_for("carol").unwrap();
    request_reset(&app, "carol").await;
    let second = app.outbox.latest_for("carol").unwrap();

    let stale = confirm_reset(&app, &first, "N3w-Secret").await;
    assert_eq!(stale.status, StatusCode::BAD_REQUEST);

    let fresh = confirm_reset(&app, &second, "N3w-Secret").await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("dave", "P@ssw0rd").await;
    request_reset(&app, "dave").await;
    let token = app.outbox.latest_for("dave").unwrap();

    let unknown = confirm_reset(&app, "never-issued", "N3w-Secret").await;
    app.clock.advance(Duration::minutes(31));
    let expired = confirm_reset(&app, &token, "N3w-Secret").await;

    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body, expired.body);
}

#[tokio::test]
async fn test_confirm_is_rate_limited_per_source() {
    let mut config = common::test_config();
    config.server.trust_forwarded_for = true;
    let app = &TestApp::with_config(config).await;
    let confirm_from = move |source: &'static str| {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/password-reset/confirm")
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", source);
        app.send(
            req,
            Some(serde_json::json!({ "token": "guess", "new_password": "N3w-Secret" })),
        )
    };

    for _ in 0..5 {
        assert_eq!(
            confirm_from("198.51.100.4").await.status,
            StatusCode::BAD_REQUEST
        );
    }
    let locked = confirm_from("198.51.100.4").await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(locked.retry_after.is_some());

    assert_eq!(
        confirm_from("198.51.100.5").await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_rotating_forwarded_header_is_ignored_by_default() {
    let app = TestApp::new().await;
    let sources = [
        "198.51.100.1",
        "198.51.100.2",
        "198.51.100.3",
        "198.51.100.4",
        "198.51.100.5",
        "198.51.100.6",
    ];

    let mut statuses = Vec::new();
    for source in sources {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/password-reset/confirm")
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", source);
        let response = app
            .send(
                req,
                Some(serde_json::json!({ "token": "guess", "new_password": "N3w-Secret" })),
            )
            .await;
        statuses.push(response.status);
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::BAD_REQUEST));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}
