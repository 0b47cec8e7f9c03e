//! HTTP tests for self-service endpoints and health.

mod common;

use http::StatusCode;

use common::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "healthy");
    assert_eq!(response.body["data"]["store"], "connected");
    assert_eq!(response.body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/users/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_and_update_profile() {
    let app = TestApp::new().await;
    app.register("alice", "P@ssw0rd").await;
    let token = app.token_for("alice", "P@ssw0rd").await;

    let me = app.request("GET", "/api/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["identity"], "alice");

    let updated = app
        .request(
            "PUT",
            "/api/users/me",
            Some(serde_json::json!({
                "email": "alice@example.com",
                "full_name": "Alice Martin",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["email"], "alice@example.com");
    assert_eq!(updated.body["data"]["full_name"], "Alice Martin");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new().await;
    app.register("bob", "P@ssw0rd").await;
    app.register("carol", "P@ssw0rd").await;
    let bob = app.token_for("bob", "P@ssw0rd").await;
    let carol = app.token_for("carol", "P@ssw0rd").await;
    let body = serde_json::json!({ "email": "shared@example.com" });

    let first = app
        .request("PUT", "/api/users/me", Some(body.clone()), Some(&bob))
        .await;
    let second = app
        .request("PUT", "/api/users/me", Some(body), Some(&carol))
        .await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new().await;
    app.register("dave", "P@ssw0rd").await;
    let token = app.token_for("dave", "P@ssw0rd").await;

    let wrong = app
        .request(
            "PUT",
            "/api/users/me/password",
            Some(serde_json::json!({
                "current_password": "nope",
                "new_password": "N3w-Secret",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let changed = app
        .request(
            "PUT",
            "/api/users/me/password",
            Some(serde_json::json!({
                "current_password": "P@ssw0rd",
                "new_password": "N3w-Secret",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(app.login("dave", "N3w-Secret").await.status, StatusCode::OK);
}
