//! Shared test helpers for the HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use cesizen_api::{AppState, build_app};
use cesizen_core::ManualClock;
use cesizen_core::config::{AdminConfig, AppConfig, AuthConfig, StoreConfig};
use cesizen_database::MemoryCredentialStore;
use cesizen_service::{OutboxResetNotifier, Services};

pub const ADMIN_IDENTITY: &str = "admin";
pub const ADMIN_SECRET: &str = "Adm1n-Secret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock shared with every service
    pub clock: ManualClock,
    /// Reset tokens delivered so far
    pub outbox: Arc<OutboxResetNotifier>,
    pub services: Services,
}

/// Configuration with cheap Argon2 parameters and the in-memory store.
pub fn test_config() -> AppConfig {
    AppConfig {
        auth: AuthConfig {
            signing_secret: "integration-test-signing-secret-0123456789".to_string(),
            argon2_memory_kib: 8 * 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        },
        admin: AdminConfig {
            identity: ADMIN_IDENTITY.to_string(),
            secret: ADMIN_SECRET.to_string(),
            email: Some("admin@cesizen.fr".to_string()),
        },
        store: StoreConfig {
            connection_target: "memory://".to_string(),
            ..StoreConfig::default()
        },
        ..AppConfig::default()
    }
}

impl TestApp {
    /// Create a new test application with the admin already bootstrapped
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Same as [`TestApp::new`] with a caller-supplied configuration.
    pub async fn with_config(config: AppConfig) -> Self {
        config.validate().expect("test config is valid");

        let clock = ManualClock::starting_now();
        let outbox = Arc::new(OutboxResetNotifier::new());
        let services = Services::build(
            &config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(clock.clone()),
            outbox.clone(),
        )
        .expect("Failed to build services");

        services
            .accounts
            .bootstrap_admin(&config.admin)
            .await
            .expect("Failed to bootstrap admin");

        let router = build_app(AppState::new(Arc::new(config), &services));

        Self {
            router,
            clock,
            outbox,
            services,
        }
    }

    /// Registers an account through the API.
    pub async fn register(&self, identity: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({ "identity": identity, "password": password })),
            None,
        )
        .await
    }

    /// Logs in through the API.
    pub async fn login(&self, identity: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "identity": identity, "password": password })),
            None,
        )
        .await
    }

    /// Logs in and returns the access token.
    pub async fn token_for(&self, identity: &str, password: &str) -> String {
        let response = self.login(identity, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response.body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_IDENTITY, ADMIN_SECRET).await
    }

    /// Make a JSON request to the app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        self.send(req, body).await
    }

    /// Sends a prepared request builder with an optional JSON body.
    pub async fn send(&self, req: http::request::Builder, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let retry_after = response
            .headers()
            .get(http::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            retry_after,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// `Retry-After` header, when present
    pub retry_after: Option<String>,
    /// Parsed JSON body
    pub body: Value,
}
