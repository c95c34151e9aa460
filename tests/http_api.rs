//! Integration tests for the HTTP boundary.
//!
//! Sends requests through the full router with `tower::ServiceExt::oneshot`
//! and checks the status codes produced by the auth and capability layers.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vip_access::adapters::http::{app_router, AppState};
use vip_access::adapters::{
    InMemoryNotificationChannel, InMemorySubscriptionStore, InMemoryUserDirectory, ManualClock,
};
use vip_access::application::{AccessGuard, SubscriptionManager, TokenService};
use vip_access::config::AuthConfig;
use vip_access::domain::access::Role;
use vip_access::domain::foundation::{Timestamp, UserId};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    tokens: Arc<TokenService>,
}

impl TestApp {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Timestamp::from_unix_secs(1_700_000_000).unwrap(),
        ));
        let tokens = Arc::new(TokenService::new(
            &AuthConfig::with_secret("http-test-signing-secret-0123456789abcdef"),
            clock.clone(),
        ));
        let subscriptions = Arc::new(SubscriptionManager::new(
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(InMemoryNotificationChannel::new()),
            clock.clone(),
        ));
        let guard = Arc::new(AccessGuard::new(
            tokens.clone(),
            subscriptions.clone(),
            Arc::new(InMemoryUserDirectory::new()),
        ));

        let state = AppState {
            tokens: tokens.clone(),
            guard,
            subscriptions,
            clock,
        };
        Self {
            router: app_router(state),
            tokens,
        }
    }

    fn token_for(&self, id: &str, role: Role) -> String {
        self.tokens
            .issue(id, role, Some(UserId::new(id).unwrap()))
            .unwrap()
            .token
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_token_is_401() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/subscription", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn garbage_token_is_401_with_reason() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api/subscription", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"]["reason"], "malformed");
}

#[tokio::test]
async fn authenticated_caller_without_subscription_sees_null() {
    let app = TestApp::new();
    let token = app.token_for("alice", Role::User);
    let (status, body) = app
        .send(Method::GET, "/api/subscription", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["subscription"].is_null());
}

#[tokio::test]
async fn admin_routes_require_admin_or_staff() {
    let app = TestApp::new();
    let token = app.token_for("alice", Role::Vip);
    let (status, body) = app
        .send(
            Method::GET,
            "/api/admin/subscriptions/expired",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn vip_route_needs_subscription_not_role() {
    let app = TestApp::new();
    let vip_token = app.token_for("vera", Role::Vip);

    let (status, body) = app
        .send(Method::GET, "/api/vip/status", Some(&vip_token), None)
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error_code"], "SUBSCRIPTION_INACTIVE");

    let staff_token = app.token_for("sam", Role::Staff);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/users/vera/subscription",
            Some(&staff_token),
            Some(json!({ "subscription_type": "monthly" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["subscription"]["user_id"], "vera");
    assert_eq!(body["subscription"]["is_active"], true);

    let (status, body) = app
        .send(Method::GET, "/api/vip/status", Some(&vip_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vip"], true);
}

#[tokio::test]
async fn extending_without_subscription_is_404() {
    let app = TestApp::new();
    let admin = app.token_for("root", Role::Admin);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/users/nobody/subscription/extend",
            Some(&admin),
            Some(json!({ "subscription_type": "yearly" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "SUBSCRIPTION_NOT_FOUND");
}

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let app = TestApp::new();
    let token = app.token_for("alice", Role::User);

    let (status, _) = app
        .send(Method::DELETE, "/api/session", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(Method::GET, "/api/subscription", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"]["reason"], "revoked");
}

#[tokio::test]
async fn expiring_listing_rejects_non_positive_days() {
    let app = TestApp::new();
    let admin = app.token_for("root", Role::Admin);
    let (status, _) = app
        .send(
            Method::GET,
            "/api/admin/subscriptions/expiring?days=0",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expiring_listing_rejects_oversized_window() {
    let app = TestApp::new();
    let admin = app.token_for("root", Role::Admin);
    let (status, body) = app
        .send(
            Method::GET,
            "/api/admin/subscriptions/expiring?days=100000000",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
}
