//! Shared test utilities for HTTP API integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Request, StatusCode};
use tower::ServiceExt;

use ::common::auth::SessionAuthority;
use ::common::testkit::FakeCluster;
use stowage::{ServiceState, StatsSettings};

pub const SESSION_KEY: &[u8] = b"integration-test-session-key";
pub const SESSION_TTL: Duration = Duration::from_secs(3600);

pub const ADMIN: (&str, &str) = ("minioadmin", "minioadmin-secret");
pub const OPERATOR: (&str, &str) = ("operator", "operator-secret");

pub struct TestApp {
    pub cluster: FakeCluster,
    pub router: Router,
    /// Shares the app's signing key, for forging test sessions
    pub sessions: SessionAuthority,
}

/// An app backed by a fake cluster with an admin and a bucket-only operator.
pub fn setup_app() -> TestApp {
    let cluster = FakeCluster::new();
    cluster.add_admin(ADMIN.0, ADMIN.1);
    cluster.add_bucket_user(OPERATOR.0, OPERATOR.1);

    let state = ServiceState::new(
        Arc::new(cluster.clone()),
        SessionAuthority::new(SESSION_KEY, SESSION_TTL),
        Duration::from_secs(10),
        StatsSettings {
            full_timeout: Duration::from_secs(30),
            quick_timeout: Duration::from_secs(5),
            workers: 2,
        },
    );

    TestApp {
        cluster,
        router: stowage::http_server::router(state),
        sessions: SessionAuthority::new(SESSION_KEY, SESSION_TTL),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({"username": username, "password": password});
    Request::builder()
        .method("POST")
        .uri("/api/v0/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Log in and return the session token.
pub async fn login(app: &TestApp, (username, password): (&str, &str)) -> String {
    let response = send(app, login_request(username, password)).await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.body["token"].as_str().unwrap().to_string()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}
