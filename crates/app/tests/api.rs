//! Integration tests for the admin panel HTTP API

mod common;

use std::time::Duration;

use axum::body::Body;
use http::header::{ACCEPT, COOKIE, LOCATION};
use http::{Request, StatusCode};
use time::OffsetDateTime;

use ::common::auth::{PermissionSet, ADMIN_POLICY_NAME};
use ::common::storage::Principal;

use common::{get, get_with_token, login, login_request, send, setup_app, ADMIN, OPERATOR};

#[tokio::test]
async fn test_livez() {
    let app = setup_app();
    let response = send(&app, get("/_status/livez")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let app = setup_app();
    let response = send(&app, login_request(ADMIN.0, ADMIN.1)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["policy_name"], ADMIN_POLICY_NAME);
    assert_eq!(response.body["permissions"]["isAdmin"], true);
    assert_eq!(response.body["permissions"]["canListBuckets"], true);

    let cookie = response.set_cookie().unwrap();
    let token = response.body["token"].as_str().unwrap();
    assert!(cookie.starts_with(&format!("token={}", token)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));
}

#[tokio::test]
async fn test_login_failures_are_told_apart() {
    let app = setup_app();

    let response = send(&app, login_request("", "")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(&app, login_request(ADMIN.0, "wrong")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");

    // can list buckets, cannot list users
    let response = send(&app, login_request(OPERATOR.0, OPERATOR.1)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.set_cookie().is_none());

    app.cluster.set_unreachable(true);
    let response = send(&app, login_request(ADMIN.0, ADMIN.1)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);

    app.cluster.set_unreachable(false);
    app.cluster.set_fail_init(true);
    let response = send(&app, login_request(ADMIN.0, ADMIN.1)).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_session_never_exposes_secret() {
    let app = setup_app();
    let token = login(&app, ADMIN).await;

    let response = send(&app, get_with_token("/api/v0/auth/session", &token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], ADMIN.0);
    assert_eq!(response.body["policy_name"], ADMIN_POLICY_NAME);
    assert!(response.body.get("password").is_none());
    assert!(!response.body.to_string().contains(ADMIN.1));
}

#[tokio::test]
async fn test_session_from_cookie() {
    let app = setup_app();
    let token = login(&app, ADMIN).await;

    let request = Request::builder()
        .uri("/api/v0/auth/session")
        .header(COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], ADMIN.0);
}

#[tokio::test]
async fn test_session_rejections() {
    let app = setup_app();

    let response = send(&app, get("/api/v0/auth/session")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["reason"], "missing");

    let response = send(&app, get_with_token("/api/v0/auth/session", "not-a-token")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["reason"], "malformed");

    let other = ::common::auth::SessionAuthority::new(b"other-key".to_vec(), Duration::from_secs(60));
    let forged = other
        .issue(&Principal::new(ADMIN.0, ADMIN.1), ADMIN_POLICY_NAME, PermissionSet::none())
        .unwrap();
    let response = send(&app, get_with_token("/api/v0/auth/session", &forged.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["reason"], "invalid");

    let stale = app
        .sessions
        .issue_at(
            OffsetDateTime::now_utc() - time::Duration::hours(2),
            &Principal::new(ADMIN.0, ADMIN.1),
            ADMIN_POLICY_NAME,
            PermissionSet::none(),
        )
        .unwrap();
    let response = send(&app, get_with_token("/api/v0/auth/session", &stale.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["reason"], "expired");
}

#[tokio::test]
async fn test_browsers_are_redirected_to_login() {
    let app = setup_app();
    let request = Request::builder()
        .uri("/api/v0/auth/session")
        .header(ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.headers[LOCATION], "/");
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = setup_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v0/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test(start_paused = true)]
async fn test_bucket_listing_with_stats() {
    let app = setup_app();
    app.cluster.add_bucket("a", [60, 40]);
    app.cluster.add_bucket("b", [1, 1, 1]);
    app.cluster.set_object_delay("b", Duration::from_secs(20));
    app.cluster.add_bucket("c", []);
    let token = login(&app, ADMIN).await;

    let response = send(&app, get_with_token("/api/v0/buckets", &token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let buckets = response.body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0]["name"], "a");
    assert_eq!(buckets[0]["size"], 100);
    assert_eq!(buckets[0]["object_count"], 2);
    assert_eq!(buckets[0]["formatted_size"], "100 B");
    assert_eq!(buckets[1]["size"], -1);
    assert_eq!(buckets[1]["object_count"], -1);
    assert_eq!(buckets[1]["formatted_size"], "N/A");
    assert_eq!(buckets[2]["size"], 0);
    assert_eq!(buckets[2]["object_count"], 0);
}

#[tokio::test]
async fn test_quick_bucket_listing_skips_scans() {
    let app = setup_app();
    app.cluster.add_bucket("a", [60, 40]);
    let token = login(&app, ADMIN).await;

    let response = send(&app, get_with_token("/api/v0/buckets?quick=true", &token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["buckets"][0]["size"], -1);
    assert_eq!(app.cluster.peak_listings(), 0);
}

#[tokio::test]
async fn test_bucket_listing_requires_capability() {
    let app = setup_app();
    let session = app
        .sessions
        .issue(
            &Principal::new(ADMIN.0, ADMIN.1),
            ADMIN_POLICY_NAME,
            PermissionSet::none(),
        )
        .unwrap();

    let response = send(&app, get_with_token("/api/v0/buckets", &session.token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "Insufficient permissions");
}

#[tokio::test(start_paused = true)]
async fn test_storage_usage_summary() {
    let app = setup_app();
    app.cluster.add_bucket("a", [60, 40]);
    app.cluster.add_bucket("b", [1, 1, 1]);
    app.cluster.set_object_delay("b", Duration::from_secs(10));
    app.cluster.add_bucket("c", []);
    let token = login(&app, ADMIN).await;

    let response = send(&app, get_with_token("/api/v0/storage-usage", &token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        serde_json::json!({
            "total_size": 100,
            "total_objects": 2,
            "total_buckets": 3,
            "buckets_with_stats": 2,
            "formatted_size": "100 B",
        })
    );
}

#[tokio::test]
async fn test_storage_usage_surfaces_listing_failure() {
    let app = setup_app();
    let token = login(&app, ADMIN).await;
    app.cluster.set_unreachable(true);

    let response = send(&app, get_with_token("/api/v0/storage-usage", &token)).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup_app();
    let request = Request::builder()
        .uri("/api/v0/nothing-here")
        .header(ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "not found");
}
