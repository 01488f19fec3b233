use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;

use crate::http_server::session::expired_session_cookie;

/// Overwrite the session cookie with an expired one.
///
/// Tokens are stateless, so this only affects the calling client.
pub async fn handler(jar: CookieJar) -> impl IntoResponse {
    tracing::info!("LOGOUT API: Clearing session cookie");
    (
        http::StatusCode::OK,
        jar.add(expired_session_cookie()),
        Json(serde_json::json!({"message": "Logged out"})),
    )
}
