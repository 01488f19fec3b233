use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use common::auth::PermissionSet;

use crate::http_server::session::Session;

/// What the current session grants. Never includes the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub username: String,
    pub policy_name: String,
    pub permissions: PermissionSet,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn handler(session: Session) -> Response {
    let claims = session.claims();
    (
        http::StatusCode::OK,
        Json(SessionResponse {
            username: claims.identity.clone(),
            policy_name: claims.policy_name.clone(),
            permissions: claims.permissions,
            issued_at: claims.issued_at_time(),
            expires_at: claims.expires_at_time(),
        }),
    )
        .into_response()
}
