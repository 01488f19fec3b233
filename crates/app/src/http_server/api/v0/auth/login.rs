use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use common::auth::{AuthError, PermissionSet, TokenError, ADMIN_POLICY_NAME};
use common::storage::Principal;

use crate::http_server::session::session_cookie;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Access key of the operator
    #[serde(default)]
    pub username: String,
    /// Secret key of the operator
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub policy_name: String,
    pub permissions: PermissionSet,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

pub async fn handler(
    State(state): State<ServiceState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, LoginError> {
    let principal = Principal::new(req.username, req.password);
    if principal.is_blank() {
        return Err(LoginError::MissingCredentials);
    }

    tracing::info!("LOGIN API: Login attempt for {}", principal.identity);

    let principal = state
        .prober()
        .validate_credentials(&principal)
        .await
        .map_err(|e| {
            tracing::warn!("LOGIN API: Rejected {}: {}", principal.identity, e);
            LoginError::Auth(e)
        })?;

    let permissions = state.prober().probe(&principal).await;
    let issued = state
        .sessions()
        .issue(&principal, ADMIN_POLICY_NAME, permissions)?;

    tracing::info!(
        "LOGIN API: Issued session for {} until {}",
        principal.identity,
        issued.claims.expires_at
    );

    let jar = jar.add(session_cookie(issued.token.clone(), state.sessions().ttl()));

    Ok((
        http::StatusCode::OK,
        jar,
        Json(LoginResponse {
            token: issued.token,
            policy_name: issued.claims.policy_name.clone(),
            permissions: issued.claims.permissions,
            expires_at: issued.claims.expires_at_time(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("Failed to issue session: {0}")]
    Token(#[from] TokenError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LoginError::MissingCredentials => {
                (http::StatusCode::BAD_REQUEST, self.to_string())
            }
            LoginError::Auth(AuthError::InvalidCredentials(_)) => (
                http::StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
            ),
            LoginError::Auth(AuthError::InsufficientPrivileges(_)) => (
                http::StatusCode::FORBIDDEN,
                "Insufficient admin privileges".to_string(),
            ),
            LoginError::Auth(AuthError::UnreachableCluster(_)) => (
                http::StatusCode::SERVICE_UNAVAILABLE,
                "Cannot reach storage cluster".to_string(),
            ),
            LoginError::Auth(AuthError::ClientInit(_)) => (
                http::StatusCode::SERVICE_UNAVAILABLE,
                "Storage cluster is misconfigured".to_string(),
            ),
            LoginError::Token(_) => (
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".to_string(),
            ),
        };

        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}
