//! Session extraction for API handlers.
//!
//! A session token is looked up in the `token` cookie first and in an
//! `Authorization: Bearer` header second. Handlers that take a [`Session`]
//! only run for requests carrying a valid, unexpired token; everything else
//! is turned away with a 401 (or a redirect to the login page for browsers).

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use http::request::Parts;
use http::{HeaderMap, StatusCode};
use time::OffsetDateTime;

use common::auth::{Capability, SessionClaims, TokenError};
use common::storage::Principal;

use crate::ServiceState;

pub const SESSION_COOKIE: &str = "token";

/// Claims of the verified session attached to a request.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

impl Session {
    pub fn claims(&self) -> &SessionClaims {
        &self.0
    }

    /// Credentials to build storage clients with.
    pub fn principal(&self) -> Principal {
        self.0.principal()
    }

    /// Fail unless the session carries `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), Forbidden> {
        if self.0.authorize(capability) {
            Ok(())
        } else {
            tracing::info!(
                identity = %self.0.identity,
                %capability,
                "request denied for missing capability"
            );
            Err(Forbidden(capability))
        }
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for Session {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let wants_html = accepts_html(&parts.headers);
        let reject = |reason| SessionRejection { reason, wants_html };

        let token = match session_token(parts, state).await {
            Some(token) => token,
            None => return Err(reject(RejectReason::Missing)),
        };

        match state.sessions().verify(&token) {
            Ok(claims) => Ok(Session(claims)),
            Err(e) => {
                tracing::debug!("rejecting session token: {}", e);
                Err(reject(RejectReason::from(&e)))
            }
        }
    }
}

async fn session_token(parts: &mut Parts, state: &ServiceState) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// The session cookie handed out at login.
pub fn session_cookie(token: String, max_age: std::time::Duration) -> Cookie<'static> {
    let max_age = time::Duration::try_from(max_age).unwrap_or(time::Duration::HOUR);
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// An empty, already expired session cookie.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Missing,
    Invalid,
    Expired,
    Malformed,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Missing => "missing",
            RejectReason::Invalid => "invalid",
            RejectReason::Expired => "expired",
            RejectReason::Malformed => "malformed",
        }
    }
}

impl From<&TokenError> for RejectReason {
    fn from(e: &TokenError) -> Self {
        match e {
            TokenError::Invalid => RejectReason::Invalid,
            TokenError::Expired => RejectReason::Expired,
            TokenError::Malformed(_) | TokenError::Encoding(_) => RejectReason::Malformed,
        }
    }
}

#[derive(Debug)]
pub struct SessionRejection {
    pub reason: RejectReason,
    wants_html: bool,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        if self.wants_html {
            return Redirect::to("/").into_response();
        }

        let msg = serde_json::json!({
            "error": "authentication required",
            "reason": self.reason.as_str(),
        });
        (StatusCode::UNAUTHORIZED, Json(msg)).into_response()
    }
}

/// The session lacks a capability the route needs.
#[derive(Debug, thiserror::Error)]
#[error("missing capability {0}")]
pub struct Forbidden(pub Capability);

impl IntoResponse for Forbidden {
    fn into_response(self) -> Response {
        let msg = serde_json::json!({"error": "Insufficient permissions"});
        (StatusCode::FORBIDDEN, Json(msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), std::time::Duration::from_secs(3600));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_expired_cookie_is_empty() {
        let cookie = expired_session_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_reject_reasons() {
        assert_eq!(RejectReason::from(&TokenError::Expired), RejectReason::Expired);
        assert_eq!(RejectReason::from(&TokenError::Invalid), RejectReason::Invalid);
        assert_eq!(
            RejectReason::from(&TokenError::Malformed("x".into())),
            RejectReason::Malformed
        );
    }

    #[test]
    fn test_rejection_redirects_browsers() {
        let response = SessionRejection {
            reason: RejectReason::Expired,
            wants_html: true,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = SessionRejection {
            reason: RejectReason::Expired,
            wants_html: false,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
