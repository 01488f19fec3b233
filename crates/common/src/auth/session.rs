//! # Session tokens
//!
//! After a successful login the derived permission set is frozen into a
//! signed, expiring token. The server keeps no session store: a token is
//! valid while its signature checks out and `now < exp`, and there is no way
//! to revoke one early. Logging out means the client discards it.
//!
//! ## Wire format
//!
//! A compact HS256 JWT: `base64url(header) . base64url(payload) .
//! base64url(signature)`, encoded and checked with `jsonwebtoken`. Expiry is
//! checked here rather than by the library so callers can supply the clock.
//!
//! ## Embedded credentials
//!
//! The payload carries the operator's secret so that every later request can
//! build fresh, properly authenticated storage clients. The payload is
//! signed, not encrypted: anyone holding the token can read the secret. The
//! token must therefore only travel over trusted transports and is handed to
//! browsers as an `HttpOnly` cookie.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::storage::Principal;

use super::permissions::{Capability, PermissionSet};

/// Sessions last one hour unless configured otherwise
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Everything a session token asserts.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "username")]
    pub identity: String,
    #[serde(rename = "password")]
    pub secret: String,
    pub policy_name: String,
    pub permissions: PermissionSet,
    /// Unix seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Unix seconds
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionClaims {
    /// Rebuild the principal the session was issued to.
    pub fn principal(&self) -> Principal {
        Principal::new(self.identity.clone(), self.secret.clone())
    }

    pub fn issued_at_time(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.issued_at).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    pub fn expires_at_time(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.expires_at).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    pub fn authorize(&self, capability: Capability) -> bool {
        self.permissions.allows(capability)
    }
}

impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("policy_name", &self.policy_name)
            .field("permissions", &self.permissions)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A freshly issued token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub claims: SessionClaims,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The signature does not match the content
    #[error("invalid session token")]
    Invalid,

    #[error("session token expired")]
    Expired,

    #[error("malformed session token: {0}")]
    Malformed(String),

    #[error("failed to encode session token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::Invalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        }
    }
}

/// Issues and verifies session tokens with a process-wide signing key.
///
/// The key is read-only after construction; the authority can be shared
/// between request handlers without synchronization.
#[derive(Clone)]
pub struct SessionAuthority {
    key: Vec<u8>,
    ttl: Duration,
}

impl SessionAuthority {
    pub fn new(key: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }

    /// A random 256 bit signing key.
    pub fn generate_key() -> Vec<u8> {
        rand::random::<[u8; 32]>().to_vec()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        principal: &Principal,
        policy_name: &str,
        permissions: PermissionSet,
    ) -> Result<SessionToken, TokenError> {
        self.issue_at(OffsetDateTime::now_utc(), principal, policy_name, permissions)
    }

    pub fn issue_at(
        &self,
        now: OffsetDateTime,
        principal: &Principal,
        policy_name: &str,
        permissions: PermissionSet,
    ) -> Result<SessionToken, TokenError> {
        let issued_at = now.unix_timestamp();
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = SessionClaims {
            identity: principal.identity.clone(),
            secret: principal.secret.clone(),
            policy_name: policy_name.to_string(),
            permissions,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_secs),
        };

        let token = jsonwebtoken::encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(&self.key),
        )
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(SessionToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    /// Check integrity then expiry of `token` as of `now`.
    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<SessionClaims>(
            token.trim(),
            &DecodingKey::from_secret(&self.key),
            &validation,
        )?
        .claims;

        if now.unix_timestamp() >= claims.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Pure lookup of a capability in already verified claims.
    pub fn authorize(claims: &SessionClaims, capability: Capability) -> bool {
        claims.authorize(capability)
    }
}

impl fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-key";

    fn authority() -> SessionAuthority {
        SessionAuthority::new(KEY, DEFAULT_SESSION_TTL)
    }

    fn principal() -> Principal {
        Principal::new("admin", "minio-secret")
    }

    fn admin_permissions() -> PermissionSet {
        let mut permissions = PermissionSet::none();
        permissions.grant_bucket_group();
        permissions.grant_admin_group();
        permissions
    }

    fn at(unix: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(unix).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let authority = authority();
        let issued = authority
            .issue_at(at(1_700_000_000), &principal(), "admin", admin_permissions())
            .unwrap();

        let claims = authority.verify_at(&issued.token, at(1_700_000_001)).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.identity, "admin");
        assert_eq!(claims.secret, "minio-secret");
        assert_eq!(claims.policy_name, "admin");
        assert_eq!(claims.permissions, admin_permissions());
        assert_eq!(claims.principal(), principal());
    }

    #[test]
    fn test_expiry_is_issue_plus_ttl() {
        let authority = SessionAuthority::new(KEY, Duration::from_secs(90));
        let issued = authority
            .issue_at(at(1_000), &principal(), "admin", PermissionSet::none())
            .unwrap();
        assert_eq!(issued.claims.issued_at, 1_000);
        assert_eq!(issued.claims.expires_at, 1_090);
    }

    #[test]
    fn test_expired_token_rejected() {
        let authority = authority();
        let issued = authority
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();

        // valid right up to the last second
        assert!(authority.verify_at(&issued.token, at(1_000 + 3_599)).is_ok());
        assert_eq!(
            authority.verify_at(&issued.token, at(1_000 + 3_600)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            authority.verify_at(&issued.token, at(1_000 + 86_400)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_key_is_invalid() {
        let issued = authority()
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();
        let other = SessionAuthority::new(b"another-key".to_vec(), DEFAULT_SESSION_TTL);
        assert_eq!(
            other.verify_at(&issued.token, at(1_001)),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let authority = authority();
        let issued = authority
            .issue_at(at(1_000), &principal(), "readonly", PermissionSet::none())
            .unwrap();

        // Forge a payload granting every capability, keep the old signature
        let forged_token = SessionAuthority::new(b"attacker-key".to_vec(), DEFAULT_SESSION_TTL)
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap()
            .token;

        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = forged_token.split('.').nth(1).unwrap();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(authority.verify_at(&forged, at(1_001)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let authority = authority();
        let issued = authority
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();

        let (prefix, _) = issued.token.rsplit_once('.').unwrap();
        // 32 zero bytes, base64url
        let bogus = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let forged = format!("{}.{}", prefix, bogus);

        assert_eq!(authority.verify_at(&forged, at(1_001)), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_tokens() {
        let authority = authority();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.###.$$$"] {
            assert!(
                matches!(authority.verify_at(token, at(1)), Err(TokenError::Malformed(_))),
                "token {:?} should be malformed",
                token
            );
        }
    }

    #[test]
    fn test_unsigned_algorithm_rejected() {
        let authority = authority();
        let issued = authority
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();
        // {"alg":"none","typ":"JWT"}
        let none_header = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";
        let forged = format!("{}.{}.", none_header, parts[1]);

        assert!(matches!(
            authority.verify_at(&forged, at(1_001)),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_header_names_hs256() {
        let issued = authority()
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();
        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_other_hmac_algorithm_rejected() {
        let claims = authority()
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap()
            .claims;
        let hs512 = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(KEY),
        )
        .unwrap();

        assert!(matches!(
            authority().verify_at(&hs512, at(1_001)),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_authorize_is_a_lookup() {
        let authority = authority();
        let mut permissions = PermissionSet::none();
        permissions.grant_bucket_group();
        let issued = authority
            .issue_at(at(1_000), &principal(), "readwrite", permissions)
            .unwrap();

        assert!(SessionAuthority::authorize(&issued.claims, Capability::ListBuckets));
        assert!(SessionAuthority::authorize(&issued.claims, Capability::DeleteBuckets));
        assert!(!SessionAuthority::authorize(&issued.claims, Capability::ManageUsers));
        assert!(!SessionAuthority::authorize(&issued.claims, Capability::Admin));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let issued = authority()
            .issue_at(at(1_000), &principal(), "admin", admin_permissions())
            .unwrap();
        assert!(!format!("{:?}", issued.claims).contains("minio-secret"));
        assert!(!format!("{:?}", authority()).contains("test-signing-key"));
    }
}
