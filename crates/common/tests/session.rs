//! Integration tests for the login flow: validate, probe, issue, verify

mod common;

use std::time::Duration;

use ::common::auth::{
    Capability, SessionAuthority, TokenError, ADMIN_POLICY_NAME, DEFAULT_SESSION_TTL,
};
use time::OffsetDateTime;

use common::{principal, prober, setup_cluster, ADMIN};

#[tokio::test]
async fn test_login_round_trip() {
    let cluster = setup_cluster();
    let prober = prober(&cluster);
    let authority = SessionAuthority::new(SessionAuthority::generate_key(), DEFAULT_SESSION_TTL);

    let validated = prober.validate_credentials(&principal(ADMIN)).await.unwrap();
    let permissions = prober.probe(&validated).await;
    let issued = authority
        .issue(&validated, ADMIN_POLICY_NAME, permissions)
        .unwrap();

    let claims = authority.verify(&issued.token).unwrap();
    assert_eq!(claims.principal(), validated);
    assert_eq!(claims.policy_name, ADMIN_POLICY_NAME);
    assert_eq!(claims.permissions, permissions);
    assert_eq!(claims.expires_at - claims.issued_at, 3_600);
    assert!(SessionAuthority::authorize(&claims, Capability::ManageUsers));
}

#[tokio::test]
async fn test_token_rejected_after_expiry() {
    let cluster = setup_cluster();
    let prober = prober(&cluster);
    let authority = SessionAuthority::new(b"fixed-key".to_vec(), Duration::from_secs(60));

    let now = OffsetDateTime::now_utc();
    let permissions = prober.probe(&principal(ADMIN)).await;
    let issued = authority
        .issue_at(now, &principal(ADMIN), ADMIN_POLICY_NAME, permissions)
        .unwrap();

    for offset in [60, 61, 3_600, 86_400 * 365] {
        assert_eq!(
            authority.verify_at(&issued.token, now + time::Duration::seconds(offset)),
            Err(TokenError::Expired),
            "token should be expired {}s after issue",
            offset
        );
    }
    assert!(authority
        .verify_at(&issued.token, now + time::Duration::seconds(59))
        .is_ok());
}

#[test]
fn test_keys_are_independent() {
    let a = SessionAuthority::generate_key();
    let b = SessionAuthority::generate_key();
    assert_eq!(a.len(), 32);
    assert_ne!(a, b);
}
