//! # Principals
//!
//! A principal is the access key / secret key pair an operator presents to
//! the storage cluster. It only lives for the duration of a single request or
//! login attempt and is never persisted by the core.

use std::fmt;

/// The identity + secret pair presented for a storage operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    /// Access key of the operator
    pub identity: String,
    /// Secret key of the operator
    pub secret: String,
}

impl Principal {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// Whether either half of the pair is blank.
    ///
    /// Blank credentials are rejected by callers before they reach the
    /// cluster; nothing in the storage layer checks this.
    pub fn is_blank(&self) -> bool {
        self.identity.trim().is_empty() || self.secret.is_empty()
    }
}

// Secrets never end up in logs
impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let principal = Principal::new("admin", "super-secret-key");
        let rendered = format!("{:?}", principal);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("super-secret-key"));
    }

    #[test]
    fn test_is_blank() {
        assert!(Principal::new("", "secret").is_blank());
        assert!(Principal::new("   ", "secret").is_blank());
        assert!(Principal::new("admin", "").is_blank());
        assert!(!Principal::new("admin", "secret").is_blank());
    }
}
