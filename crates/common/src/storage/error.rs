//! Error types for the storage cluster clients.

/// The endpoint configuration could not be turned into a client.
///
/// Fatal to the request that tried to build clients, never to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientInitError {
    #[error("invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build http client: {0}")]
    Http(String),
}

/// Errors returned by calls against the storage cluster.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The cluster could not be reached at all (DNS, connect, TLS, ...)
    #[error("storage cluster unreachable: {0}")]
    Unreachable(String),

    /// The cluster rejected the access key or the request signature
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The credentials are valid but not allowed to perform the call
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The call did not complete within its deadline
    #[error("storage call timed out")]
    Timeout,

    /// Any other non-success response
    #[error("storage cluster returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Error raised while streaming an object listing
    #[error("object listing error: {0}")]
    Listing(String),
}

impl StorageError {
    /// Whether the failure says nothing about the credentials themselves.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StorageError::Unreachable(_) | StorageError::Timeout)
    }

    /// Classify a non-success HTTP response from an S3 or admin endpoint.
    ///
    /// S3 and the MinIO admin API both report the failure reason as an error
    /// code inside the body, so the body is inspected before the status.
    pub fn from_response(status: u16, body: &str) -> Self {
        const CREDENTIAL_CODES: [&str; 4] = [
            "InvalidAccessKeyId",
            "SignatureDoesNotMatch",
            "XMinioInvalidAccessKeyId",
            "XMinioAdminInvalidAccessKeyId",
        ];

        let message = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());

        if CREDENTIAL_CODES.iter().any(|code| body.contains(code)) {
            return StorageError::InvalidCredentials(message);
        }

        match status {
            401 | 403 => StorageError::AccessDenied(message),
            _ => StorageError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StorageError::Timeout
        } else if e.is_connect() || e.is_request() {
            StorageError::Unreachable(e.to_string())
        } else {
            StorageError::Status {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

impl From<object_store::Error> for StorageError {
    fn from(e: object_store::Error) -> Self {
        StorageError::Listing(e.to_string())
    }
}

/// Pull the human readable message out of an S3 XML or admin JSON error body.
fn extract_error_message(body: &str) -> Option<String> {
    if let (Some(start), Some(end)) = (body.find("<Message>"), body.find("</Message>")) {
        let start = start + "<Message>".len();
        if start <= end {
            return Some(body[start..end].to_string());
        }
    }

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("Message").and_then(|m| m.as_str()).map(String::from))
}
