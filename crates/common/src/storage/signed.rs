use chrono::Utc;
use url::Url;

use super::error::StorageError;
use super::principal::Principal;
use super::sigv4;

/// A reqwest client bound to one endpoint and one set of credentials.
///
/// Shared plumbing for the data and admin clients: every request it sends
/// is SigV4 signed with the principal's keys.
#[derive(Clone)]
pub(crate) struct SignedClient {
    http: reqwest::Client,
    endpoint: Url,
    principal: Principal,
    region: String,
}

impl SignedClient {
    pub fn new(http: reqwest::Client, endpoint: Url, principal: Principal, region: String) -> Self {
        Self {
            http,
            endpoint,
            principal,
            region,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Issue a signed GET for `path` (relative to the endpoint root) and
    /// return the response body on success.
    pub async fn get(&self, path: &str) -> Result<String, StorageError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| StorageError::Status {
                status: 0,
                message: format!("invalid request path {}: {}", path, e),
            })?;

        let signed = sigv4::sign(
            "GET",
            &url,
            b"",
            &self.principal.identity,
            &self.principal.secret,
            &self.region,
            Utc::now(),
        );

        tracing::debug!(url = %url, identity = %self.principal.identity, "signed storage request");

        let response = self
            .http
            .get(url)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(StorageError::from_response(status.as_u16(), &body))
        }
    }
}
