//! # Storage cluster clients
//!
//! The storage cluster is the only source of truth for what an operator may
//! do, so every operation runs with clients built from that operator's own
//! credentials. This module provides:
//!
//! - [`Principal`]: the credential pair presented by an operator
//! - [`DataPlane`] / [`AdminPlane`]: the two client seams (S3 API and the
//!   administrative API)
//! - [`ClientFactory`]: builds a fresh pair of clients per call; the
//!   production implementation is [`MinioClientFactory`]
//!
//! Clients are never cached across requests.

mod admin;
mod data;
mod error;
mod principal;
mod signed;
pub mod sigv4;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use url::Url;

pub use admin::MinioAdminClient;
pub use data::S3DataClient;
pub use error::{ClientInitError, StorageError};
pub use principal::Principal;

use signed::SignedClient;

/// A bucket as reported by the data plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketEntry {
    pub name: String,
    pub creation_date: Option<String>,
}

/// A single object yielded by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

/// The S3 side of the cluster.
#[async_trait]
pub trait DataPlane: Send + Sync {
    /// List every bucket visible to the bound credentials.
    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError>;

    /// Recursively list all objects of `bucket`.
    ///
    /// The listing is lazy; dropping the stream stops it.
    fn list_objects(&self, bucket: &str) -> BoxStream<'static, Result<ObjectEntry, StorageError>>;
}

/// The administrative side of the cluster.
#[async_trait]
pub trait AdminPlane: Send + Sync {
    /// List the cluster's users. Only succeeds for administrative identities.
    async fn list_users(&self) -> Result<(), StorageError>;
}

/// The pair of clients bound to one principal.
#[derive(Clone)]
pub struct StorageClients {
    pub data: Arc<dyn DataPlane>,
    pub admin: Arc<dyn AdminPlane>,
}

/// Builds clients for a principal.
///
/// Construction never touches the network, so it cannot fail because of bad
/// credentials; only the first real call proves them.
pub trait ClientFactory: Send + Sync {
    fn create_clients(&self, principal: &Principal) -> Result<StorageClients, ClientInitError>;
}

/// Where the storage cluster lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub host: String,
    pub port: u16,
    pub use_ssl: bool,
    pub region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9000,
            use_ssl: false,
            region: sigv4::DEFAULT_REGION.to_string(),
        }
    }
}

impl StorageConfig {
    /// The base URL of the cluster, `http[s]://host:port/`.
    pub fn endpoint(&self) -> Result<Url, ClientInitError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ClientInitError::InvalidEndpoint("empty host".to_string()));
        }
        if self.port == 0 {
            return Err(ClientInitError::InvalidEndpoint("port must be non-zero".to_string()));
        }

        let scheme = if self.use_ssl { "https" } else { "http" };
        let url = Url::parse(&format!("{}://{}:{}/", scheme, host, self.port))
            .map_err(|e| ClientInitError::InvalidEndpoint(format!("{}:{}: {}", host, self.port, e)))?;

        // Anything beyond host:port (a path, credentials, ...) was smuggled in via `host`
        if url.path() != "/" || !url.username().is_empty() || url.query().is_some() {
            return Err(ClientInitError::InvalidEndpoint(format!(
                "unexpected components in host '{}'",
                host
            )));
        }

        Ok(url)
    }
}

/// Builds S3 + MinIO admin clients against the configured endpoint.
#[derive(Debug, Clone)]
pub struct MinioClientFactory {
    config: StorageConfig,
}

impl MinioClientFactory {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl ClientFactory for MinioClientFactory {
    fn create_clients(&self, principal: &Principal) -> Result<StorageClients, ClientInitError> {
        let endpoint = self.config.endpoint()?;
        tracing::debug!(
            identity = %principal.identity,
            endpoint = %endpoint,
            ssl = self.config.use_ssl,
            "creating storage clients"
        );

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientInitError::Http(e.to_string()))?;

        let signed = SignedClient::new(
            http,
            endpoint,
            principal.clone(),
            self.config.region.clone(),
        );

        Ok(StorageClients {
            data: Arc::new(S3DataClient::new(signed.clone(), !self.config.use_ssl)),
            admin: Arc::new(MinioAdminClient::new(signed)),
        })
    }
}
