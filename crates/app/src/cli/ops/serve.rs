use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use common::storage::StorageConfig;
use stowage::{spawn_service, ServiceConfig};

/// Run the admin panel against a MinIO cluster.
#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Port for the admin panel (UI + API)
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// MinIO host name
    #[arg(long, env = "MINIO_HOST", default_value = "localhost")]
    pub minio_host: String,

    /// MinIO API port
    #[arg(long, env = "MINIO_PORT", default_value_t = 9000)]
    pub minio_port: u16,

    /// Talk to MinIO over TLS
    #[arg(long, env = "MINIO_USE_SSL", default_value_t = false, action = clap::ArgAction::Set)]
    pub minio_use_ssl: bool,

    /// Region used to sign requests
    #[arg(long, env = "MINIO_REGION", default_value = common::storage::sigv4::DEFAULT_REGION)]
    pub minio_region: String,

    /// Key for signing session tokens; random per start if unset
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Session lifetime in minutes
    #[arg(long, env = "SESSION_TTL_MINUTES", default_value_t = 60)]
    pub session_ttl_minutes: u64,

    /// Per-bucket scan budget for the bucket listing, in seconds
    #[arg(long, default_value_t = 30)]
    pub stats_full_timeout_secs: u64,

    /// Per-bucket scan budget for the usage summary, in seconds
    #[arg(long, default_value_t = 5)]
    pub stats_quick_timeout_secs: u64,

    /// Buckets scanned concurrently
    #[arg(long, default_value_t = 4)]
    pub stats_workers: usize,

    /// Bound on each permission trial at login, in seconds
    #[arg(long, default_value_t = 10)]
    pub probe_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory for daily rotated log files
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Serve {
    pub fn service_config(&self) -> Result<ServiceConfig, ServeError> {
        if self.session_ttl_minutes == 0 {
            return Err(ServeError::InvalidConfig(
                "--session-ttl-minutes must be positive".to_string(),
            ));
        }
        let session_ttl_secs = self.session_ttl_minutes.checked_mul(60).ok_or_else(|| {
            ServeError::InvalidConfig("--session-ttl-minutes is too large".to_string())
        })?;

        let config = ServiceConfig {
            listen_port: self.port,
            storage: StorageConfig {
                host: self.minio_host.clone(),
                port: self.minio_port,
                use_ssl: self.minio_use_ssl,
                region: self.minio_region.clone(),
            },
            session_secret: self.session_secret.clone(),
            session_ttl: Duration::from_secs(session_ttl_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            stats_full_timeout: Duration::from_secs(self.stats_full_timeout_secs),
            stats_quick_timeout: Duration::from_secs(self.stats_quick_timeout_secs),
            stats_workers: self.stats_workers.max(1),
            log_level: self.log_level,
            log_dir: self.log_dir.clone(),
        };

        config
            .storage
            .endpoint()
            .map_err(|e| ServeError::InvalidConfig(e.to_string()))?;

        Ok(config)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.service_config()?;
        spawn_service(&config).await;
        Ok("admin panel stopped".to_string())
    }
}
