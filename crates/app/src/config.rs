use std::path::PathBuf;
use std::time::Duration;

use common::storage::StorageConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the admin panel (UI + API)
    pub listen_port: u16,

    // storage cluster configuration
    pub storage: StorageConfig,

    // session configuration
    /// Key used to sign session tokens,
    ///  if not set then a random key is generated at start
    pub session_secret: Option<String>,
    pub session_ttl: Duration,
    /// Bound on each capability trial at login
    pub probe_timeout: Duration,

    // statistics configuration
    /// Per-bucket budget for the bucket listing
    pub stats_full_timeout: Duration,
    /// Per-bucket budget for dashboard summaries
    pub stats_quick_timeout: Duration,
    /// Buckets scanned at the same time
    pub stats_workers: usize,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            storage: StorageConfig::default(),
            session_secret: None,
            session_ttl: common::auth::DEFAULT_SESSION_TTL,
            probe_timeout: common::auth::DEFAULT_TRIAL_TIMEOUT,
            stats_full_timeout: common::stats::FULL_SCAN_BUDGET,
            stats_quick_timeout: common::stats::QUICK_SCAN_BUDGET,
            stats_workers: 4,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
