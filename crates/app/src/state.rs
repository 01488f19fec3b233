use std::sync::Arc;
use std::time::Duration;

use common::auth::{CapabilityProber, SessionAuthority};
use common::storage::{ClientFactory, MinioClientFactory};

use crate::config::Config;

/// Per-bucket scan budgets and parallelism.
#[derive(Debug, Clone, Copy)]
pub struct StatsSettings {
    pub full_timeout: Duration,
    pub quick_timeout: Duration,
    pub workers: usize,
}

/// Main service state, shared by every request handler.
///
/// Holds nothing that is specific to one operator: storage clients are
/// built per request from the session's credentials.
#[derive(Clone)]
pub struct State {
    factory: Arc<dyn ClientFactory>,
    prober: CapabilityProber,
    sessions: Arc<SessionAuthority>,
    stats: StatsSettings,
}

impl State {
    /// Build state for the configured MinIO cluster.
    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // surface a bad endpoint at start rather than on the first login
        config.storage.endpoint()?;
        tracing::info!(
            host = %config.storage.host,
            port = config.storage.port,
            ssl = config.storage.use_ssl,
            "using storage cluster"
        );

        let factory: Arc<dyn ClientFactory> =
            Arc::new(MinioClientFactory::new(config.storage.clone()));
        let key = match &config.session_secret {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "no session secret configured, generated a random one; sessions will not survive a restart"
                );
                SessionAuthority::generate_key()
            }
        };

        Ok(Self::new(
            factory,
            SessionAuthority::new(key, config.session_ttl),
            config.probe_timeout,
            StatsSettings {
                full_timeout: config.stats_full_timeout,
                quick_timeout: config.stats_quick_timeout,
                workers: config.stats_workers,
            },
        ))
    }

    pub fn new(
        factory: Arc<dyn ClientFactory>,
        sessions: SessionAuthority,
        probe_timeout: Duration,
        stats: StatsSettings,
    ) -> Self {
        Self {
            prober: CapabilityProber::new(factory.clone(), probe_timeout),
            factory,
            sessions: Arc::new(sessions),
            stats,
        }
    }

    pub fn factory(&self) -> &Arc<dyn ClientFactory> {
        &self.factory
    }

    pub fn prober(&self) -> &CapabilityProber {
        &self.prober
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    pub fn stats(&self) -> StatsSettings {
        self.stats
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("invalid storage configuration: {0}")]
    Storage(#[from] common::storage::ClientInitError),
}
