//! # Capability probing
//!
//! The storage cluster is the authority on what an identity may do, and it
//! exposes no "what can I do" query. Instead, capabilities are inferred from
//! two live trial calls:
//!
//! 1. listing buckets through the data plane grants the bucket group
//!    (`canListBuckets`, `canCreateBuckets`, `canDeleteBuckets`)
//! 2. listing users through the admin API grants the admin group
//!    (`canManageUsers`, `canManagePolicies`, `isAdmin`)
//!
//! This is a coarse heuristic rather than a replica of the cluster's policy
//! evaluation: create/delete rights are assumed to follow from list rights.
//! Each trial is attempted once; a failure is a definitive "no" for its group.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::storage::{ClientFactory, ClientInitError, Principal, StorageError};

use super::permissions::PermissionSet;

/// Default bound on a single trial call
pub const DEFAULT_TRIAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a login was refused.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("insufficient admin privileges: {0}")]
    InsufficientPrivileges(String),

    #[error("cannot reach storage cluster: {0}")]
    UnreachableCluster(String),

    #[error(transparent)]
    ClientInit(#[from] ClientInitError),
}

/// Derives permission sets by issuing trial calls against the cluster.
#[derive(Clone)]
pub struct CapabilityProber {
    factory: Arc<dyn ClientFactory>,
    trial_timeout: Duration,
}

impl CapabilityProber {
    pub fn new(factory: Arc<dyn ClientFactory>, trial_timeout: Duration) -> Self {
        Self {
            factory,
            trial_timeout,
        }
    }

    pub fn factory(&self) -> &Arc<dyn ClientFactory> {
        &self.factory
    }

    /// Derive the permission set of `principal`.
    ///
    /// Never fails: if clients cannot be built every capability is denied.
    #[tracing::instrument(skip_all, fields(identity = %principal.identity))]
    pub async fn probe(&self, principal: &Principal) -> PermissionSet {
        let clients = match self.factory.create_clients(principal) {
            Ok(clients) => clients,
            Err(e) => {
                tracing::warn!("failed to create clients for permission probe: {}", e);
                return PermissionSet::none();
            }
        };

        let (buckets, users) = tokio::join!(
            trial(self.trial_timeout, clients.data.list_buckets()),
            trial(self.trial_timeout, clients.admin.list_users()),
        );

        let mut permissions = PermissionSet::none();

        match buckets {
            Ok(_) => permissions.grant_bucket_group(),
            Err(e) => tracing::debug!("bucket trial failed: {}", e),
        }
        match users {
            Ok(()) => permissions.grant_admin_group(),
            Err(e) => tracing::debug!("admin trial failed: {}", e),
        }

        tracing::info!(?permissions, "probed permissions");
        permissions
    }

    /// Check that `principal` may log in to the admin panel.
    ///
    /// Both trials have to succeed. The error tells apart an unreachable
    /// cluster, bad credentials and a non-admin identity.
    #[tracing::instrument(skip_all, fields(identity = %principal.identity))]
    pub async fn validate_credentials(&self, principal: &Principal) -> Result<Principal, AuthError> {
        let clients = self.factory.create_clients(principal)?;

        let (buckets, users) = tokio::join!(
            trial(self.trial_timeout, clients.data.list_buckets()),
            trial(self.trial_timeout, clients.admin.list_users()),
        );

        match buckets {
            Ok(buckets) => {
                tracing::debug!(count = buckets.len(), "bucket trial succeeded");
            }
            Err(e) if e.is_connectivity() => {
                return Err(AuthError::UnreachableCluster(e.to_string()));
            }
            Err(e) => return Err(AuthError::InvalidCredentials(e.to_string())),
        }

        match users {
            Ok(()) => {}
            Err(e) if e.is_connectivity() => {
                return Err(AuthError::UnreachableCluster(e.to_string()));
            }
            Err(e @ StorageError::InvalidCredentials(_)) => {
                return Err(AuthError::InvalidCredentials(e.to_string()));
            }
            Err(e) => return Err(AuthError::InsufficientPrivileges(e.to_string())),
        }

        tracing::info!("credentials validated");
        Ok(principal.clone())
    }
}

/// Run a single trial call under its deadline.
async fn trial<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, StorageError>>,
) -> Result<T, StorageError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(StorageError::Timeout))
}
