/**
 * Login and authorization.
 *  - Capability probing against the live cluster
 *  - Signed, expiring session tokens
 */
pub mod auth;
/**
 * Per-bucket size and object counts, computed
 *  by walking object listings under a time budget.
 */
pub mod stats;
/**
 * Clients for the storage cluster's S3 and
 *  administrative APIs, built per principal.
 */
pub mod storage;
/**
 * In-memory fake cluster for tests.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::auth::{
        Capability, CapabilityProber, PermissionSet, SessionAuthority, SessionClaims,
    };
    pub use crate::stats::{BucketStat, BucketUsage, UsageSummary};
    pub use crate::storage::{ClientFactory, MinioClientFactory, Principal, StorageConfig};
}
