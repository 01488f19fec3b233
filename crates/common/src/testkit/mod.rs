//! In-process stand-in for a storage cluster.
//!
//! [`FakeCluster`] implements [`ClientFactory`](crate::storage::ClientFactory)
//! and hands out clients that answer from in-memory state, so probing,
//! scanning and the HTTP layer can be tested without a running cluster.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::FakeCluster;
//!
//! let cluster = FakeCluster::new();
//! cluster.add_admin("admin", "secret");
//! cluster.add_bucket("photos", [1024, 2048]);
//! cluster.set_object_delay("photos", Duration::from_secs(1));
//!
//! let factory: Arc<dyn ClientFactory> = Arc::new(cluster.clone());
//! ```

mod client;
mod cluster;

pub use cluster::FakeCluster;
