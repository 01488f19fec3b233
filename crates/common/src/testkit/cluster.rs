use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::storage::{
    ClientFactory, ClientInitError, Principal, StorageClients, StorageError,
};

use super::client::{FakeAdminClient, FakeDataClient};

#[derive(Debug, Clone)]
pub(super) struct FakeUser {
    pub secret: String,
    pub can_list_buckets: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default)]
pub(super) struct FakeBucket {
    pub object_sizes: Vec<u64>,
    /// Delay before each object is yielded
    pub object_delay: Duration,
    /// Entries replaced by an error, by position
    pub failures: HashMap<usize, StorageError>,
}

#[derive(Debug, Default)]
pub(super) struct ClusterState {
    pub users: HashMap<String, FakeUser>,
    pub buckets: BTreeMap<String, FakeBucket>,
    pub unreachable: bool,
    pub fail_init: bool,
    pub active_listings: usize,
    pub peak_listings: usize,
}

/// A storage cluster living in memory.
///
/// Cheap to clone; clones share state, so a test can keep a handle and
/// reconfigure the cluster while clients built from it are in use.
#[derive(Clone, Default)]
pub struct FakeCluster {
    pub(super) state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// An identity allowed to list buckets and users.
    pub fn add_admin(&self, identity: &str, secret: &str) {
        self.add_user(identity, secret, true, true);
    }

    /// An identity allowed to list buckets but not users.
    pub fn add_bucket_user(&self, identity: &str, secret: &str) {
        self.add_user(identity, secret, true, false);
    }

    pub fn add_user(&self, identity: &str, secret: &str, can_list_buckets: bool, is_admin: bool) {
        self.state.lock().users.insert(
            identity.to_string(),
            FakeUser {
                secret: secret.to_string(),
                can_list_buckets,
                is_admin,
            },
        );
    }

    /// Add a bucket holding one object per entry of `object_sizes`.
    pub fn add_bucket(&self, name: &str, object_sizes: impl IntoIterator<Item = u64>) {
        self.state.lock().buckets.insert(
            name.to_string(),
            FakeBucket {
                object_sizes: object_sizes.into_iter().collect(),
                ..Default::default()
            },
        );
    }

    pub fn set_object_delay(&self, bucket: &str, delay: Duration) {
        if let Some(bucket) = self.state.lock().buckets.get_mut(bucket) {
            bucket.object_delay = delay;
        }
    }

    /// Make the listing of `bucket` yield `error` in place of object `index`.
    pub fn fail_object(&self, bucket: &str, index: usize, error: StorageError) {
        if let Some(bucket) = self.state.lock().buckets.get_mut(bucket) {
            bucket.failures.insert(index, error);
        }
    }

    /// Every call fails as if the cluster were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    /// Client construction fails as if the endpoint were misconfigured.
    pub fn set_fail_init(&self, fail_init: bool) {
        self.state.lock().fail_init = fail_init;
    }

    /// Listings currently open.
    pub fn active_listings(&self) -> usize {
        self.state.lock().active_listings
    }

    /// The most listings that were ever open at the same time.
    pub fn peak_listings(&self) -> usize {
        self.state.lock().peak_listings
    }

    /// Check a principal the way the cluster would.
    pub(super) fn authenticate(&self, principal: &Principal) -> Result<FakeUser, StorageError> {
        let state = self.state.lock();
        if state.unreachable {
            return Err(StorageError::Unreachable("connection refused".to_string()));
        }
        match state.users.get(&principal.identity) {
            Some(user) if user.secret == principal.secret => Ok(user.clone()),
            Some(_) => Err(StorageError::InvalidCredentials(
                "The request signature we calculated does not match the signature you provided."
                    .to_string(),
            )),
            None => Err(StorageError::InvalidCredentials(
                "The Access Key Id you provided does not exist in our records.".to_string(),
            )),
        }
    }
}

impl ClientFactory for FakeCluster {
    fn create_clients(&self, principal: &Principal) -> Result<StorageClients, ClientInitError> {
        if self.state.lock().fail_init {
            return Err(ClientInitError::InvalidEndpoint(
                "fake cluster endpoint misconfigured".to_string(),
            ));
        }

        Ok(StorageClients {
            data: Arc::new(FakeDataClient::new(self.clone(), principal.clone())),
            admin: Arc::new(FakeAdminClient::new(self.clone(), principal.clone())),
        })
    }
}
