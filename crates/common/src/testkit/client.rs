use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::storage::{
    AdminPlane, BucketEntry, DataPlane, ObjectEntry, Principal, StorageError,
};

use super::cluster::FakeCluster;

pub(super) struct FakeDataClient {
    cluster: FakeCluster,
    principal: Principal,
}

impl FakeDataClient {
    pub fn new(cluster: FakeCluster, principal: Principal) -> Self {
        Self { cluster, principal }
    }

    fn open_listing(&self, bucket: &str) -> Result<BoxStream<'static, Result<ObjectEntry, StorageError>>, StorageError> {
        let user = self.cluster.authenticate(&self.principal)?;
        if !user.can_list_buckets {
            return Err(StorageError::AccessDenied("Access Denied.".to_string()));
        }

        let bucket_state = self
            .cluster
            .state
            .lock()
            .buckets
            .get(bucket)
            .cloned()
            .ok_or_else(|| StorageError::Status {
                status: 404,
                message: "The specified bucket does not exist".to_string(),
            })?;

        let entries: Vec<Result<ObjectEntry, StorageError>> = bucket_state
            .object_sizes
            .iter()
            .enumerate()
            .map(|(index, size)| match bucket_state.failures.get(&index) {
                Some(error) => Err(error.clone()),
                None => Ok(ObjectEntry {
                    key: format!("object-{}", index),
                    size: *size,
                }),
            })
            .collect();

        let guard = ListingGuard::open(self.cluster.clone());
        let delay = bucket_state.object_delay;

        Ok(stream::iter(entries)
            .then(move |entry| {
                // keeps the listing counted as open until the stream is dropped
                let _guard = &guard;
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    entry
                }
            })
            .boxed())
    }
}

#[async_trait]
impl DataPlane for FakeDataClient {
    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError> {
        let user = self.cluster.authenticate(&self.principal)?;
        if !user.can_list_buckets {
            return Err(StorageError::AccessDenied("Access Denied.".to_string()));
        }

        Ok(self
            .cluster
            .state
            .lock()
            .buckets
            .keys()
            .map(|name| BucketEntry {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    fn list_objects(&self, bucket: &str) -> BoxStream<'static, Result<ObjectEntry, StorageError>> {
        match self.open_listing(bucket) {
            Ok(listing) => listing,
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }
}

pub(super) struct FakeAdminClient {
    cluster: FakeCluster,
    principal: Principal,
}

impl FakeAdminClient {
    pub fn new(cluster: FakeCluster, principal: Principal) -> Self {
        Self { cluster, principal }
    }
}

#[async_trait]
impl AdminPlane for FakeAdminClient {
    async fn list_users(&self) -> Result<(), StorageError> {
        let user = self.cluster.authenticate(&self.principal)?;
        if !user.is_admin {
            return Err(StorageError::AccessDenied(
                "Access Denied. (admin:ListUsers)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tracks how many listings are open at once.
struct ListingGuard {
    cluster: FakeCluster,
}

impl ListingGuard {
    fn open(cluster: FakeCluster) -> Self {
        {
            let mut state = cluster.state.lock();
            state.active_listings += 1;
            state.peak_listings = state.peak_listings.max(state.active_listings);
        }
        Self { cluster }
    }
}

impl Drop for ListingGuard {
    fn drop(&mut self) {
        self.cluster.state.lock().active_listings -= 1;
    }
}
