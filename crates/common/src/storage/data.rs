//! S3 data plane client.
//!
//! Bucket enumeration goes through a signed `ListAllMyBuckets` request.
//! Object listings use the `object_store` S3 backend, which handles
//! pagination; each listing is driven by a background task feeding a bounded
//! channel so the consumer owns a `'static` stream it can drop at any time.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use regex::Regex;

use super::error::StorageError;
use super::signed::SignedClient;
use super::{BucketEntry, DataPlane, ObjectEntry};

/// Number of listed objects buffered ahead of the consumer
const LISTING_CHANNEL_CAPACITY: usize = 256;

pub struct S3DataClient {
    client: SignedClient,
    allow_http: bool,
}

impl S3DataClient {
    pub(crate) fn new(client: SignedClient, allow_http: bool) -> Self {
        Self { client, allow_http }
    }

    fn bucket_store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let principal = self.client.principal();
        let store = AmazonS3Builder::new()
            .with_endpoint(self.client.endpoint().as_str().trim_end_matches('/'))
            .with_access_key_id(&principal.identity)
            .with_secret_access_key(&principal.secret)
            .with_bucket_name(bucket)
            .with_region(self.client.region())
            .with_allow_http(self.allow_http)
            .build()
            .map_err(|e| StorageError::Listing(e.to_string()))?;

        Ok(Arc::new(store))
    }
}

#[async_trait]
impl DataPlane for S3DataClient {
    async fn list_buckets(&self) -> Result<Vec<BucketEntry>, StorageError> {
        let body = self.client.get("/").await?;
        let buckets = parse_list_buckets(&body);
        tracing::debug!(count = buckets.len(), "listed buckets");
        Ok(buckets)
    }

    fn list_objects(&self, bucket: &str) -> BoxStream<'static, Result<ObjectEntry, StorageError>> {
        let store = match self.bucket_store(bucket) {
            Ok(store) => store,
            Err(e) => return futures::stream::once(async move { Err(e) }).boxed(),
        };

        let (tx, rx) = flume::bounded(LISTING_CHANNEL_CAPACITY);
        let bucket_name = bucket.to_string();

        tokio::spawn(async move {
            let mut listing = store.list(None);
            while let Some(item) = listing.next().await {
                let item = item
                    .map(|meta| ObjectEntry {
                        key: meta.location.to_string(),
                        size: meta.size as u64,
                    })
                    .map_err(StorageError::from);

                // Receiver gone: the scan was abandoned
                if tx.send_async(item).await.is_err() {
                    tracing::debug!(bucket = %bucket_name, "listing abandoned by consumer");
                    break;
                }
            }
        });

        rx.into_stream().boxed()
    }
}

fn bucket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<Bucket>(.*?)</Bucket>").expect("valid bucket regex"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<Name>(.*?)</Name>").expect("valid name regex"))
}

fn creation_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<CreationDate>(.*?)</CreationDate>").expect("valid creation date regex")
    })
}

/// Parse a `ListAllMyBucketsResult` document.
pub(crate) fn parse_list_buckets(xml: &str) -> Vec<BucketEntry> {
    bucket_regex()
        .captures_iter(xml)
        .filter_map(|bucket| {
            let block = bucket.get(1)?.as_str();
            let name = name_regex().captures(block)?.get(1)?.as_str().to_string();
            let creation_date = creation_date_regex()
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());
            Some(BucketEntry {
                name,
                creation_date,
            })
        })
        .collect()
}
