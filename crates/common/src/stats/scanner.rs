use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::storage::{DataPlane, StorageError};

use super::{BucketUsage, ScanCancelled};

/// Walk every object of `bucket` and total up sizes and counts.
///
/// The walk is bounded by `budget`, measured from the call. Running out of
/// budget yields [`BucketUsage::UNKNOWN`]; whatever was counted so far is
/// thrown away rather than reported as a partial total. A listing error on a
/// single entry skips that entry, unless the listing itself timed out.
///
/// Cancelling `cancel` aborts the walk with [`ScanCancelled`].
#[tracing::instrument(skip(data, budget, cancel), fields(budget_ms = budget.as_millis() as u64))]
pub async fn scan(
    data: &dyn DataPlane,
    bucket: &str,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<BucketUsage, ScanCancelled> {
    let deadline = Instant::now() + budget;
    let expired = tokio::time::sleep_until(deadline);
    tokio::pin!(expired);

    let mut listing = data.list_objects(bucket);
    let mut usage = BucketUsage::EMPTY;
    let mut skipped = 0usize;

    loop {
        let next = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!("scan cancelled");
                return Err(ScanCancelled {
                    bucket: bucket.to_string(),
                });
            }

            _ = &mut expired => {
                tracing::debug!(counted = usage.object_count, "scan ran out of budget");
                return Ok(BucketUsage::UNKNOWN);
            }

            next = listing.next() => next,
        };

        match next {
            None => break,
            Some(Ok(object)) => usage.record_object(object.size),
            Some(Err(StorageError::Timeout)) => {
                tracing::debug!("listing timed out");
                return Ok(BucketUsage::UNKNOWN);
            }
            Some(Err(e)) => {
                if Instant::now() >= deadline {
                    return Ok(BucketUsage::UNKNOWN);
                }
                skipped += 1;
                tracing::debug!("skipping listing entry: {}", e);
            }
        }

        if Instant::now() >= deadline {
            tracing::debug!(counted = usage.object_count, "scan ran out of budget");
            return Ok(BucketUsage::UNKNOWN);
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "bucket scan skipped entries with errors");
    }
    tracing::debug!(
        size_bytes = usage.size_bytes,
        object_count = usage.object_count,
        "scan complete"
    );
    Ok(usage)
}
