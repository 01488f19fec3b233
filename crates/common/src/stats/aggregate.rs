use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use crate::storage::DataPlane;

use super::scanner::scan;
use super::{BucketStat, BucketUsage, ScanCancelled, UsageSummary};

/// Scan every bucket in `bucket_names`, at most `workers` at a time.
///
/// Each bucket gets its own `per_bucket_budget`, starting when its scan
/// starts, so one slow bucket only ever costs its own budget. A worker that
/// finishes picks up the next bucket right away, whatever is still running.
/// Results come back in input order. A `workers` of 1 scans strictly one
/// after another.
pub async fn bucket_stats(
    data: &dyn DataPlane,
    bucket_names: &[String],
    per_bucket_budget: Duration,
    workers: usize,
    cancel: &CancellationToken,
) -> Result<Vec<BucketStat>, ScanCancelled> {
    let mut scanned: Vec<(usize, BucketStat)> =
        futures::stream::iter(bucket_names.iter().cloned().enumerate())
            .map(move |(index, name): (usize, String)| async move {
                let usage = scan(data, &name, per_bucket_budget, cancel).await?;
                Ok::<_, ScanCancelled>((index, BucketStat::new(name, usage)))
            })
            .buffer_unordered(workers.max(1))
            .try_collect()
            .await?;

    scanned.sort_unstable_by_key(|(index, _)| *index);
    Ok(scanned.into_iter().map(|(_, stat)| stat).collect())
}

/// Stats for `bucket_names` without scanning anything.
pub fn unknown_stats(bucket_names: &[String]) -> Vec<BucketStat> {
    bucket_names
        .iter()
        .map(|name| BucketStat::new(name.clone(), BucketUsage::UNKNOWN))
        .collect()
}

/// Totals over `bucket_names`.
///
/// Always produces a summary, even when no bucket finished in time; only
/// cancellation of the caller is an error.
pub async fn aggregate(
    data: &dyn DataPlane,
    bucket_names: &[String],
    per_bucket_budget: Duration,
    workers: usize,
    cancel: &CancellationToken,
) -> Result<UsageSummary, ScanCancelled> {
    let stats = bucket_stats(data, bucket_names, per_bucket_budget, workers, cancel).await?;
    let summary = UsageSummary::from_stats(&stats);

    tracing::info!(
        total_buckets = summary.total_buckets,
        buckets_with_stats = summary.buckets_with_stats,
        total_size_bytes = summary.total_size_bytes,
        "aggregated storage usage"
    );
    Ok(summary)
}
